use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use tracing_subscriber::EnvFilter;
use validator::Validate;

/// Default values for configuration
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_ENV: &str = "development";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8080;
const CONFIG_DIR: &str = "config";

/// Default chunk size for batched collection loads. The IN-clause strategy
/// works best between 100 and 1000; some databases cap IN parameters at 1000.
const DEFAULT_BATCH_FETCH_SIZE: u64 = 100;

/// Application configuration structure with validation
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Database connection URL
    pub database_url: String,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Application environment
    #[serde(default = "default_environment")]
    pub environment: String,

    /// Logging level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log in JSON format (structured logging)
    #[serde(default)]
    pub log_json: bool,

    /// Whether to run database migrations on startup
    #[serde(default)]
    pub auto_migrate: bool,

    /// Chunk size for batched collection loads (IN-clause grouping)
    #[validate(range(min = 100, max = 1000))]
    #[serde(default = "default_batch_fetch_size")]
    pub batch_fetch_size: u64,

    /// DB pool: max connections
    #[serde(default = "default_db_max_connections")]
    pub db_max_connections: u32,

    /// DB pool: min connections
    #[serde(default = "default_db_min_connections")]
    pub db_min_connections: u32,

    /// DB timeouts (seconds)
    #[serde(default = "default_db_connect_timeout_secs")]
    pub db_connect_timeout_secs: u64,
    #[serde(default = "default_db_idle_timeout_secs")]
    pub db_idle_timeout_secs: u64,
    #[serde(default = "default_db_acquire_timeout_secs")]
    pub db_acquire_timeout_secs: u64,
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}
fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_environment() -> String {
    DEFAULT_ENV.to_string()
}
fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}
fn default_batch_fetch_size() -> u64 {
    DEFAULT_BATCH_FETCH_SIZE
}
fn default_db_max_connections() -> u32 {
    10
}
fn default_db_min_connections() -> u32 {
    1
}
fn default_db_connect_timeout_secs() -> u64 {
    30
}
fn default_db_idle_timeout_secs() -> u64 {
    600
}
fn default_db_acquire_timeout_secs() -> u64 {
    8
}

impl AppConfig {
    /// Builds a config programmatically; used by tests and tooling.
    pub fn new(
        database_url: impl Into<String>,
        host: impl Into<String>,
        port: u16,
        environment: impl Into<String>,
    ) -> Self {
        Self {
            database_url: database_url.into(),
            host: host.into(),
            port,
            environment: environment.into(),
            log_level: default_log_level(),
            log_json: false,
            auto_migrate: false,
            batch_fetch_size: default_batch_fetch_size(),
            db_max_connections: default_db_max_connections(),
            db_min_connections: default_db_min_connections(),
            db_connect_timeout_secs: default_db_connect_timeout_secs(),
            db_idle_timeout_secs: default_db_idle_timeout_secs(),
            db_acquire_timeout_secs: default_db_acquire_timeout_secs(),
        }
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

/// Loads configuration from `config/default`, an environment-specific file,
/// and `ORDERSHOP_*` environment variables (later sources win).
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let run_env = env::var("ORDERSHOP_ENV").unwrap_or_else(|_| DEFAULT_ENV.to_string());

    let settings = Config::builder()
        .add_source(File::with_name(&format!("{}/default", CONFIG_DIR)).required(false))
        .add_source(File::with_name(&format!("{}/{}", CONFIG_DIR, run_env)).required(false))
        .add_source(Environment::with_prefix("ORDERSHOP").separator("__"))
        .build()?;

    let config: AppConfig = settings.try_deserialize()?;
    config
        .validate()
        .map_err(|e| ConfigError::Message(format!("invalid configuration: {}", e)))?;

    Ok(config)
}

/// Installs the global tracing subscriber. `RUST_LOG` overrides the
/// configured level when set.
pub fn init_tracing(level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = AppConfig::new("sqlite::memory:", "127.0.0.1", 0, "test");
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.batch_fetch_size, 100);
    }

    #[test]
    fn batch_fetch_size_is_bounded() {
        let mut cfg = AppConfig::new("sqlite::memory:", "127.0.0.1", 0, "test");
        cfg.batch_fetch_size = 50;
        assert!(cfg.validate().is_err());
        cfg.batch_fetch_size = 1001;
        assert!(cfg.validate().is_err());
        cfg.batch_fetch_size = 1000;
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn server_addr_joins_host_and_port() {
        let cfg = AppConfig::new("sqlite::memory:", "0.0.0.0", 9090, "test");
        assert_eq!(cfg.server_addr(), "0.0.0.0:9090");
    }
}
