//! Ordershop API Library
//!
//! Order management backend whose listing endpoints are versioned by query
//! strategy: per-row resolution, joined round trips, batched collection
//! loads, and direct DTO projection over the same relational data.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]

// Core modules
pub mod config;
pub mod db;
pub mod dto;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod migrator;
pub mod openapi;
pub mod queries;
pub mod services;

use axum::{
    extract::State,
    response::Json,
    routing::{get, post, put},
    Router,
};
use chrono::Utc;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub event_sender: events::EventSender,
    pub services: handlers::AppServices,
}

/// Paging window for the paged order listing.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// Rows to skip
    #[serde(default)]
    pub offset: u64,
    /// Page size
    #[serde(default = "default_page_limit")]
    pub limit: u64,
}

fn default_page_limit() -> u64 {
    100
}

// Common response wrappers
#[derive(Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub errors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<ResponseMeta>,
}

#[derive(Serialize, ToSchema)]
pub struct ResponseMeta {
    pub timestamp: String,
}

impl ResponseMeta {
    fn capture() -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            errors: None,
            meta: Some(ResponseMeta::capture()),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message),
            errors: None,
            meta: Some(ResponseMeta::capture()),
        }
    }

    pub fn validation_errors(errors: Vec<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some("Validation failed".to_string()),
            errors: Some(errors),
            meta: Some(ResponseMeta::capture()),
        }
    }
}

/// Standard API result type for JSON responses
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, errors::ServiceError>;

/// Assembles the full route table.
pub fn api_routes() -> Router<AppState> {
    let members = Router::new()
        .route(
            "/api/v1/members",
            post(handlers::members::create_member_v1).get(handlers::members::list_members_v1),
        )
        .route("/api/v2/members", post(handlers::members::create_member_v2))
        .route(
            "/api/v2/members/{id}",
            put(handlers::members::update_member_v2),
        );

    let orders = Router::new()
        .route(
            "/api/v1/orders",
            get(handlers::orders::orders_v1).post(handlers::orders::create_order),
        )
        .route(
            "/api/v1/orders/{id}/cancel",
            post(handlers::orders::cancel_order),
        )
        .route("/api/v2/orders", get(handlers::orders::orders_v2))
        .route("/api/v3/orders", get(handlers::orders::orders_v3))
        .route("/api/v3.1/orders", get(handlers::orders::orders_v3_paged))
        .route("/api/v4/orders", get(handlers::orders::orders_v4))
        .route("/api/v5/orders", get(handlers::orders::orders_v5));

    let simple_orders = Router::new()
        .route(
            "/api/v1/simple-orders",
            get(handlers::simple_orders::simple_orders_v1),
        )
        .route(
            "/api/v2/simple-orders",
            get(handlers::simple_orders::simple_orders_v2),
        )
        .route(
            "/api/v3/simple-orders",
            get(handlers::simple_orders::simple_orders_v3),
        )
        .route(
            "/api/v4/simple-orders",
            get(handlers::simple_orders::simple_orders_v4),
        );

    let items = Router::new()
        .route(
            "/api/v1/items",
            post(handlers::items::create_item).get(handlers::items::list_items),
        )
        .route("/api/v1/items/{id}", put(handlers::items::update_item));

    Router::new()
        // Status and health endpoints
        .route("/status", get(api_status))
        .route("/health", get(health_check))
        .merge(members)
        .merge(orders)
        .merge(simple_orders)
        .merge(items)
}

async fn api_status() -> Result<Json<ApiResponse<Value>>, errors::ServiceError> {
    let status_data = json!({
        "status": "ok",
        "service": "ordershop-api",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": Utc::now().to_rfc3339(),
    });

    Ok(Json(ApiResponse::success(status_data)))
}

async fn health_check(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Value>>, errors::ServiceError> {
    let db_status = match state.db.ping().await {
        Ok(_) => "healthy",
        Err(_) => "unhealthy",
    };

    let health_data = json!({
        "status": db_status,
        "checks": {
            "database": db_status,
        },
        "timestamp": Utc::now().to_rfc3339(),
    });

    Ok(Json(ApiResponse::success(health_data)))
}

#[cfg(test)]
mod response_tests {
    use super::*;
    use chrono::DateTime;

    #[test]
    fn success_response_carries_data_and_metadata() {
        let response = ApiResponse::success("ok");
        assert!(response.success);
        assert_eq!(response.data, Some("ok"));
        let meta = response.meta.expect("metadata expected");
        DateTime::parse_from_rfc3339(&meta.timestamp).expect("timestamp should parse");
    }

    #[test]
    fn error_response_carries_the_message() {
        let response = ApiResponse::<()>::error("oops".into());
        assert!(!response.success);
        assert_eq!(response.message.as_deref(), Some("oops"));
        assert!(response.data.is_none());
    }

    #[test]
    fn validation_errors_are_listed() {
        let response = ApiResponse::<()>::validation_errors(vec!["missing".into()]);
        assert!(!response.success);
        assert_eq!(response.errors.as_deref(), Some(&["missing".to_string()][..]));
    }
}
