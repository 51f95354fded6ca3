#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{self, Body},
    http::{header, Method, Request},
    response::Response,
    Router,
};
use rust_decimal::Decimal;
use serde_json::Value;
use tempfile::TempDir;
use tokio::sync::mpsc;
use tower::ServiceExt;
use uuid::Uuid;

use ordershop_api::{
    api_routes,
    config::AppConfig,
    db,
    dto::{CreateItemRequest, CreateMemberRequest, OrderLineRequest, PlaceOrderRequest},
    entities::address::Address,
    entities::{item, member},
    events::EventSender,
    handlers::AppServices,
    AppState,
};

/// Helper harness spinning up the application over a temporary SQLite file.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    _tmp: TempDir,
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    pub async fn new() -> Self {
        let tmp = tempfile::tempdir().expect("tempdir");
        let db_path = tmp.path().join("ordershop_test.db");

        let mut cfg = AppConfig::new(
            format!("sqlite://{}?mode=rwc", db_path.display()),
            "127.0.0.1",
            0,
            "test",
        );
        cfg.auto_migrate = true;
        cfg.db_max_connections = 2;
        cfg.db_min_connections = 1;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let db = Arc::new(pool);

        let (event_tx, mut event_rx) = mpsc::channel(64);
        tokio::spawn(async move { while event_rx.recv().await.is_some() {} });
        let event_sender = EventSender::new(event_tx);

        let services = AppServices::build(db.clone(), event_sender.clone(), &cfg);
        let state = AppState {
            db,
            config: cfg,
            event_sender,
            services,
        };
        let router = api_routes().with_state(state.clone());

        Self {
            router,
            state,
            _tmp: tmp,
        }
    }

    /// Fire one request at the router.
    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> Response {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request");

        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("response")
    }

    pub async fn seed_member(&self, name: &str, city: &str) -> member::Model {
        self.state
            .services
            .members
            .register(CreateMemberRequest {
                name: name.to_string(),
                address: Some(Address::new(city, "1", "1111")),
            })
            .await
            .expect("seed member")
    }

    pub async fn seed_item(&self, name: &str, price: Decimal, stock: i32) -> item::Model {
        self.state
            .services
            .items
            .create_item(CreateItemRequest {
                name: name.to_string(),
                price,
                stock_quantity: stock,
            })
            .await
            .expect("seed item")
    }

    pub async fn place_order(&self, member_id: Uuid, lines: &[(Uuid, i32)]) -> Uuid {
        self.state
            .services
            .orders
            .place_order(PlaceOrderRequest {
                member_id,
                items: lines
                    .iter()
                    .map(|(item_id, count)| OrderLineRequest {
                        item_id: *item_id,
                        count: *count,
                    })
                    .collect(),
            })
            .await
            .expect("place order")
    }
}

pub async fn response_json(response: Response) -> Value {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body bytes");
    serde_json::from_slice(&bytes).expect("json response")
}
