//! End-to-end tests for the order lifecycle: placement (price snapshot and
//! stock decrement), totals, and cancellation (stock restore, completed
//! delivery guard).

mod common;

use axum::http::{Method, StatusCode};
use common::{response_json, TestApp};
use rust_decimal_macros::dec;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use serde_json::json;
use uuid::Uuid;

use ordershop_api::entities::{delivery, item, order};

async fn stock_of(app: &TestApp, item_id: Uuid) -> i32 {
    item::Entity::find_by_id(item_id)
        .one(&*app.state.db)
        .await
        .expect("query item")
        .expect("item exists")
        .stock_quantity
}

async fn order_status_of(app: &TestApp, order_id: Uuid) -> String {
    app.state
        .services
        .orders
        .get_order(order_id)
        .await
        .expect("query order")
        .expect("order exists")
        .status
}

#[tokio::test]
async fn placing_an_order_decrements_stock_and_totals() {
    let app = TestApp::new().await;
    let member = app.seed_member("userA", "Seoul").await;
    let book = app.seed_item("JPA1 BOOK", dec!(10000), 10).await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/orders",
            Some(json!({
                "member_id": member.id,
                "items": [{"item_id": book.id, "count": 3}]
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    let order_id: Uuid = body["data"]["id"]
        .as_str()
        .expect("order id")
        .parse()
        .expect("uuid");

    assert_eq!(stock_of(&app, book.id).await, 7);

    let total = app
        .state
        .services
        .orders
        .order_total(order_id)
        .await
        .expect("total");
    assert_eq!(total, dec!(30000));
}

#[tokio::test]
async fn totals_sum_over_all_lines() {
    let app = TestApp::new().await;
    let member = app.seed_member("userA", "Seoul").await;
    let book1 = app.seed_item("JPA1 BOOK", dec!(10000), 10).await;
    let book2 = app.seed_item("JPA2 BOOK", dec!(20000), 10).await;

    let order_id = app
        .place_order(member.id, &[(book1.id, 1), (book2.id, 2)])
        .await;

    let total = app
        .state
        .services
        .orders
        .order_total(order_id)
        .await
        .expect("total");
    assert_eq!(total, dec!(50000));
}

#[tokio::test]
async fn insufficient_stock_fails_and_leaves_state_unchanged() {
    let app = TestApp::new().await;
    let member = app.seed_member("userA", "Seoul").await;
    let book = app.seed_item("JPA1 BOOK", dec!(10000), 2).await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/orders",
            Some(json!({
                "member_id": member.id,
                "items": [{"item_id": book.id, "count": 3}]
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    // Nothing was written: stock untouched, no orders listed
    assert_eq!(stock_of(&app, book.id).await, 2);
    let response = app.request(Method::GET, "/api/v2/orders", None).await;
    let body = response_json(response).await;
    assert_eq!(body["data"].as_array().expect("orders").len(), 0);
}

#[tokio::test]
async fn cancelling_restores_stock_and_flips_status() {
    let app = TestApp::new().await;
    let member = app.seed_member("userA", "Seoul").await;
    let book = app.seed_item("JPA1 BOOK", dec!(10000), 10).await;
    let order_id = app.place_order(member.id, &[(book.id, 3)]).await;
    assert_eq!(stock_of(&app, book.id).await, 7);

    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/orders/{}/cancel", order_id),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    assert_eq!(stock_of(&app, book.id).await, 10);
    assert_eq!(order_status_of(&app, order_id).await, "CANCEL");

    // Cancelling twice is refused and does not restore stock again
    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/orders/{}/cancel", order_id),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(stock_of(&app, book.id).await, 10);
}

#[tokio::test]
async fn completed_delivery_blocks_cancellation() {
    let app = TestApp::new().await;
    let member = app.seed_member("userA", "Seoul").await;
    let book = app.seed_item("JPA1 BOOK", dec!(10000), 10).await;
    let order_id = app.place_order(member.id, &[(book.id, 3)]).await;

    // Mark the delivery completed
    let stored_order = order::Entity::find_by_id(order_id)
        .one(&*app.state.db)
        .await
        .expect("query order")
        .expect("order exists");
    let stored_delivery = delivery::Entity::find_by_id(stored_order.delivery_id)
        .one(&*app.state.db)
        .await
        .expect("query delivery")
        .expect("delivery exists");
    let mut active: delivery::ActiveModel = stored_delivery.into();
    active.status = Set("COMP".to_string());
    active.update(&*app.state.db).await.expect("update delivery");

    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/orders/{}/cancel", order_id),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // State unchanged: status still ORDER, stock still decremented
    assert_eq!(order_status_of(&app, order_id).await, "ORDER");
    assert_eq!(stock_of(&app, book.id).await, 7);
}

#[tokio::test]
async fn ordering_for_a_missing_member_is_not_found() {
    let app = TestApp::new().await;
    let book = app.seed_item("JPA1 BOOK", dec!(10000), 10).await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/orders",
            Some(json!({
                "member_id": Uuid::new_v4(),
                "items": [{"item_id": book.id, "count": 1}]
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn order_price_is_snapshotted_against_later_catalog_changes() {
    let app = TestApp::new().await;
    let member = app.seed_member("userA", "Seoul").await;
    let book = app.seed_item("JPA1 BOOK", dec!(10000), 10).await;
    let order_id = app.place_order(member.id, &[(book.id, 2)]).await;

    // Catalog price changes after the order
    let response = app
        .request(
            Method::PUT,
            &format!("/api/v1/items/{}", book.id),
            Some(json!({
                "name": "JPA1 BOOK",
                "price": "99000",
                "stock_quantity": 8
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    // The order still totals at the price it was placed with
    let total = app
        .state
        .services
        .orders
        .order_total(order_id)
        .await
        .expect("total");
    assert_eq!(total, dec!(20000));
}
