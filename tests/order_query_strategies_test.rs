//! Cross-checks the versioned listing strategies: on a fixed dataset every
//! variant must return the same logical set of orders, differing only in how
//! many queries it takes to build it. Also covers filter composition and the
//! stability of the paged window.

mod common;

use std::collections::BTreeSet;
use std::str::FromStr;

use axum::http::{Method, StatusCode};
use common::{response_json, TestApp};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::Value;
use uuid::Uuid;

/// (order id, member name, status, sorted lines as (item, price, count))
type OrderKey = (String, String, String, Vec<(String, String, i64)>);

fn price_key(value: &Value) -> String {
    let raw = match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    Decimal::from_str(&raw)
        .map(|d| d.normalize().to_string())
        .unwrap_or(raw)
}

fn line_key(item_name: &Value, price: &Value, count: &Value) -> (String, String, i64) {
    (
        item_name.as_str().unwrap_or_default().to_string(),
        price_key(price),
        count.as_i64().unwrap_or_default(),
    )
}

/// Normalizes the flattened record shape (v2, v3, v3.1, v4, v5).
fn normalize_dto_orders(data: &Value) -> BTreeSet<OrderKey> {
    data.as_array()
        .expect("order list")
        .iter()
        .map(|order| {
            let mut lines: Vec<_> = order["order_items"]
                .as_array()
                .expect("order lines")
                .iter()
                .map(|line| line_key(&line["item_name"], &line["order_price"], &line["count"]))
                .collect();
            lines.sort();
            (
                order["order_id"].as_str().unwrap_or_default().to_string(),
                order["name"].as_str().unwrap_or_default().to_string(),
                order["order_status"].as_str().unwrap_or_default().to_string(),
                lines,
            )
        })
        .collect()
}

/// Normalizes the entity-graph shape (v1).
fn normalize_graph_orders(data: &Value) -> BTreeSet<OrderKey> {
    data.as_array()
        .expect("order list")
        .iter()
        .map(|order| {
            let mut lines: Vec<_> = order["order_items"]
                .as_array()
                .expect("order lines")
                .iter()
                .map(|line| {
                    line_key(&line["item"]["name"], &line["order_price"], &line["count"])
                })
                .collect();
            lines.sort();
            (
                order["id"].as_str().unwrap_or_default().to_string(),
                order["member"]["name"].as_str().unwrap_or_default().to_string(),
                order["status"].as_str().unwrap_or_default().to_string(),
                lines,
            )
        })
        .collect()
}

struct Fixture {
    app: TestApp,
    order_a: Uuid,
    order_b: Uuid,
}

/// Two members, two orders, two lines each.
async fn fixture() -> Fixture {
    let app = TestApp::new().await;

    let user_a = app.seed_member("userA", "Seoul").await;
    let user_b = app.seed_member("userB", "Busan").await;

    let jpa1 = app.seed_item("JPA1 BOOK", dec!(10000), 100).await;
    let jpa2 = app.seed_item("JPA2 BOOK", dec!(20000), 100).await;
    let spring1 = app.seed_item("SPRING1 BOOK", dec!(20000), 200).await;
    let spring2 = app.seed_item("SPRING2 BOOK", dec!(40000), 300).await;

    let order_a = app
        .place_order(user_a.id, &[(jpa1.id, 1), (jpa2.id, 2)])
        .await;
    let order_b = app
        .place_order(user_b.id, &[(spring1.id, 3), (spring2.id, 4)])
        .await;

    Fixture {
        app,
        order_a,
        order_b,
    }
}

async fn fetch_data(app: &TestApp, uri: &str) -> Value {
    let response = app.request(Method::GET, uri, None).await;
    assert_eq!(response.status(), StatusCode::OK, "GET {uri}");
    let body = response_json(response).await;
    assert_eq!(body["success"], true, "GET {uri}");
    body["data"].clone()
}

#[tokio::test]
async fn all_full_listing_strategies_agree() {
    let fx = fixture().await;

    let baseline = normalize_dto_orders(&fetch_data(&fx.app, "/api/v2/orders").await);
    assert_eq!(baseline.len(), 2);

    let v1 = normalize_graph_orders(&fetch_data(&fx.app, "/api/v1/orders").await);
    assert_eq!(v1, baseline, "v1 disagrees with v2");

    for uri in [
        "/api/v3/orders",
        "/api/v3.1/orders",
        "/api/v4/orders",
        "/api/v5/orders",
    ] {
        let variant = normalize_dto_orders(&fetch_data(&fx.app, uri).await);
        assert_eq!(variant, baseline, "{uri} disagrees with v2");
    }
}

#[tokio::test]
async fn all_simple_listing_strategies_agree() {
    let fx = fixture().await;

    type SimpleKey = (String, String, String);

    let dto_keys = |data: &Value| -> BTreeSet<SimpleKey> {
        data.as_array()
            .expect("order list")
            .iter()
            .map(|order| {
                (
                    order["order_id"].as_str().unwrap_or_default().to_string(),
                    order["name"].as_str().unwrap_or_default().to_string(),
                    order["address"]["city"].as_str().unwrap_or_default().to_string(),
                )
            })
            .collect()
    };

    let baseline = dto_keys(&fetch_data(&fx.app, "/api/v2/simple-orders").await);
    assert_eq!(baseline.len(), 2);

    let v1: BTreeSet<SimpleKey> = fetch_data(&fx.app, "/api/v1/simple-orders")
        .await
        .as_array()
        .expect("order list")
        .iter()
        .map(|order| {
            (
                order["id"].as_str().unwrap_or_default().to_string(),
                order["member"]["name"].as_str().unwrap_or_default().to_string(),
                order["delivery"]["city"].as_str().unwrap_or_default().to_string(),
            )
        })
        .collect();
    assert_eq!(v1, baseline, "v1 disagrees with v2");

    for uri in ["/api/v3/simple-orders", "/api/v4/simple-orders"] {
        let variant = dto_keys(&fetch_data(&fx.app, uri).await);
        assert_eq!(variant, baseline, "{uri} disagrees with v2");
    }
}

#[tokio::test]
async fn paged_windows_are_stable_and_disjoint() {
    let fx = fixture().await;

    let first = fetch_data(&fx.app, "/api/v3.1/orders?offset=0&limit=1").await;
    let second = fetch_data(&fx.app, "/api/v3.1/orders?offset=1&limit=1").await;

    let first = first.as_array().expect("page");
    let second = second.as_array().expect("page");
    assert_eq!(first.len(), 1);
    assert_eq!(second.len(), 1);

    let first_id = first[0]["order_id"].as_str().expect("id").to_string();
    let second_id = second[0]["order_id"].as_str().expect("id").to_string();
    assert_ne!(first_id, second_id, "windows overlap");

    let expected: BTreeSet<String> = [fx.order_a.to_string(), fx.order_b.to_string()]
        .into_iter()
        .collect();
    let paged: BTreeSet<String> = [first_id, second_id].into_iter().collect();
    assert_eq!(paged, expected, "windows do not cover the dataset");

    // Defaults return everything, lines included
    let all = fetch_data(&fx.app, "/api/v3.1/orders").await;
    let all = all.as_array().expect("orders");
    assert_eq!(all.len(), 2);
    for order in all {
        assert_eq!(order["order_items"].as_array().expect("lines").len(), 2);
    }
}

#[tokio::test]
async fn batched_loader_groups_lines_across_chunks() {
    let fx = fixture().await;

    use ordershop_api::queries::{order_queries::OrderItemsByOrderIdsQuery, Query};

    // batch_size 1 forces one IN-clause query per order id; grouping must
    // still cover the whole id set
    let grouped = OrderItemsByOrderIdsQuery {
        order_ids: vec![fx.order_a, fx.order_b],
        batch_size: 1,
    }
    .execute(&fx.app.state.db)
    .await
    .expect("batched load");

    assert_eq!(grouped.len(), 2);
    assert_eq!(grouped[&fx.order_a].len(), 2);
    assert_eq!(grouped[&fx.order_b].len(), 2);
}

#[tokio::test]
async fn search_filters_compose() {
    let fx = fixture().await;

    // No filters: both orders
    let all = fetch_data(&fx.app, "/api/v2/orders").await;
    assert_eq!(all.as_array().expect("orders").len(), 2);

    // Name substring only
    let by_name = fetch_data(&fx.app, "/api/v2/orders?member_name=userA").await;
    let by_name = by_name.as_array().expect("orders");
    assert_eq!(by_name.len(), 1);
    assert_eq!(by_name[0]["name"], "userA");

    // Cancel one order, then filter by status
    let response = fx
        .app
        .request(
            Method::POST,
            &format!("/api/v1/orders/{}/cancel", fx.order_a),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let cancelled = fetch_data(&fx.app, "/api/v2/orders?status=CANCEL").await;
    let cancelled = cancelled.as_array().expect("orders");
    assert_eq!(cancelled.len(), 1);
    assert_eq!(
        cancelled[0]["order_id"].as_str().expect("id"),
        fx.order_a.to_string()
    );

    // Both filters together
    let both = fetch_data(&fx.app, "/api/v2/orders?status=ORDER&member_name=userB").await;
    let both = both.as_array().expect("orders");
    assert_eq!(both.len(), 1);
    assert_eq!(both[0]["name"], "userB");

    // Substring match, not equality
    let partial = fetch_data(&fx.app, "/api/v2/orders?member_name=user").await;
    assert_eq!(partial.as_array().expect("orders").len(), 2);
}
