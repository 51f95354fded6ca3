//! Category hierarchy and item assignment.

mod common;

use common::TestApp;
use ordershop_api::errors::ServiceError;
use rust_decimal_macros::dec;
use uuid::Uuid;

#[tokio::test]
async fn categories_form_a_hierarchy_and_hold_items() {
    let app = TestApp::new().await;
    let categories = &app.state.services.categories;

    let root = categories.create("BOOKS".into(), None).await.expect("root");
    let child = categories
        .create("JPA".into(), Some(root.id))
        .await
        .expect("child");

    let children = categories.children(root.id).await.expect("children");
    assert_eq!(children.len(), 1);
    assert_eq!(children[0].id, child.id);
    assert_eq!(children[0].parent_id, Some(root.id));

    let item = app.seed_item("JPA1 BOOK", dec!(10000), 10).await;
    categories
        .attach_item(child.id, item.id)
        .await
        .expect("attach");
    // Attaching twice is idempotent
    categories
        .attach_item(child.id, item.id)
        .await
        .expect("attach again");

    let items = categories.items_in(child.id).await.expect("items");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].name, "JPA1 BOOK");
}

#[tokio::test]
async fn creating_under_a_missing_parent_fails() {
    let app = TestApp::new().await;

    let result = app
        .state
        .services
        .categories
        .create("ORPHAN".into(), Some(Uuid::new_v4()))
        .await;

    assert!(matches!(result, Err(ServiceError::NotFound(_))));
}

#[tokio::test]
async fn blank_category_names_are_rejected() {
    let app = TestApp::new().await;

    let result = app
        .state
        .services
        .categories
        .create("   ".into(), None)
        .await;

    assert!(matches!(result, Err(ServiceError::ValidationError(_))));
}
