pub mod items;
pub mod members;
pub mod orders;
pub mod simple_orders;

use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::events::EventSender;
use crate::services::categories::CategoryService;
use crate::services::items::ItemService;
use crate::services::members::MemberService;
use crate::services::order_queries::OrderQueryService;
use crate::services::orders::OrderService;

/// Shared service container wired once at startup.
#[derive(Clone)]
pub struct AppServices {
    pub members: Arc<MemberService>,
    pub items: Arc<ItemService>,
    pub orders: Arc<OrderService>,
    pub categories: Arc<CategoryService>,
    pub order_queries: Arc<OrderQueryService>,
}

impl AppServices {
    pub fn build(db: Arc<DatabaseConnection>, event_sender: EventSender, config: &AppConfig) -> Self {
        Self {
            members: Arc::new(MemberService::new(db.clone(), Some(event_sender.clone()))),
            items: Arc::new(ItemService::new(db.clone())),
            orders: Arc::new(OrderService::new(db.clone(), Some(event_sender))),
            categories: Arc::new(CategoryService::new(db.clone())),
            order_queries: Arc::new(OrderQueryService::new(db, config.batch_fetch_size)),
        }
    }
}
