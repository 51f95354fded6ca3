use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::dto::{CreateItemRequest, UpdateItemRequest};
use crate::entities::item::{self, Entity as Item};
use crate::errors::ServiceError;

/// Service for catalog items.
#[derive(Clone)]
pub struct ItemService {
    db: Arc<DatabaseConnection>,
}

impl ItemService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self, request), fields(item_name = %request.name))]
    pub async fn create_item(&self, request: CreateItemRequest) -> Result<item::Model, ServiceError> {
        request.validate()?;

        let model = item::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(request.name),
            price: Set(request.price),
            stock_quantity: Set(request.stock_quantity),
            created_at: Set(Utc::now()),
        }
        .insert(&*self.db)
        .await?;

        info!(item_id = %model.id, "item created");
        Ok(model)
    }

    /// Loads the item and applies the new values; no merge of stale state.
    #[instrument(skip(self, request), fields(item_id = %item_id))]
    pub async fn update_item(
        &self,
        item_id: Uuid,
        request: UpdateItemRequest,
    ) -> Result<item::Model, ServiceError> {
        request.validate()?;

        let existing = Item::find_by_id(item_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Item {} not found", item_id)))?;

        let mut active: item::ActiveModel = existing.into();
        active.name = Set(request.name);
        active.price = Set(request.price);
        active.stock_quantity = Set(request.stock_quantity);
        let updated = active.update(&*self.db).await?;

        info!(item_id = %updated.id, "item updated");
        Ok(updated)
    }

    pub async fn list(&self) -> Result<Vec<item::Model>, ServiceError> {
        Item::find()
            .order_by_asc(item::Column::CreatedAt)
            .order_by_asc(item::Column::Id)
            .all(&*self.db)
            .await
            .map_err(ServiceError::from)
    }

    pub async fn get(&self, item_id: Uuid) -> Result<Option<item::Model>, ServiceError> {
        Item::find_by_id(item_id)
            .one(&*self.db)
            .await
            .map_err(ServiceError::from)
    }
}
