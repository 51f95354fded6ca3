use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, Set,
};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::entities::category::{self, Entity as Category};
use crate::entities::category_item;
use crate::entities::item::{self, Entity as Item};
use crate::errors::ServiceError;

/// Service for the category hierarchy and its item assignments.
#[derive(Clone)]
pub struct CategoryService {
    db: Arc<DatabaseConnection>,
}

impl CategoryService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Creates a category, optionally under a parent.
    #[instrument(skip(self), fields(category_name = %name))]
    pub async fn create(
        &self,
        name: String,
        parent_id: Option<Uuid>,
    ) -> Result<category::Model, ServiceError> {
        if name.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "Category name is required".to_string(),
            ));
        }

        if let Some(parent) = parent_id {
            Category::find_by_id(parent)
                .one(&*self.db)
                .await?
                .ok_or_else(|| {
                    ServiceError::NotFound(format!("Parent category {} not found", parent))
                })?;
        }

        let model = category::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name),
            parent_id: Set(parent_id),
        }
        .insert(&*self.db)
        .await?;

        info!(category_id = %model.id, "category created");
        Ok(model)
    }

    /// Puts an item into a category. Idempotent.
    #[instrument(skip(self), fields(category_id = %category_id, item_id = %item_id))]
    pub async fn attach_item(&self, category_id: Uuid, item_id: Uuid) -> Result<(), ServiceError> {
        Category::find_by_id(category_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Category {} not found", category_id)))?;
        Item::find_by_id(item_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Item {} not found", item_id)))?;

        let already_linked = category_item::Entity::find_by_id((category_id, item_id))
            .one(&*self.db)
            .await?
            .is_some();
        if already_linked {
            return Ok(());
        }

        category_item::ActiveModel {
            category_id: Set(category_id),
            item_id: Set(item_id),
        }
        .insert(&*self.db)
        .await?;

        Ok(())
    }

    /// Items assigned to a category, resolved through the junction table.
    pub async fn items_in(&self, category_id: Uuid) -> Result<Vec<item::Model>, ServiceError> {
        let category = Category::find_by_id(category_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Category {} not found", category_id)))?;

        category
            .find_related(Item)
            .all(&*self.db)
            .await
            .map_err(ServiceError::from)
    }

    /// Direct children of a category.
    pub async fn children(&self, parent_id: Uuid) -> Result<Vec<category::Model>, ServiceError> {
        Category::find()
            .filter(category::Column::ParentId.eq(parent_id))
            .order_by_asc(category::Column::Name)
            .all(&*self.db)
            .await
            .map_err(ServiceError::from)
    }
}
