use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

use crate::dto::{CreateMemberRequest, UpdateMemberRequest};
use crate::entities::member::{self, Entity as Member};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};

/// Service for member registration and lookup.
#[derive(Clone)]
pub struct MemberService {
    db: Arc<DatabaseConnection>,
    event_sender: Option<EventSender>,
}

impl MemberService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Option<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// Registers a new member. Names are unique; a duplicate registration is
    /// a business-rule violation.
    #[instrument(skip(self, request), fields(member_name = %request.name))]
    pub async fn register(&self, request: CreateMemberRequest) -> Result<member::Model, ServiceError> {
        request.validate()?;
        self.ensure_unique_name(&request.name).await?;

        let address = request.address.unwrap_or_default();
        let model = member::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(request.name),
            city: Set(address.city),
            street: Set(address.street),
            zipcode: Set(address.zipcode),
            created_at: Set(Utc::now()),
        }
        .insert(&*self.db)
        .await?;

        info!(member_id = %model.id, "member registered");
        self.emit(Event::MemberRegistered(model.id)).await;

        Ok(model)
    }

    /// Renames a member; the new name must stay unique.
    #[instrument(skip(self, request), fields(member_id = %member_id))]
    pub async fn update_name(
        &self,
        member_id: Uuid,
        request: UpdateMemberRequest,
    ) -> Result<member::Model, ServiceError> {
        request.validate()?;

        let existing = Member::find_by_id(member_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Member {} not found", member_id)))?;

        if existing.name != request.name {
            self.ensure_unique_name(&request.name).await?;
        }

        let mut active: member::ActiveModel = existing.into();
        active.name = Set(request.name);
        let updated = active.update(&*self.db).await?;

        info!(member_id = %updated.id, "member renamed");
        Ok(updated)
    }

    pub async fn list(&self) -> Result<Vec<member::Model>, ServiceError> {
        Member::find()
            .order_by_asc(member::Column::CreatedAt)
            .order_by_asc(member::Column::Id)
            .all(&*self.db)
            .await
            .map_err(ServiceError::from)
    }

    pub async fn get(&self, member_id: Uuid) -> Result<Option<member::Model>, ServiceError> {
        Member::find_by_id(member_id)
            .one(&*self.db)
            .await
            .map_err(ServiceError::from)
    }

    async fn ensure_unique_name(&self, name: &str) -> Result<(), ServiceError> {
        let existing = Member::find()
            .filter(member::Column::Name.eq(name))
            .count(&*self.db)
            .await?;

        if existing > 0 {
            return Err(ServiceError::Conflict(format!(
                "member name '{}' is already registered",
                name
            )));
        }

        Ok(())
    }

    async fn emit(&self, event: Event) {
        if let Some(sender) = &self.event_sender {
            if let Err(e) = sender.send(event).await {
                warn!(error = %e, "failed to publish event");
            }
        }
    }
}
