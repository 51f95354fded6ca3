//! Order retrieval under varying join and pagination trade-offs.
//!
//! The listing strategies escalate from per-row follow-up lookups to joined
//! projections to batched collection loads; every strategy returns the same
//! logical result set and differs only in query count and transfer volume.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, FromQueryResult, JoinType,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait, Select,
};
use std::collections::HashMap;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::dto::OrderSearch;
use crate::entities::{delivery, member, order, order_item};
use crate::errors::ServiceError;

/// Hard cap on the search listing, matching the upstream row limit.
const MAX_SEARCH_ROWS: u64 = 1000;

/// Trait representing a generic asynchronous query.
#[async_trait]
pub trait Query: Send + Sync {
    type Result: Send + Sync;

    /// Executes the query using the provided database connection
    async fn execute(&self, db: &DatabaseConnection) -> Result<Self::Result, ServiceError>;
}

/// Flat row from the to-one join (orders × members × deliveries).
///
/// To-one joins never multiply the row count, so this shape is safe to
/// combine with server-side paging. Reused by the plain, paged, and
/// direct-DTO listings.
#[derive(Debug, Clone, FromQueryResult)]
pub struct OrderToOneRow {
    pub order_id: Uuid,
    pub member_name: String,
    pub order_date: DateTime<Utc>,
    pub status: String,
    pub city: String,
    pub street: String,
    pub zipcode: String,
}

/// Flat row from the collection join; one row per order line, with the order
/// fields repeated on every row.
#[derive(Debug, Clone, FromQueryResult)]
pub struct OrderWithItemRow {
    pub order_id: Uuid,
    pub member_name: String,
    pub order_date: DateTime<Utc>,
    pub status: String,
    pub city: String,
    pub street: String,
    pub zipcode: String,
    pub item_name: String,
    pub order_price: Decimal,
    pub count: i32,
}

/// Order line keyed by its order, joined with the item for the display name.
#[derive(Debug, Clone, FromQueryResult)]
pub struct OrderItemRow {
    pub order_id: Uuid,
    pub item_name: String,
    pub order_price: Decimal,
    pub count: i32,
}

/// Base select for the to-one join, ordered stably for paging.
pub(crate) fn orders_to_one_select() -> Select<order::Entity> {
    order::Entity::find()
        .select_only()
        .column_as(order::Column::Id, "order_id")
        .column_as(member::Column::Name, "member_name")
        .column_as(order::Column::OrderDate, "order_date")
        .column_as(order::Column::Status, "status")
        .column_as(delivery::Column::City, "city")
        .column_as(delivery::Column::Street, "street")
        .column_as(delivery::Column::Zipcode, "zipcode")
        .join(JoinType::InnerJoin, order::Relation::Member.def())
        .join(JoinType::InnerJoin, order::Relation::Delivery.def())
        .order_by_asc(order::Column::OrderDate)
        .order_by_asc(order::Column::Id)
}

fn order_item_rows_select() -> Select<order_item::Entity> {
    order_item::Entity::find()
        .select_only()
        .column_as(order_item::Column::OrderId, "order_id")
        .column_as(crate::entities::item::Column::Name, "item_name")
        .column_as(order_item::Column::OrderPrice, "order_price")
        .column_as(order_item::Column::Count, "count")
        .join(JoinType::InnerJoin, order_item::Relation::Item.def())
}

/// Order lines for a single order, joined with their items.
pub(crate) async fn order_item_rows_for(
    db: &DatabaseConnection,
    order_id: Uuid,
) -> Result<Vec<OrderItemRow>, ServiceError> {
    order_item_rows_select()
        .filter(order_item::Column::OrderId.eq(order_id))
        .into_model::<OrderItemRow>()
        .all(db)
        .await
        .map_err(ServiceError::from)
}

/// Bare-entity listing with conditionally composed filters.
///
/// Predicates are appended only for the filters actually present; the member
/// join exists so the name predicate can be expressed. Associations are left
/// unresolved on purpose — callers that need them issue follow-up lookups.
#[derive(Debug, Default)]
pub struct SearchOrdersQuery {
    pub search: OrderSearch,
}

#[async_trait]
impl Query for SearchOrdersQuery {
    type Result = Vec<order::Model>;

    #[instrument(skip(self, db), fields(status = ?self.search.status, member_name = ?self.search.member_name))]
    async fn execute(&self, db: &DatabaseConnection) -> Result<Self::Result, ServiceError> {
        debug!("Executing SearchOrdersQuery");

        let mut condition = Condition::all();
        if let Some(status) = self.search.status {
            condition = condition.add(order::Column::Status.eq(status.as_ref()));
        }
        if let Some(name) = self
            .search
            .member_name
            .as_deref()
            .filter(|name| !name.is_empty())
        {
            condition = condition.add(member::Column::Name.contains(name));
        }

        order::Entity::find()
            .join(JoinType::InnerJoin, order::Relation::Member.def())
            .filter(condition)
            .order_by_asc(order::Column::OrderDate)
            .order_by_asc(order::Column::Id)
            .limit(MAX_SEARCH_ROWS)
            .all(db)
            .await
            .map_err(ServiceError::from)
    }
}

/// Joins the to-one associations in one round trip.
#[derive(Debug, Default)]
pub struct OrdersWithMemberDeliveryQuery;

#[async_trait]
impl Query for OrdersWithMemberDeliveryQuery {
    type Result = Vec<OrderToOneRow>;

    #[instrument(skip(self, db))]
    async fn execute(&self, db: &DatabaseConnection) -> Result<Self::Result, ServiceError> {
        debug!("Executing OrdersWithMemberDeliveryQuery");

        orders_to_one_select()
            .into_model::<OrderToOneRow>()
            .all(db)
            .await
            .map_err(ServiceError::from)
    }
}

/// To-one join with server-side paging. Collections are fetched separately
/// (see [`OrderItemsByOrderIdsQuery`]) so the window stays accurate.
#[derive(Debug)]
pub struct PagedOrdersWithMemberDeliveryQuery {
    pub offset: u64,
    pub limit: u64,
}

#[async_trait]
impl Query for PagedOrdersWithMemberDeliveryQuery {
    type Result = Vec<OrderToOneRow>;

    #[instrument(skip(self, db), fields(offset = self.offset, limit = self.limit))]
    async fn execute(&self, db: &DatabaseConnection) -> Result<Self::Result, ServiceError> {
        debug!("Executing PagedOrdersWithMemberDeliveryQuery");

        orders_to_one_select()
            .offset(self.offset)
            .limit(self.limit)
            .into_model::<OrderToOneRow>()
            .all(db)
            .await
            .map_err(ServiceError::from)
    }
}

/// Joins the to-one and to-many associations in one round trip.
///
/// The row count multiplies by the number of lines per order; callers
/// de-duplicate by grouping on order id. Offset paging is deliberately not
/// offered on this shape — the window would be cut on multiplied rows, so the
/// whole result set would have to be materialized and paged in memory.
#[derive(Debug, Default)]
pub struct OrdersWithItemsQuery;

#[async_trait]
impl Query for OrdersWithItemsQuery {
    type Result = Vec<OrderWithItemRow>;

    #[instrument(skip(self, db))]
    async fn execute(&self, db: &DatabaseConnection) -> Result<Self::Result, ServiceError> {
        debug!("Executing OrdersWithItemsQuery");

        orders_to_one_select()
            .column_as(crate::entities::item::Column::Name, "item_name")
            .column_as(order_item::Column::OrderPrice, "order_price")
            .column_as(order_item::Column::Count, "count")
            .join(JoinType::InnerJoin, order::Relation::OrderItems.def())
            .join(JoinType::InnerJoin, order_item::Relation::Item.def())
            .into_model::<OrderWithItemRow>()
            .all(db)
            .await
            .map_err(ServiceError::from)
    }
}

/// Batched collection load: resolves the order lines for a whole id set with
/// IN-clause queries, chunked to the configured batch size, and grouped in
/// memory by order id. Keeps the query count near-constant regardless of how
/// many orders the page holds.
#[derive(Debug)]
pub struct OrderItemsByOrderIdsQuery {
    pub order_ids: Vec<Uuid>,
    pub batch_size: u64,
}

#[async_trait]
impl Query for OrderItemsByOrderIdsQuery {
    type Result = HashMap<Uuid, Vec<OrderItemRow>>;

    #[instrument(skip(self, db), fields(orders = self.order_ids.len(), batch_size = self.batch_size))]
    async fn execute(&self, db: &DatabaseConnection) -> Result<Self::Result, ServiceError> {
        debug!("Executing OrderItemsByOrderIdsQuery");

        let mut grouped: HashMap<Uuid, Vec<OrderItemRow>> = HashMap::new();
        if self.order_ids.is_empty() {
            return Ok(grouped);
        }

        let chunk_size = self.batch_size.max(1) as usize;
        for chunk in self.order_ids.chunks(chunk_size) {
            let rows = order_item_rows_select()
                .filter(order_item::Column::OrderId.is_in(chunk.iter().copied()))
                .into_model::<OrderItemRow>()
                .all(db)
                .await?;

            for row in rows {
                grouped.entry(row.order_id).or_default().push(row);
            }
        }

        Ok(grouped)
    }
}
