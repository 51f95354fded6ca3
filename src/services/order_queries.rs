//! Read-side wrappers behind the versioned order listings.
//!
//! Core business operations and listing/projection concerns have different
//! change rates, so the read side lives in its own service. Each method maps
//! one endpoint version to one query strategy; all of them return the same
//! logical result set.

use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use crate::dto::{
    parse_order_status, OrderDto, OrderItemDto, OrderGraph, OrderItemGraph, OrderQueryDto,
    OrderSearch, OrderSimpleQueryDto, SimpleOrderGraph,
};
use crate::entities::address::Address;
use crate::entities::delivery::Entity as Delivery;
use crate::entities::item::Entity as Item;
use crate::entities::member::Entity as Member;
use crate::entities::{delivery, item, member, order, order_item};
use crate::errors::ServiceError;
use crate::queries::order_dto_queries::{
    OptimizedOrderQueryDtosQuery, OrderQueryDtosQuery, SimpleOrderDtosQuery,
};
use crate::queries::order_queries::{
    OrderItemsByOrderIdsQuery, OrderWithItemRow, OrdersWithItemsQuery,
    OrdersWithMemberDeliveryQuery, PagedOrdersWithMemberDeliveryQuery, SearchOrdersQuery,
};
use crate::queries::Query;

/// De-duplicates the multiplied rows of a collection join, grouping lines
/// under their order in first-seen order.
fn group_order_rows(rows: Vec<OrderWithItemRow>) -> Result<Vec<OrderDto>, ServiceError> {
    let mut index: HashMap<Uuid, usize> = HashMap::new();
    let mut result: Vec<OrderDto> = Vec::new();

    for row in rows {
        let line = OrderItemDto {
            item_name: row.item_name,
            order_price: row.order_price,
            count: row.count,
        };

        if let Some(&at) = index.get(&row.order_id) {
            result[at].order_items.push(line);
        } else {
            let status = parse_order_status(&row.status)?;
            index.insert(row.order_id, result.len());
            result.push(OrderDto {
                order_id: row.order_id,
                name: row.member_name,
                order_date: row.order_date,
                order_status: status,
                address: Address::new(row.city, row.street, row.zipcode),
                order_items: vec![line],
            });
        }
    }

    Ok(result)
}

#[derive(Clone)]
pub struct OrderQueryService {
    db: Arc<DatabaseConnection>,
    batch_fetch_size: u64,
}

impl OrderQueryService {
    pub fn new(db: Arc<DatabaseConnection>, batch_fetch_size: u64) -> Self {
        Self {
            db,
            batch_fetch_size,
        }
    }

    // ------------------------------------------------------------------
    // Full order listings
    // ------------------------------------------------------------------

    /// v1: entity graphs, every association resolved with its own follow-up
    /// query. Costs 1 query for the roots plus several per row.
    #[instrument(skip(self))]
    pub async fn orders_with_associations(
        &self,
        search: OrderSearch,
    ) -> Result<Vec<OrderGraph>, ServiceError> {
        let orders = SearchOrdersQuery { search }.execute(&self.db).await?;

        let mut graphs = Vec::with_capacity(orders.len());
        for order in orders {
            let member = self.member_of(&order).await?;
            let delivery = self.delivery_of(&order).await?;
            let lines = self.lines_of(order.id).await?;

            let mut order_items = Vec::with_capacity(lines.len());
            for line in lines {
                let item = self.item_of(&line).await?;
                order_items.push(OrderItemGraph {
                    order_item: line,
                    item,
                });
            }

            graphs.push(OrderGraph {
                order,
                member,
                delivery,
                order_items,
            });
        }

        Ok(graphs)
    }

    /// v2: same per-row resolution as v1, flattened into response records.
    /// The collection makes the 1 + N shape worse: member, delivery, lines,
    /// and one item lookup per line.
    #[instrument(skip(self))]
    pub async fn orders_as_dtos(&self, search: OrderSearch) -> Result<Vec<OrderDto>, ServiceError> {
        let orders = SearchOrdersQuery { search }.execute(&self.db).await?;

        let mut result = Vec::with_capacity(orders.len());
        for order in orders {
            let member = self.member_of(&order).await?;
            let delivery = self.delivery_of(&order).await?;
            let lines = self.lines_of(order.id).await?;

            let mut order_items = Vec::with_capacity(lines.len());
            for line in &lines {
                let item = self.item_of(line).await?;
                order_items.push(OrderItemDto::from_models(line, &item));
            }

            result.push(OrderDto::from_graph(&order, &member, &delivery, order_items)?);
        }

        Ok(result)
    }

    /// v3: one collection fetch join, de-duplicated in memory. One round
    /// trip, but rows multiply and offset paging is off the table.
    #[instrument(skip(self))]
    pub async fn orders_with_items(&self) -> Result<Vec<OrderDto>, ServiceError> {
        let rows = OrdersWithItemsQuery.execute(&self.db).await?;
        group_order_rows(rows)
    }

    /// v3.1: to-one join paged server-side, collections resolved with the
    /// batched IN-clause loader. Query count stays near-constant however
    /// large the page.
    #[instrument(skip(self), fields(offset = offset, limit = limit))]
    pub async fn orders_paged(&self, offset: u64, limit: u64) -> Result<Vec<OrderDto>, ServiceError> {
        let roots = PagedOrdersWithMemberDeliveryQuery { offset, limit }
            .execute(&self.db)
            .await?;

        let order_ids: Vec<_> = roots.iter().map(|root| root.order_id).collect();
        let mut grouped = OrderItemsByOrderIdsQuery {
            order_ids,
            batch_size: self.batch_fetch_size,
        }
        .execute(&self.db)
        .await?;

        let mut result = Vec::with_capacity(roots.len());
        for root in roots {
            let order_items = grouped
                .remove(&root.order_id)
                .unwrap_or_default()
                .into_iter()
                .map(|line| OrderItemDto {
                    item_name: line.item_name,
                    order_price: line.order_price,
                    count: line.count,
                })
                .collect();
            let status = parse_order_status(&root.status)?;
            result.push(OrderDto {
                order_id: root.order_id,
                name: root.member_name,
                order_date: root.order_date,
                order_status: status,
                address: Address::new(root.city, root.street, root.zipcode),
                order_items,
            });
        }

        Ok(result)
    }

    /// v4: direct projection, collection fetched per root (1 + N).
    #[instrument(skip(self))]
    pub async fn order_dtos(&self) -> Result<Vec<OrderQueryDto>, ServiceError> {
        OrderQueryDtosQuery.execute(&self.db).await
    }

    /// v5: direct projection, collection fetched in one IN-clause (1 + 1).
    #[instrument(skip(self))]
    pub async fn order_dtos_optimized(&self) -> Result<Vec<OrderQueryDto>, ServiceError> {
        OptimizedOrderQueryDtosQuery.execute(&self.db).await
    }

    // ------------------------------------------------------------------
    // Simple (to-one only) listings
    // ------------------------------------------------------------------

    /// simple v1: entity-shaped rows with per-row member/delivery lookups.
    #[instrument(skip(self))]
    pub async fn simple_orders_with_associations(
        &self,
        search: OrderSearch,
    ) -> Result<Vec<SimpleOrderGraph>, ServiceError> {
        let orders = SearchOrdersQuery { search }.execute(&self.db).await?;

        let mut graphs = Vec::with_capacity(orders.len());
        for order in orders {
            let member = self.member_of(&order).await?;
            let delivery = self.delivery_of(&order).await?;
            graphs.push(SimpleOrderGraph {
                order,
                member,
                delivery,
            });
        }

        Ok(graphs)
    }

    /// simple v2: flattened records, still one member and one delivery
    /// lookup per row — the textbook 1 + N.
    #[instrument(skip(self))]
    pub async fn simple_orders_as_dtos(
        &self,
        search: OrderSearch,
    ) -> Result<Vec<OrderSimpleQueryDto>, ServiceError> {
        let orders = SearchOrdersQuery { search }.execute(&self.db).await?;

        let mut result = Vec::with_capacity(orders.len());
        for order in orders {
            let member = self.member_of(&order).await?;
            let delivery = self.delivery_of(&order).await?;
            let status = parse_order_status(&order.status)?;
            result.push(OrderSimpleQueryDto::new(
                order.id,
                member.name,
                order.order_date,
                status,
                delivery.address(),
            ));
        }

        Ok(result)
    }

    /// simple v3: the to-one fetch join; one round trip, rows mapped here.
    #[instrument(skip(self))]
    pub async fn simple_orders_joined(&self) -> Result<Vec<OrderSimpleQueryDto>, ServiceError> {
        let rows = OrdersWithMemberDeliveryQuery.execute(&self.db).await?;

        rows.into_iter()
            .map(|row| {
                let status = parse_order_status(&row.status)?;
                Ok(OrderSimpleQueryDto::new(
                    row.order_id,
                    row.member_name,
                    row.order_date,
                    status,
                    Address::new(row.city, row.street, row.zipcode),
                ))
            })
            .collect()
    }

    /// simple v4: the projection built at the query level.
    #[instrument(skip(self))]
    pub async fn simple_order_dtos(&self) -> Result<Vec<OrderSimpleQueryDto>, ServiceError> {
        SimpleOrderDtosQuery.execute(&self.db).await
    }

    // ------------------------------------------------------------------
    // Per-row association lookups (the N side of 1 + N)
    // ------------------------------------------------------------------

    async fn member_of(&self, order: &order::Model) -> Result<member::Model, ServiceError> {
        Member::find_by_id(order.member_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Member for order {} not found", order.id))
            })
    }

    async fn delivery_of(&self, order: &order::Model) -> Result<delivery::Model, ServiceError> {
        Delivery::find_by_id(order.delivery_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Delivery for order {} not found", order.id))
            })
    }

    async fn lines_of(&self, order_id: Uuid) -> Result<Vec<order_item::Model>, ServiceError> {
        order_item::Entity::find()
            .filter(order_item::Column::OrderId.eq(order_id))
            .all(&*self.db)
            .await
            .map_err(ServiceError::from)
    }

    async fn item_of(&self, line: &order_item::Model) -> Result<item::Model, ServiceError> {
        Item::find_by_id(line.item_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Item for order line {} not found", line.id))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    #[test]
    fn grouping_deduplicates_multiplied_rows() {
        let order_a = Uuid::new_v4();
        let order_b = Uuid::new_v4();
        let date = Utc::now();

        let row = |order_id: Uuid, member: &str, item: &str, count: i32| OrderWithItemRow {
            order_id,
            member_name: member.to_string(),
            order_date: date,
            status: "ORDER".to_string(),
            city: "Seoul".to_string(),
            street: "1".to_string(),
            zipcode: "1111".to_string(),
            item_name: item.to_string(),
            order_price: dec!(10000),
            count,
        };

        let rows = vec![
            row(order_a, "userA", "BOOK1", 1),
            row(order_a, "userA", "BOOK2", 2),
            row(order_b, "userB", "BOOK3", 3),
        ];

        let grouped = group_order_rows(rows).unwrap();
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0].order_id, order_a);
        assert_eq!(grouped[0].order_items.len(), 2);
        assert_eq!(grouped[1].order_id, order_b);
        assert_eq!(grouped[1].order_items.len(), 1);
    }

    #[test]
    fn grouping_rejects_unknown_status() {
        let rows = vec![OrderWithItemRow {
            order_id: Uuid::new_v4(),
            member_name: "userA".to_string(),
            order_date: Utc::now(),
            status: "UNKNOWN".to_string(),
            city: String::new(),
            street: String::new(),
            zipcode: String::new(),
            item_name: "BOOK1".to_string(),
            order_price: dec!(10000),
            count: 1,
        }];

        assert!(group_order_rows(rows).is_err());
    }
}
