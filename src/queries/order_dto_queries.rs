//! Queries that project straight into API records, bypassing the entity
//! models. Less data on the wire and no intermediate objects, at the price of
//! repository code that is coupled to one response shape.

use async_trait::async_trait;
use sea_orm::DatabaseConnection;
use tracing::{debug, instrument};

use super::order_queries::{
    order_item_rows_for, orders_to_one_select, OrderItemRow, OrderItemsByOrderIdsQuery,
    OrderToOneRow, Query,
};
use crate::dto::{parse_order_status, OrderItemQueryDto, OrderQueryDto, OrderSimpleQueryDto};
use crate::entities::address::Address;
use crate::errors::ServiceError;

fn simple_dto_from_row(row: OrderToOneRow) -> Result<OrderSimpleQueryDto, ServiceError> {
    let status = parse_order_status(&row.status)?;
    Ok(OrderSimpleQueryDto::new(
        row.order_id,
        row.member_name,
        row.order_date,
        status,
        Address::new(row.city, row.street, row.zipcode),
    ))
}

fn item_dto_from_row(row: OrderItemRow) -> OrderItemQueryDto {
    OrderItemQueryDto {
        item_name: row.item_name,
        order_price: row.order_price,
        count: row.count,
    }
}

/// To-one projection built in a single round trip.
#[derive(Debug, Default)]
pub struct SimpleOrderDtosQuery;

#[async_trait]
impl Query for SimpleOrderDtosQuery {
    type Result = Vec<OrderSimpleQueryDto>;

    #[instrument(skip(self, db))]
    async fn execute(&self, db: &DatabaseConnection) -> Result<Self::Result, ServiceError> {
        debug!("Executing SimpleOrderDtosQuery");

        let rows = orders_to_one_select()
            .into_model::<OrderToOneRow>()
            .all(db)
            .await?;

        rows.into_iter().map(simple_dto_from_row).collect()
    }
}

/// Full projection: one root query, then one line query per order (1 + N).
/// The to-one associations are joined up front because they do not multiply
/// rows; the collection is resolved per root.
#[derive(Debug, Default)]
pub struct OrderQueryDtosQuery;

#[async_trait]
impl Query for OrderQueryDtosQuery {
    type Result = Vec<OrderQueryDto>;

    #[instrument(skip(self, db))]
    async fn execute(&self, db: &DatabaseConnection) -> Result<Self::Result, ServiceError> {
        debug!("Executing OrderQueryDtosQuery");

        let roots = orders_to_one_select()
            .into_model::<OrderToOneRow>()
            .all(db)
            .await?;

        let mut result = Vec::with_capacity(roots.len());
        for root in roots {
            let lines = order_item_rows_for(db, root.order_id).await?;
            let status = parse_order_status(&root.status)?;
            result.push(OrderQueryDto {
                order_id: root.order_id,
                name: root.member_name,
                order_date: root.order_date,
                order_status: status,
                address: Address::new(root.city, root.street, root.zipcode),
                order_items: lines.into_iter().map(item_dto_from_row).collect(),
            });
        }

        Ok(result)
    }
}

/// Full projection with the collection resolved in one grouped IN-clause
/// query keyed by the whole root id set (1 + 1).
#[derive(Debug, Default)]
pub struct OptimizedOrderQueryDtosQuery;

#[async_trait]
impl Query for OptimizedOrderQueryDtosQuery {
    type Result = Vec<OrderQueryDto>;

    #[instrument(skip(self, db))]
    async fn execute(&self, db: &DatabaseConnection) -> Result<Self::Result, ServiceError> {
        debug!("Executing OptimizedOrderQueryDtosQuery");

        let roots = orders_to_one_select()
            .into_model::<OrderToOneRow>()
            .all(db)
            .await?;

        let order_ids: Vec<_> = roots.iter().map(|root| root.order_id).collect();
        let batch_size = order_ids.len().max(1) as u64;
        let mut grouped = OrderItemsByOrderIdsQuery {
            order_ids,
            batch_size,
        }
        .execute(db)
        .await?;

        let mut result = Vec::with_capacity(roots.len());
        for root in roots {
            let lines = grouped.remove(&root.order_id).unwrap_or_default();
            let status = parse_order_status(&root.status)?;
            result.push(OrderQueryDto {
                order_id: root.order_id,
                name: root.member_name,
                order_date: root.order_date,
                order_status: status,
                address: Address::new(root.city, root.street, root.zipcode),
                order_items: lines.into_iter().map(item_dto_from_row).collect(),
            });
        }

        Ok(result)
    }
}
