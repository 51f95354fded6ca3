use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

use crate::dto::{parse_delivery_status, parse_order_status, PlaceOrderRequest};
use crate::entities::delivery::{self, DeliveryStatus, Entity as Delivery};
use crate::entities::item::{self, Entity as Item};
use crate::entities::member::Entity as Member;
use crate::entities::order::{self, Entity as Order, OrderStatus};
use crate::entities::order_item::{self, Entity as OrderItem};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};

/// Sum of line totals over an order's lines.
pub fn order_total_of(lines: &[order_item::Model]) -> Decimal {
    lines.iter().map(order_item::Model::line_total).sum()
}

/// Service for the order lifecycle: placement and cancellation.
///
/// An order exclusively owns its delivery and its lines; all three are
/// written inside one transaction, and nothing else ever writes them.
#[derive(Clone)]
pub struct OrderService {
    db: Arc<DatabaseConnection>,
    event_sender: Option<EventSender>,
}

impl OrderService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Option<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// Places an order: snapshots each item's price, decrements stock,
    /// creates the delivery at the member's address and the order itself.
    #[instrument(skip(self, request), fields(member_id = %request.member_id, lines = request.items.len()))]
    pub async fn place_order(&self, request: PlaceOrderRequest) -> Result<Uuid, ServiceError> {
        request.validate()?;
        for line in &request.items {
            line.validate()?;
        }

        let txn = self.db.begin().await?;

        let member = Member::find_by_id(request.member_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Member {} not found", request.member_id))
            })?;

        let delivery = delivery::ActiveModel {
            id: Set(Uuid::new_v4()),
            city: Set(member.city.clone()),
            street: Set(member.street.clone()),
            zipcode: Set(member.zipcode.clone()),
            status: Set(DeliveryStatus::Ready.to_string()),
        }
        .insert(&txn)
        .await?;

        let order = order::ActiveModel {
            id: Set(Uuid::new_v4()),
            member_id: Set(member.id),
            delivery_id: Set(delivery.id),
            order_date: Set(Utc::now()),
            status: Set(OrderStatus::Order.to_string()),
        }
        .insert(&txn)
        .await?;

        for line in &request.items {
            let item = Item::find_by_id(line.item_id)
                .one(&txn)
                .await?
                .ok_or_else(|| {
                    ServiceError::NotFound(format!("Item {} not found", line.item_id))
                })?;

            if item.stock_quantity < line.count {
                return Err(ServiceError::InsufficientStock(format!(
                    "item '{}' has {} in stock, {} requested",
                    item.name, item.stock_quantity, line.count
                )));
            }

            let order_price = item.price;
            let remaining = item.stock_quantity - line.count;
            let mut item_active: item::ActiveModel = item.into();
            item_active.stock_quantity = Set(remaining);
            item_active.update(&txn).await?;

            order_item::ActiveModel {
                id: Set(Uuid::new_v4()),
                order_id: Set(order.id),
                item_id: Set(line.item_id),
                order_price: Set(order_price),
                count: Set(line.count),
            }
            .insert(&txn)
            .await?;
        }

        txn.commit().await?;

        info!(order_id = %order.id, member_id = %member.id, "order placed");
        self.emit(Event::OrderCreated(order.id)).await;

        Ok(order.id)
    }

    /// Cancels an order: refused once the delivery has completed; otherwise
    /// restores each line's stock and flips the status, atomically.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn cancel_order(&self, order_id: Uuid) -> Result<(), ServiceError> {
        let txn = self.db.begin().await?;

        let order = Order::find_by_id(order_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))?;

        if parse_order_status(&order.status)? == OrderStatus::Cancel {
            return Err(ServiceError::InvalidOperation(format!(
                "order {} is already cancelled",
                order_id
            )));
        }

        let delivery = Delivery::find_by_id(order.delivery_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Delivery for order {} not found", order_id))
            })?;

        if parse_delivery_status(&delivery.status)? == DeliveryStatus::Comp {
            return Err(ServiceError::InvalidOperation(
                "delivered orders cannot be cancelled".to_string(),
            ));
        }

        let lines = OrderItem::find()
            .filter(order_item::Column::OrderId.eq(order_id))
            .all(&txn)
            .await?;

        for line in &lines {
            let item = Item::find_by_id(line.item_id)
                .one(&txn)
                .await?
                .ok_or_else(|| {
                    ServiceError::NotFound(format!("Item {} not found", line.item_id))
                })?;

            let restored = item.stock_quantity + line.count;
            let mut item_active: item::ActiveModel = item.into();
            item_active.stock_quantity = Set(restored);
            item_active.update(&txn).await?;
        }

        let mut order_active: order::ActiveModel = order.into();
        order_active.status = Set(OrderStatus::Cancel.to_string());
        order_active.update(&txn).await?;

        txn.commit().await?;

        info!(order_id = %order_id, restored_lines = lines.len(), "order cancelled");
        self.emit(Event::OrderCancelled(order_id)).await;

        Ok(())
    }

    /// Total price of an order: Σ(order_price × count) over its lines.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn order_total(&self, order_id: Uuid) -> Result<Decimal, ServiceError> {
        Order::find_by_id(order_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))?;

        let lines = OrderItem::find()
            .filter(order_item::Column::OrderId.eq(order_id))
            .all(&*self.db)
            .await?;

        Ok(order_total_of(&lines))
    }

    pub async fn get_order(&self, order_id: Uuid) -> Result<Option<order::Model>, ServiceError> {
        Order::find_by_id(order_id)
            .one(&*self.db)
            .await
            .map_err(ServiceError::from)
    }

    async fn emit(&self, event: Event) {
        if let Some(sender) = &self.event_sender {
            if let Err(e) = sender.send(event).await {
                warn!(error = %e, "failed to publish event");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn line(price: Decimal, count: i32) -> order_item::Model {
        order_item::Model {
            id: Uuid::new_v4(),
            order_id: Uuid::new_v4(),
            item_id: Uuid::new_v4(),
            order_price: price,
            count,
        }
    }

    #[test]
    fn order_total_sums_line_totals() {
        let lines = vec![line(dec!(10000), 1), line(dec!(20000), 2)];
        assert_eq!(order_total_of(&lines), dec!(50000));
    }

    #[test]
    fn order_total_of_single_line() {
        let lines = vec![line(dec!(12500), 4)];
        assert_eq!(order_total_of(&lines), dec!(50000));
    }

    #[test]
    fn order_total_of_no_lines_is_zero() {
        assert_eq!(order_total_of(&[]), Decimal::ZERO);
    }
}
