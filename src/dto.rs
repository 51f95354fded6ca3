//! Flat response records and request payloads for the versioned API.
//!
//! Building one of these from an entity graph resolves exactly the
//! associations its fields need; on the un-optimized paths those resolutions
//! are issued per row, which is where the 1 + N query count comes from.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::entities::address::Address;
use crate::entities::delivery::DeliveryStatus;
use crate::entities::order::OrderStatus;
use crate::entities::{delivery, item, member, order, order_item};
use crate::errors::ServiceError;

pub fn parse_order_status(raw: &str) -> Result<OrderStatus, ServiceError> {
    raw.parse::<OrderStatus>()
        .map_err(|_| ServiceError::InvalidStatus(format!("unknown order status: {raw}")))
}

pub fn parse_delivery_status(raw: &str) -> Result<DeliveryStatus, ServiceError> {
    raw.parse::<DeliveryStatus>()
        .map_err(|_| ServiceError::InvalidStatus(format!("unknown delivery status: {raw}")))
}

// ---------------------------------------------------------------------------
// Order response records
// ---------------------------------------------------------------------------

/// Order flattened for list responses, with its lines nested as records.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderDto {
    pub order_id: Uuid,
    pub name: String,
    pub order_date: DateTime<Utc>,
    pub order_status: OrderStatus,
    pub address: Address,
    pub order_items: Vec<OrderItemDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderItemDto {
    pub item_name: String,
    pub order_price: Decimal,
    pub count: i32,
}

impl OrderItemDto {
    pub fn from_models(line: &order_item::Model, item: &item::Model) -> Self {
        Self {
            item_name: item.name.clone(),
            order_price: line.order_price,
            count: line.count,
        }
    }
}

impl OrderDto {
    /// Flattens a fully-resolved entity graph into the response record.
    pub fn from_graph(
        order: &order::Model,
        member: &member::Model,
        delivery: &delivery::Model,
        order_items: Vec<OrderItemDto>,
    ) -> Result<Self, ServiceError> {
        Ok(Self {
            order_id: order.id,
            name: member.name.clone(),
            order_date: order.order_date,
            order_status: parse_order_status(&order.status)?,
            address: delivery.address(),
            order_items,
        })
    }
}

/// To-one projection of an order, constructed directly at the query level.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderSimpleQueryDto {
    pub order_id: Uuid,
    pub name: String,
    pub order_date: DateTime<Utc>,
    pub order_status: OrderStatus,
    pub address: Address,
}

impl OrderSimpleQueryDto {
    pub fn new(
        order_id: Uuid,
        name: String,
        order_date: DateTime<Utc>,
        order_status: OrderStatus,
        address: Address,
    ) -> Self {
        Self {
            order_id,
            name,
            order_date,
            order_status,
            address,
        }
    }
}

/// Full projection of an order, constructed directly at the query level;
/// trades repository reusability for reduced data transfer.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderQueryDto {
    pub order_id: Uuid,
    pub name: String,
    pub order_date: DateTime<Utc>,
    pub order_status: OrderStatus,
    pub address: Address,
    pub order_items: Vec<OrderItemQueryDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderItemQueryDto {
    pub item_name: String,
    pub order_price: Decimal,
    pub count: i32,
}

// ---------------------------------------------------------------------------
// Entity-shaped responses (v1 endpoints)
// ---------------------------------------------------------------------------
//
// These serialize the persistence models directly. The later versions exist
// precisely because coupling the wire format to the entities is brittle;
// the v1 endpoints keep the anti-pattern observable.

#[derive(Debug, Serialize)]
pub struct OrderGraph {
    #[serde(flatten)]
    pub order: order::Model,
    pub member: member::Model,
    pub delivery: delivery::Model,
    pub order_items: Vec<OrderItemGraph>,
}

#[derive(Debug, Serialize)]
pub struct OrderItemGraph {
    #[serde(flatten)]
    pub order_item: order_item::Model,
    pub item: item::Model,
}

#[derive(Debug, Serialize)]
pub struct SimpleOrderGraph {
    #[serde(flatten)]
    pub order: order::Model,
    pub member: member::Model,
    pub delivery: delivery::Model,
}

// ---------------------------------------------------------------------------
// Member requests/responses
// ---------------------------------------------------------------------------

/// v1 create payload: mirrors the member row shape, address columns inline.
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateMemberV1Request {
    #[validate(length(min = 1, message = "Member name is required"))]
    pub name: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub zipcode: String,
}

/// v2 create payload: dedicated request record, decoupled from the row shape.
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateMemberRequest {
    #[validate(length(min = 1, message = "Member name is required"))]
    pub name: String,
    pub address: Option<Address>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateMemberRequest {
    #[validate(length(min = 1, message = "Member name is required"))]
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateMemberResponse {
    pub id: Uuid,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateMemberResponse {
    pub id: Uuid,
    pub name: String,
}

// ---------------------------------------------------------------------------
// Order and item requests
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct PlaceOrderRequest {
    pub member_id: Uuid,
    #[validate(length(min = 1, message = "An order needs at least one line"))]
    pub items: Vec<OrderLineRequest>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct OrderLineRequest {
    pub item_id: Uuid,
    #[validate(range(min = 1, message = "Count must be positive"))]
    pub count: i32,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PlaceOrderResponse {
    pub id: Uuid,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateItemRequest {
    #[validate(length(min = 1, message = "Item name is required"))]
    pub name: String,
    pub price: Decimal,
    #[validate(range(min = 0, message = "Stock cannot be negative"))]
    pub stock_quantity: i32,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateItemRequest {
    #[validate(length(min = 1, message = "Item name is required"))]
    pub name: String,
    pub price: Decimal,
    #[validate(range(min = 0, message = "Stock cannot be negative"))]
    pub stock_quantity: i32,
}

// ---------------------------------------------------------------------------
// Listing filters
// ---------------------------------------------------------------------------

/// Optional filters for the search-based order listings.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct OrderSearch {
    /// Exact status match
    pub status: Option<OrderStatus>,
    /// Member-name substring match
    pub member_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn order_status_parses_its_stored_form() {
        assert_eq!(parse_order_status("ORDER").unwrap(), OrderStatus::Order);
        assert_eq!(parse_order_status("CANCEL").unwrap(), OrderStatus::Cancel);
        assert!(matches!(
            parse_order_status("SHIPPED"),
            Err(ServiceError::InvalidStatus(_))
        ));
    }

    #[test]
    fn delivery_status_parses_its_stored_form() {
        assert_eq!(parse_delivery_status("READY").unwrap(), DeliveryStatus::Ready);
        assert_eq!(parse_delivery_status("COMP").unwrap(), DeliveryStatus::Comp);
        assert!(parse_delivery_status("ready").is_err());
    }

    #[test]
    fn order_dto_flattens_the_graph() {
        let member = member::Model {
            id: Uuid::new_v4(),
            name: "userA".into(),
            city: "Seoul".into(),
            street: "1".into(),
            zipcode: "1111".into(),
            created_at: Utc::now(),
        };
        let delivery = delivery::Model {
            id: Uuid::new_v4(),
            city: "Seoul".into(),
            street: "1".into(),
            zipcode: "1111".into(),
            status: "READY".into(),
        };
        let order = order::Model {
            id: Uuid::new_v4(),
            member_id: member.id,
            delivery_id: delivery.id,
            order_date: Utc::now(),
            status: "ORDER".into(),
        };
        let lines = vec![OrderItemDto {
            item_name: "BOOK1".into(),
            order_price: dec!(10000),
            count: 2,
        }];

        let dto = OrderDto::from_graph(&order, &member, &delivery, lines).unwrap();
        assert_eq!(dto.order_id, order.id);
        assert_eq!(dto.name, "userA");
        assert_eq!(dto.order_status, OrderStatus::Order);
        assert_eq!(dto.address, delivery.address());
        assert_eq!(dto.order_items.len(), 1);
    }

    #[test]
    fn place_order_request_rejects_empty_lines() {
        let request = PlaceOrderRequest {
            member_id: Uuid::new_v4(),
            items: vec![],
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn order_line_rejects_non_positive_count() {
        let line = OrderLineRequest {
            item_id: Uuid::new_v4(),
            count: 0,
        };
        assert!(line.validate().is_err());
        let line = OrderLineRequest {
            item_id: Uuid::new_v4(),
            count: 1,
        };
        assert!(line.validate().is_ok());
    }
}
