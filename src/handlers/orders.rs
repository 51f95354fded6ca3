use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::dto::{
    OrderDto, OrderGraph, OrderQueryDto, OrderSearch, PlaceOrderRequest, PlaceOrderResponse,
};
use crate::{ApiResponse, ApiResult, AppState, PageQuery};

#[utoipa::path(
    post,
    path = "/api/v1/orders",
    summary = "Place order",
    request_body = PlaceOrderRequest,
    responses(
        (status = 200, description = "Order placed", body = ApiResponse<PlaceOrderResponse>),
        (status = 400, description = "Validation failure", body = crate::errors::ErrorResponse),
        (status = 404, description = "Member or item not found", body = crate::errors::ErrorResponse),
        (status = 422, description = "Insufficient stock", body = crate::errors::ErrorResponse),
    ),
    tag = "Orders"
)]
pub async fn create_order(
    State(state): State<AppState>,
    Json(request): Json<PlaceOrderRequest>,
) -> ApiResult<PlaceOrderResponse> {
    let id = state.services.orders.place_order(request).await?;
    Ok(Json(ApiResponse::success(PlaceOrderResponse { id })))
}

#[utoipa::path(
    post,
    path = "/api/v1/orders/{id}/cancel",
    summary = "Cancel order",
    params(("id" = Uuid, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order cancelled", body = ApiResponse<Value>),
        (status = 400, description = "Delivery already completed", body = crate::errors::ErrorResponse),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse),
    ),
    tag = "Orders"
)]
pub async fn cancel_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Value> {
    state.services.orders.cancel_order(id).await?;
    Ok(Json(ApiResponse::success(json!({
        "id": id,
        "status": "CANCEL",
    }))))
}

/// v1: entity graphs on the wire, every association resolved per row.
pub async fn orders_v1(
    State(state): State<AppState>,
    Query(search): Query<OrderSearch>,
) -> ApiResult<Vec<OrderGraph>> {
    let orders = state
        .services
        .order_queries
        .orders_with_associations(search)
        .await?;
    Ok(Json(ApiResponse::success(orders)))
}

#[utoipa::path(
    get,
    path = "/api/v2/orders",
    summary = "List orders (per-row resolution)",
    params(OrderSearch),
    responses(
        (status = 200, description = "Orders flattened to response records", body = ApiResponse<Vec<OrderDto>>),
    ),
    tag = "Orders"
)]
pub async fn orders_v2(
    State(state): State<AppState>,
    Query(search): Query<OrderSearch>,
) -> ApiResult<Vec<OrderDto>> {
    let orders = state.services.order_queries.orders_as_dtos(search).await?;
    Ok(Json(ApiResponse::success(orders)))
}

#[utoipa::path(
    get,
    path = "/api/v3/orders",
    summary = "List orders (collection fetch join)",
    responses(
        (status = 200, description = "Orders from one joined round trip", body = ApiResponse<Vec<OrderDto>>),
    ),
    tag = "Orders"
)]
pub async fn orders_v3(State(state): State<AppState>) -> ApiResult<Vec<OrderDto>> {
    let orders = state.services.order_queries.orders_with_items().await?;
    Ok(Json(ApiResponse::success(orders)))
}

#[utoipa::path(
    get,
    path = "/api/v3.1/orders",
    summary = "List orders (paged to-one join + batched collections)",
    params(PageQuery),
    responses(
        (status = 200, description = "One page of orders", body = ApiResponse<Vec<OrderDto>>),
    ),
    tag = "Orders"
)]
pub async fn orders_v3_paged(
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
) -> ApiResult<Vec<OrderDto>> {
    let orders = state
        .services
        .order_queries
        .orders_paged(page.offset, page.limit)
        .await?;
    Ok(Json(ApiResponse::success(orders)))
}

#[utoipa::path(
    get,
    path = "/api/v4/orders",
    summary = "List orders (direct projection, per-order collections)",
    responses(
        (status = 200, description = "Orders projected at the query level", body = ApiResponse<Vec<OrderQueryDto>>),
    ),
    tag = "Orders"
)]
pub async fn orders_v4(State(state): State<AppState>) -> ApiResult<Vec<OrderQueryDto>> {
    let orders = state.services.order_queries.order_dtos().await?;
    Ok(Json(ApiResponse::success(orders)))
}

#[utoipa::path(
    get,
    path = "/api/v5/orders",
    summary = "List orders (direct projection, grouped collections)",
    responses(
        (status = 200, description = "Orders projected with one IN-clause collection load", body = ApiResponse<Vec<OrderQueryDto>>),
    ),
    tag = "Orders"
)]
pub async fn orders_v5(State(state): State<AppState>) -> ApiResult<Vec<OrderQueryDto>> {
    let orders = state.services.order_queries.order_dtos_optimized().await?;
    Ok(Json(ApiResponse::success(orders)))
}
