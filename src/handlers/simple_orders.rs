//! Listings over the to-one associations only (member, delivery).

use axum::{
    extract::{Query, State},
    Json,
};

use crate::dto::{OrderSearch, OrderSimpleQueryDto, SimpleOrderGraph};
use crate::{ApiResponse, ApiResult, AppState};

/// v1: entity-shaped rows, to-one associations resolved per row.
pub async fn simple_orders_v1(
    State(state): State<AppState>,
    Query(search): Query<OrderSearch>,
) -> ApiResult<Vec<SimpleOrderGraph>> {
    let orders = state
        .services
        .order_queries
        .simple_orders_with_associations(search)
        .await?;
    Ok(Json(ApiResponse::success(orders)))
}

#[utoipa::path(
    get,
    path = "/api/v2/simple-orders",
    summary = "List simple orders (per-row resolution)",
    params(OrderSearch),
    responses(
        (status = 200, description = "Flattened records, one member and delivery lookup per row", body = ApiResponse<Vec<OrderSimpleQueryDto>>),
    ),
    tag = "Simple Orders"
)]
pub async fn simple_orders_v2(
    State(state): State<AppState>,
    Query(search): Query<OrderSearch>,
) -> ApiResult<Vec<OrderSimpleQueryDto>> {
    let orders = state
        .services
        .order_queries
        .simple_orders_as_dtos(search)
        .await?;
    Ok(Json(ApiResponse::success(orders)))
}

#[utoipa::path(
    get,
    path = "/api/v3/simple-orders",
    summary = "List simple orders (to-one fetch join)",
    responses(
        (status = 200, description = "One joined round trip", body = ApiResponse<Vec<OrderSimpleQueryDto>>),
    ),
    tag = "Simple Orders"
)]
pub async fn simple_orders_v3(State(state): State<AppState>) -> ApiResult<Vec<OrderSimpleQueryDto>> {
    let orders = state.services.order_queries.simple_orders_joined().await?;
    Ok(Json(ApiResponse::success(orders)))
}

#[utoipa::path(
    get,
    path = "/api/v4/simple-orders",
    summary = "List simple orders (direct projection)",
    responses(
        (status = 200, description = "Records projected at the query level", body = ApiResponse<Vec<OrderSimpleQueryDto>>),
    ),
    tag = "Simple Orders"
)]
pub async fn simple_orders_v4(State(state): State<AppState>) -> ApiResult<Vec<OrderSimpleQueryDto>> {
    let orders = state.services.order_queries.simple_order_dtos().await?;
    Ok(Json(ApiResponse::success(orders)))
}
