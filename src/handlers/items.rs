use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::Value;
use uuid::Uuid;

use crate::dto::{CreateItemRequest, UpdateItemRequest};
use crate::entities::item;
use crate::{ApiResponse, ApiResult, AppState};

#[utoipa::path(
    post,
    path = "/api/v1/items",
    summary = "Create item",
    request_body = CreateItemRequest,
    responses(
        (status = 200, description = "Item created", body = ApiResponse<Value>),
        (status = 400, description = "Validation failure", body = crate::errors::ErrorResponse),
    ),
    tag = "Items"
)]
pub async fn create_item(
    State(state): State<AppState>,
    Json(request): Json<CreateItemRequest>,
) -> ApiResult<item::Model> {
    let item = state.services.items.create_item(request).await?;
    Ok(Json(ApiResponse::success(item)))
}

#[utoipa::path(
    get,
    path = "/api/v1/items",
    summary = "List items",
    responses(
        (status = 200, description = "Catalog items", body = ApiResponse<Value>),
    ),
    tag = "Items"
)]
pub async fn list_items(State(state): State<AppState>) -> ApiResult<Vec<item::Model>> {
    let items = state.services.items.list().await?;
    Ok(Json(ApiResponse::success(items)))
}

#[utoipa::path(
    put,
    path = "/api/v1/items/{id}",
    summary = "Update item",
    params(("id" = Uuid, Path, description = "Item id")),
    request_body = UpdateItemRequest,
    responses(
        (status = 200, description = "Item updated", body = ApiResponse<Value>),
        (status = 404, description = "Item not found", body = crate::errors::ErrorResponse),
    ),
    tag = "Items"
)]
pub async fn update_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateItemRequest>,
) -> ApiResult<item::Model> {
    let item = state.services.items.update_item(id, request).await?;
    Ok(Json(ApiResponse::success(item)))
}
