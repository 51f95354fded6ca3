use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::dto::{
    CreateMemberRequest, CreateMemberResponse, CreateMemberV1Request, UpdateMemberRequest,
    UpdateMemberResponse,
};
use crate::entities::address::Address;
use crate::entities::member;
use crate::{ApiResponse, ApiResult, AppState};

/// v1: binds the row shape straight off the wire. Changing the member row
/// changes this endpoint's contract, which is why v2 exists.
pub async fn create_member_v1(
    State(state): State<AppState>,
    Json(payload): Json<CreateMemberV1Request>,
) -> ApiResult<CreateMemberResponse> {
    let request = CreateMemberRequest {
        name: payload.name,
        address: Some(Address::new(payload.city, payload.street, payload.zipcode)),
    };

    let member = state.services.members.register(request).await?;
    Ok(Json(ApiResponse::success(CreateMemberResponse {
        id: member.id,
    })))
}

/// v1: returns the member rows as-is. The inverse order association is never
/// part of the payload; it exists only as a query on the order side.
pub async fn list_members_v1(
    State(state): State<AppState>,
) -> ApiResult<Vec<member::Model>> {
    let members = state.services.members.list().await?;
    Ok(Json(ApiResponse::success(members)))
}

#[utoipa::path(
    post,
    path = "/api/v2/members",
    summary = "Register member",
    request_body = CreateMemberRequest,
    responses(
        (status = 200, description = "Member registered", body = ApiResponse<CreateMemberResponse>),
        (status = 400, description = "Validation failure", body = crate::errors::ErrorResponse),
        (status = 409, description = "Name already registered", body = crate::errors::ErrorResponse),
    ),
    tag = "Members"
)]
pub async fn create_member_v2(
    State(state): State<AppState>,
    Json(request): Json<CreateMemberRequest>,
) -> ApiResult<CreateMemberResponse> {
    let member = state.services.members.register(request).await?;
    Ok(Json(ApiResponse::success(CreateMemberResponse {
        id: member.id,
    })))
}

#[utoipa::path(
    put,
    path = "/api/v2/members/{id}",
    summary = "Rename member",
    params(("id" = Uuid, Path, description = "Member id")),
    request_body = UpdateMemberRequest,
    responses(
        (status = 200, description = "Member renamed", body = ApiResponse<UpdateMemberResponse>),
        (status = 404, description = "Member not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Name already registered", body = crate::errors::ErrorResponse),
    ),
    tag = "Members"
)]
pub async fn update_member_v2(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateMemberRequest>,
) -> ApiResult<UpdateMemberResponse> {
    let member = state.services.members.update_name(id, request).await?;
    Ok(Json(ApiResponse::success(UpdateMemberResponse {
        id: member.id,
        name: member.name,
    })))
}
