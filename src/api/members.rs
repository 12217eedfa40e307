//! Member (anggota) management endpoints

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::member::{CreateMember, Member, UpdateMember},
};

use super::{ApiJson, ApiKeyAuth, ApiPath};

/// List members, newest first
#[utoipa::path(
    get,
    path = "/members",
    tag = "members",
    security(("api_key" = [])),
    responses(
        (status = 200, description = "List of members", body = Vec<Member>),
        (status = 401, description = "Invalid API key")
    )
)]
pub async fn list_members(
    State(state): State<crate::AppState>,
    ApiKeyAuth(_caller): ApiKeyAuth,
) -> AppResult<Json<Vec<Member>>> {
    let members = state.services.catalog.list_members().await?;
    Ok(Json(members))
}

/// Get member details by ID
#[utoipa::path(
    get,
    path = "/members/{id}",
    tag = "members",
    security(("api_key" = [])),
    params(
        ("id" = i64, Path, description = "Member ID")
    ),
    responses(
        (status = 200, description = "Member details", body = Member),
        (status = 404, description = "Member not found")
    )
)]
pub async fn get_member(
    State(state): State<crate::AppState>,
    ApiKeyAuth(_caller): ApiKeyAuth,
    ApiPath(id): ApiPath<i64>,
) -> AppResult<Json<Member>> {
    let member = state.services.catalog.get_member(id).await?;
    Ok(Json(member))
}

/// Create a member profile
#[utoipa::path(
    post,
    path = "/members",
    tag = "members",
    security(("api_key" = [])),
    request_body = CreateMember,
    responses(
        (status = 201, description = "Member created", body = Member),
        (status = 400, description = "Name and phone are required")
    )
)]
pub async fn create_member(
    State(state): State<crate::AppState>,
    ApiKeyAuth(_caller): ApiKeyAuth,
    ApiJson(member): ApiJson<CreateMember>,
) -> AppResult<(StatusCode, Json<Member>)> {
    let created = state.services.catalog.create_member(member).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Update a member profile
#[utoipa::path(
    put,
    path = "/members/{id}",
    tag = "members",
    security(("api_key" = [])),
    params(
        ("id" = i64, Path, description = "Member ID")
    ),
    request_body = UpdateMember,
    responses(
        (status = 200, description = "Member updated", body = Member),
        (status = 404, description = "Member not found")
    )
)]
pub async fn update_member(
    State(state): State<crate::AppState>,
    ApiKeyAuth(_caller): ApiKeyAuth,
    ApiPath(id): ApiPath<i64>,
    ApiJson(member): ApiJson<UpdateMember>,
) -> AppResult<Json<Member>> {
    let updated = state.services.catalog.update_member(id, member).await?;
    Ok(Json(updated))
}

/// Delete a member
#[utoipa::path(
    delete,
    path = "/members/{id}",
    tag = "members",
    security(("api_key" = [])),
    params(
        ("id" = i64, Path, description = "Member ID")
    ),
    responses(
        (status = 204, description = "Member deleted"),
        (status = 404, description = "Member not found"),
        (status = 409, description = "Member has active loans")
    )
)]
pub async fn delete_member(
    State(state): State<crate::AppState>,
    ApiKeyAuth(_caller): ApiKeyAuth,
    ApiPath(id): ApiPath<i64>,
) -> AppResult<StatusCode> {
    state.services.catalog.delete_member(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
