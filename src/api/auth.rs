//! Account endpoints: staff (petugas) and member (anggota) registration and login

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult},
    models::account::{MemberLogin, MemberSession, RegisterMember, StaffCredentials},
};

use super::{ApiJson, ApiKeyAuth};

/// Staff registration response
#[derive(Serialize, ToSchema)]
pub struct StaffRegisterResponse {
    pub id: i64,
    pub username: String,
    pub message: String,
}

/// Staff login response
#[derive(Serialize, ToSchema)]
pub struct StaffLoginResponse {
    pub username: String,
    pub message: String,
}

/// Member registration / login response carrying the access key
#[derive(Serialize, ToSchema)]
pub struct MemberSessionResponse {
    pub member_id: i64,
    pub username: String,
    /// Send this value in `X-API-Key` on later requests
    pub api_key: String,
    pub message: String,
}

impl MemberSessionResponse {
    fn new(session: MemberSession, message: &str) -> Self {
        Self {
            member_id: session.member_id,
            username: session.username,
            api_key: session.api_key,
            message: message.to_string(),
        }
    }
}

/// Register a staff account (master key only)
#[utoipa::path(
    post,
    path = "/register",
    tag = "auth",
    security(("api_key" = [])),
    request_body = StaffCredentials,
    responses(
        (status = 201, description = "Staff account created", body = StaffRegisterResponse),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Master key required"),
        (status = 409, description = "Username already taken")
    )
)]
pub async fn register_staff(
    State(state): State<crate::AppState>,
    ApiKeyAuth(caller): ApiKeyAuth,
    ApiJson(request): ApiJson<StaffCredentials>,
) -> AppResult<(StatusCode, Json<StaffRegisterResponse>)> {
    caller.require_staff()?;

    let username = request.username.clone();
    let id = state.services.auth.register_staff(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(StaffRegisterResponse {
            id,
            username,
            message: "Registration successful".to_string(),
        }),
    ))
}

/// Check staff credentials
#[utoipa::path(
    post,
    path = "/login",
    tag = "auth",
    security(("api_key" = [])),
    request_body = StaffCredentials,
    responses(
        (status = 200, description = "Credentials valid", body = StaffLoginResponse),
        (status = 401, description = "Invalid key or credentials")
    )
)]
pub async fn login_staff(
    State(state): State<crate::AppState>,
    ApiKeyAuth(_caller): ApiKeyAuth,
    ApiJson(request): ApiJson<StaffCredentials>,
) -> AppResult<Json<StaffLoginResponse>> {
    let username = state.services.auth.login_staff(request).await?;

    Ok(Json(StaffLoginResponse {
        username,
        message: "Login successful".to_string(),
    }))
}

/// Member self-registration
#[utoipa::path(
    post,
    path = "/members/register",
    tag = "auth",
    request_body = RegisterMember,
    responses(
        (status = 201, description = "Member registered", body = MemberSessionResponse),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Key required when registration is not public"),
        (status = 409, description = "Username already taken")
    )
)]
pub async fn register_member(
    State(state): State<crate::AppState>,
    caller: Option<ApiKeyAuth>,
    ApiJson(request): ApiJson<RegisterMember>,
) -> AppResult<(StatusCode, Json<MemberSessionResponse>)> {
    if caller.is_none() && !state.services.auth.public_member_registration() {
        return Err(AppError::Authentication("Invalid API key".to_string()));
    }

    let session = state.services.auth.register_member(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(MemberSessionResponse::new(session, "Registration successful")),
    ))
}

/// Member login: issues a new access key, or keeps the one proposed
#[utoipa::path(
    post,
    path = "/members/login",
    tag = "auth",
    request_body = MemberLogin,
    responses(
        (status = 200, description = "Access key issued", body = MemberSessionResponse),
        (status = 400, description = "Proposed key rejected"),
        (status = 401, description = "Invalid username or password"),
        (status = 409, description = "Proposed key already in use")
    )
)]
pub async fn login_member(
    State(state): State<crate::AppState>,
    ApiJson(request): ApiJson<MemberLogin>,
) -> AppResult<Json<MemberSessionResponse>> {
    let session = state.services.auth.login_member(request).await?;
    Ok(Json(MemberSessionResponse::new(session, "Login successful")))
}
