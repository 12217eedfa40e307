//! Loan management endpoints

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult},
    models::loan::{CreateLoan, Loan, LoanDetails, MemberLoan, ReturnRecord},
};

use super::{ApiJson, ApiKeyAuth, ApiPath};

/// Return request
#[derive(Deserialize, ToSchema)]
pub struct ReturnLoanRequest {
    /// Loan ID
    #[serde(alias = "id_peminjaman")]
    pub loan_id: i64,
}

/// Return response with the closed loan and its return record
#[derive(Serialize, ToSchema)]
pub struct ReturnResponse {
    /// Return status
    pub status: String,
    pub loan: Loan,
    pub return_record: ReturnRecord,
}

/// List all loans for staff review
#[utoipa::path(
    get,
    path = "/loans",
    tag = "loans",
    security(("api_key" = [])),
    responses(
        (status = 200, description = "All loans with book title and member name", body = Vec<LoanDetails>),
        (status = 401, description = "Invalid API key")
    )
)]
pub async fn list_loans(
    State(state): State<crate::AppState>,
    ApiKeyAuth(_caller): ApiKeyAuth,
) -> AppResult<Json<Vec<LoanDetails>>> {
    let loans = state.services.loans.list_loans().await?;
    Ok(Json(loans))
}

/// Get one loan
#[utoipa::path(
    get,
    path = "/loans/{id}",
    tag = "loans",
    security(("api_key" = [])),
    params(
        ("id" = i64, Path, description = "Loan ID")
    ),
    responses(
        (status = 200, description = "Loan details", body = LoanDetails),
        (status = 404, description = "Loan not found")
    )
)]
pub async fn get_loan(
    State(state): State<crate::AppState>,
    ApiKeyAuth(_caller): ApiKeyAuth,
    ApiPath(loan_id): ApiPath<i64>,
) -> AppResult<Json<LoanDetails>> {
    let loan = state.services.loans.get_loan(loan_id).await?;
    Ok(Json(loan))
}

/// Create a new loan (borrow a book)
#[utoipa::path(
    post,
    path = "/loans",
    tag = "loans",
    security(("api_key" = [])),
    request_body = CreateLoan,
    responses(
        (status = 201, description = "Loan created", body = Loan),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "Book or member not found"),
        (status = 409, description = "Book out of stock")
    )
)]
pub async fn create_loan(
    State(state): State<crate::AppState>,
    ApiKeyAuth(_caller): ApiKeyAuth,
    ApiJson(request): ApiJson<CreateLoan>,
) -> AppResult<(StatusCode, Json<Loan>)> {
    let loan = state.services.loans.create_loan(request).await?;
    Ok((StatusCode::CREATED, Json(loan)))
}

/// Return a borrowed book
#[utoipa::path(
    post,
    path = "/returns",
    tag = "loans",
    security(("api_key" = [])),
    request_body = ReturnLoanRequest,
    responses(
        (status = 200, description = "Book returned", body = ReturnResponse),
        (status = 404, description = "Loan not found"),
        (status = 409, description = "Already returned")
    )
)]
pub async fn return_loan(
    State(state): State<crate::AppState>,
    ApiKeyAuth(_caller): ApiKeyAuth,
    ApiJson(request): ApiJson<ReturnLoanRequest>,
) -> AppResult<Json<ReturnResponse>> {
    let (loan, return_record) = state.services.loans.return_loan(request.loan_id).await?;

    Ok(Json(ReturnResponse {
        status: "returned".to_string(),
        loan,
        return_record,
    }))
}

/// Delete a loan
#[utoipa::path(
    delete,
    path = "/loans/{id}",
    tag = "loans",
    security(("api_key" = [])),
    params(
        ("id" = i64, Path, description = "Loan ID")
    ),
    responses(
        (status = 204, description = "Loan deleted, stock restored if it was open"),
        (status = 404, description = "Loan not found")
    )
)]
pub async fn delete_loan(
    State(state): State<crate::AppState>,
    ApiKeyAuth(_caller): ApiKeyAuth,
    ApiPath(loan_id): ApiPath<i64>,
) -> AppResult<StatusCode> {
    state.services.loans.delete_loan(loan_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Get loans for a specific member (dashboard)
#[utoipa::path(
    get,
    path = "/members/{id}/loans",
    tag = "loans",
    security(("api_key" = [])),
    params(
        ("id" = i64, Path, description = "Member ID")
    ),
    responses(
        (status = 200, description = "Member's loans", body = Vec<MemberLoan>),
        (status = 403, description = "Another member's dashboard"),
        (status = 404, description = "Member not found")
    )
)]
pub async fn member_loans(
    State(state): State<crate::AppState>,
    ApiKeyAuth(caller): ApiKeyAuth,
    ApiPath(member_id): ApiPath<i64>,
) -> AppResult<Json<Vec<MemberLoan>>> {
    caller.require_member_access(member_id)?;

    let loans = state.services.loans.list_member_loans(member_id).await?;
    Ok(Json(loans))
}

/// Get the calling member's own loans
#[utoipa::path(
    get,
    path = "/me/loans",
    tag = "loans",
    security(("api_key" = [])),
    responses(
        (status = 200, description = "Caller's loans", body = Vec<MemberLoan>),
        (status = 403, description = "Key is not bound to a member")
    )
)]
pub async fn my_loans(
    State(state): State<crate::AppState>,
    ApiKeyAuth(caller): ApiKeyAuth,
) -> AppResult<Json<Vec<MemberLoan>>> {
    let member_id = caller
        .member_id()
        .ok_or_else(|| AppError::Authorization("Key is not bound to a member".to_string()))?;

    let loans = state.services.loans.list_member_loans(member_id).await?;
    Ok(Json(loans))
}
