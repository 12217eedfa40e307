//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, books, health, loans, members};

/// Registers the `X-API-Key` header scheme referenced by the paths
struct ApiKeyScheme;

impl Modify for ApiKeyScheme {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "api_key",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("X-API-Key"))),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Pustaka API",
        version = "0.3.0",
        description = "Library lending REST API: catalog, members, loans and returns"
    ),
    servers(
        (url = "/api", description = "API")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Accounts
        auth::register_staff,
        auth::login_staff,
        auth::register_member,
        auth::login_member,
        // Books
        books::list_books,
        books::get_book,
        books::create_book,
        books::update_book,
        books::delete_book,
        // Members
        members::list_members,
        members::get_member,
        members::create_member,
        members::update_member,
        members::delete_member,
        // Loans
        loans::list_loans,
        loans::get_loan,
        loans::create_loan,
        loans::return_loan,
        loans::delete_loan,
        loans::member_loans,
        loans::my_loans,
    ),
    components(
        schemas(
            // Accounts
            crate::models::account::StaffCredentials,
            crate::models::account::RegisterMember,
            crate::models::account::MemberLogin,
            auth::StaffRegisterResponse,
            auth::StaffLoginResponse,
            auth::MemberSessionResponse,
            // Books
            crate::models::book::Book,
            crate::models::book::CreateBook,
            crate::models::book::UpdateBook,
            // Members
            crate::models::member::Member,
            crate::models::member::CreateMember,
            crate::models::member::UpdateMember,
            // Loans
            crate::models::loan::Loan,
            crate::models::loan::LoanStatus,
            crate::models::loan::LoanDetails,
            crate::models::loan::MemberLoan,
            crate::models::loan::ReturnRecord,
            crate::models::loan::CreateLoan,
            loans::ReturnLoanRequest,
            loans::ReturnResponse,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    modifiers(&ApiKeyScheme),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Staff and member accounts"),
        (name = "books", description = "Book catalog"),
        (name = "members", description = "Member management"),
        (name = "loans", description = "Loans, returns and dashboards")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
