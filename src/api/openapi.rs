//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{fines, health, loans, stats};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Biblioteca API",
        version = "0.3.0",
        description = "Library back office REST API: loans, returns and fines"
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Loans
        loans::list_loans,
        loans::get_loan,
        loans::create_loan,
        loans::return_loan,
        // Fines
        fines::list_overdue_fines,
        fines::pay_fine,
        fines::cancel_fine,
        // Stats
        stats::get_loan_stats,
    ),
    components(
        schemas(
            // Loans
            loans::CreateLoanRequest,
            loans::LoanResponse,
            loans::ReturnResponse,
            crate::services::loans::ReturnReceipt,
            crate::models::loan::LoanDetails,
            crate::models::loan::LoanState,
            crate::models::book::BookShort,
            crate::models::user::UserShort,
            // Fines
            fines::FineResponse,
            crate::models::fine::Fine,
            crate::models::fine::FineStatus,
            crate::models::fine::FineView,
            // Stats
            crate::services::stats::LoanReport,
            crate::models::book::BookLoanCount,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "loans", description = "Loan management"),
        (name = "fines", description = "Fine payment and overdue listing"),
        (name = "stats", description = "Statistics")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
