//! Statistics endpoints

use axum::{extract::State, Json};

use crate::{error::AppResult, services::stats::LoanReport, AppState};

use super::AuthenticatedUser;

/// Loan report: total loans and most borrowed titles
#[utoipa::path(
    get,
    path = "/stats/loans",
    tag = "stats",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Loan report", body = LoanReport),
        (status = 401, description = "Missing or invalid token", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_loan_stats(
    State(state): State<AppState>,
    AuthenticatedUser(_caller): AuthenticatedUser,
) -> AppResult<Json<LoanReport>> {
    let report = state.services.stats.loan_report().await?;
    Ok(Json(report))
}
