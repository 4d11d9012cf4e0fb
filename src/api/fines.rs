//! Fine endpoints (librarian only)

use axum::{
    extract::State,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::fine::{Fine, FineView},
    AppState,
};

use super::{ApiPath, AuthenticatedUser};

/// Settled fine
#[derive(Serialize, ToSchema)]
pub struct FineResponse {
    pub fine_id: i32,
    pub message: String,
    pub fine: Fine,
}

/// List overdue loans with their accrued fines
#[utoipa::path(
    get,
    path = "/fines",
    tag = "fines",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Overdue loans", body = Vec<FineView>),
        (status = 401, description = "Missing or invalid token", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_overdue_fines(
    State(state): State<AppState>,
    AuthenticatedUser(_caller): AuthenticatedUser,
) -> AppResult<Json<Vec<FineView>>> {
    let fines = state.services.fines.list_overdue().await?;
    Ok(Json(fines))
}

/// Pay the fine attached to a loan
#[utoipa::path(
    post,
    path = "/fines/{loan_id}/pay",
    tag = "fines",
    security(("bearer_auth" = [])),
    params(
        ("loan_id" = i32, Path, description = "Loan ID")
    ),
    responses(
        (status = 200, description = "Fine paid", body = FineResponse),
        (status = 404, description = "Loan not found", body = crate::error::ErrorResponse),
        (status = 409, description = "No fine attached, already paid or cancelled", body = crate::error::ErrorResponse)
    )
)]
pub async fn pay_fine(
    State(state): State<AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    ApiPath(loan_id): ApiPath<i32>,
) -> AppResult<Json<FineResponse>> {
    let fine = state.services.fines.pay_fine(loan_id).await?;
    tracing::debug!(loan_id, by = caller.user_id, "Fine payment recorded");

    Ok(Json(FineResponse {
        fine_id: fine.id,
        message: format!("Fine {} marked as paid", fine.id),
        fine,
    }))
}

/// Cancel the fine attached to a loan
#[utoipa::path(
    post,
    path = "/fines/{loan_id}/cancel",
    tag = "fines",
    security(("bearer_auth" = [])),
    params(
        ("loan_id" = i32, Path, description = "Loan ID")
    ),
    responses(
        (status = 200, description = "Fine cancelled", body = FineResponse),
        (status = 404, description = "Loan not found", body = crate::error::ErrorResponse),
        (status = 409, description = "No fine attached, already paid or cancelled", body = crate::error::ErrorResponse)
    )
)]
pub async fn cancel_fine(
    State(state): State<AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    ApiPath(loan_id): ApiPath<i32>,
) -> AppResult<Json<FineResponse>> {
    let fine = state.services.fines.cancel_fine(loan_id).await?;
    tracing::debug!(loan_id, by = caller.user_id, "Fine cancellation recorded");

    Ok(Json(FineResponse {
        fine_id: fine.id,
        message: format!("Fine {} cancelled", fine.id),
        fine,
    }))
}
