//! Loan management endpoints

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{error::AppResult, models::loan::LoanDetails, services::loans::ReturnReceipt, AppState};

use super::{ApiJson, ApiPath};

/// Create loan request
#[derive(Deserialize, Validate, ToSchema)]
pub struct CreateLoanRequest {
    /// Borrower ID
    #[validate(range(min = 1, message = "user_id must be a positive id"))]
    pub user_id: i32,
    /// Book ID
    #[validate(range(min = 1, message = "book_id must be a positive id"))]
    pub book_id: i32,
}

/// Created loan
#[derive(Serialize, ToSchema)]
pub struct LoanResponse {
    /// Loan ID
    pub id: i32,
    pub due_date: NaiveDate,
    pub message: String,
}

/// Return response
#[derive(Serialize, ToSchema)]
pub struct ReturnResponse {
    /// Return status
    pub status: String,
    #[serde(flatten)]
    pub receipt: ReturnReceipt,
}

/// List all loans
#[utoipa::path(
    get,
    path = "/loans",
    tag = "loans",
    responses(
        (status = 200, description = "All loans", body = Vec<LoanDetails>)
    )
)]
pub async fn list_loans(State(state): State<AppState>) -> AppResult<Json<Vec<LoanDetails>>> {
    let loans = state.services.loans.list_loans().await?;
    Ok(Json(loans))
}

/// Get loan by ID
#[utoipa::path(
    get,
    path = "/loans/{id}",
    tag = "loans",
    params(
        ("id" = i32, Path, description = "Loan ID")
    ),
    responses(
        (status = 200, description = "Loan details", body = LoanDetails),
        (status = 404, description = "Loan not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_loan(
    State(state): State<AppState>,
    ApiPath(loan_id): ApiPath<i32>,
) -> AppResult<Json<LoanDetails>> {
    let loan = state.services.loans.get_loan(loan_id).await?;
    Ok(Json(loan))
}

/// Create a new loan (borrow a book)
#[utoipa::path(
    post,
    path = "/loans",
    tag = "loans",
    request_body = CreateLoanRequest,
    responses(
        (status = 201, description = "Loan created", body = LoanResponse),
        (status = 400, description = "Invalid request or book unavailable", body = crate::error::ErrorResponse),
        (status = 404, description = "User not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_loan(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateLoanRequest>,
) -> AppResult<(StatusCode, Json<LoanResponse>)> {
    request.validate()?;

    let (loan_id, due_date) = state
        .services
        .loans
        .create_loan(request.user_id, request.book_id)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(LoanResponse {
            id: loan_id,
            due_date,
            message: "Book borrowed successfully".to_string(),
        }),
    ))
}

/// Return a borrowed book
#[utoipa::path(
    post,
    path = "/loans/{id}/return",
    tag = "loans",
    params(
        ("id" = i32, Path, description = "Loan ID")
    ),
    responses(
        (status = 200, description = "Book returned", body = ReturnResponse),
        (status = 404, description = "Loan not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Already returned, or blocked by an unpaid fine", body = crate::error::ErrorResponse)
    )
)]
pub async fn return_loan(
    State(state): State<AppState>,
    ApiPath(loan_id): ApiPath<i32>,
) -> AppResult<Json<ReturnResponse>> {
    let receipt = state.services.loans.return_loan(loan_id).await?;

    Ok(Json(ReturnResponse {
        status: "returned".to_string(),
        receipt,
    }))
}
