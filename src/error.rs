//! Error types for the Biblioteca server

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::models::fine::FineStatus;

/// Error codes returned to API clients
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Failure = 1,
    NotAuthorized = 2,
    DbFailure = 3,
    NoSuchEntity = 4,
    BookUnavailable = 5,
    AlreadyReturned = 6,
    FineBlocking = 7,
    FineAlreadyPaid = 8,
    FineCancelled = 9,
    NoFineAttached = 10,
    BadValue = 11,
    Conflict = 12,
}

/// Error taxonomy exposed at the operation boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Conflict,
    InvalidInput,
    Unauthenticated,
    Internal,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Book {0} is unavailable")]
    Unavailable(i32),

    #[error("Loan {0} has already been returned")]
    AlreadyReturned(i32),

    #[error("Return blocked by fine {fine_id} ({status})")]
    FineBlocking { fine_id: i32, status: FineStatus },

    #[error("Fine {0} has already been paid")]
    AlreadyPaid(i32),

    #[error("Fine {0} has been cancelled")]
    FineCancelled(i32),

    #[error("Loan {0} has no fine attached")]
    NoFineAttached(i32),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::NotFound(_) => ErrorKind::NotFound,
            AppError::AlreadyReturned(_)
            | AppError::FineBlocking { .. }
            | AppError::AlreadyPaid(_)
            | AppError::FineCancelled(_)
            | AppError::NoFineAttached(_)
            | AppError::Conflict(_) => ErrorKind::Conflict,
            AppError::Unavailable(_) | AppError::Validation(_) | AppError::BadRequest(_) => {
                ErrorKind::InvalidInput
            }
            AppError::Authentication(_) => ErrorKind::Unauthenticated,
            AppError::Database(_) | AppError::Internal(_) => ErrorKind::Internal,
        }
    }

    pub fn is_internal(&self) -> bool {
        self.kind() == ErrorKind::Internal
    }

    fn code(&self) -> ErrorCode {
        match self {
            AppError::Authentication(_) => ErrorCode::NotAuthorized,
            AppError::NotFound(_) => ErrorCode::NoSuchEntity,
            AppError::Validation(_) | AppError::BadRequest(_) => ErrorCode::BadValue,
            AppError::Unavailable(_) => ErrorCode::BookUnavailable,
            AppError::AlreadyReturned(_) => ErrorCode::AlreadyReturned,
            AppError::FineBlocking { .. } => ErrorCode::FineBlocking,
            AppError::AlreadyPaid(_) => ErrorCode::FineAlreadyPaid,
            AppError::FineCancelled(_) => ErrorCode::FineCancelled,
            AppError::NoFineAttached(_) => ErrorCode::NoFineAttached,
            AppError::Conflict(_) => ErrorCode::Conflict,
            AppError::Database(_) => ErrorCode::DbFailure,
            AppError::Internal(_) => ErrorCode::Failure,
        }
    }
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub code: u32,
    pub error: String,
    pub message: String,
    /// Fine to settle before the return can complete
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fine_id: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fine_status: Option<FineStatus>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self.kind() {
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
            ErrorKind::Unauthenticated => StatusCode::UNAUTHORIZED,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let message = match &self {
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                "Database error".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "Internal server error".to_string()
            }
            AppError::Authentication(msg)
            | AppError::NotFound(msg)
            | AppError::Validation(msg)
            | AppError::BadRequest(msg)
            | AppError::Conflict(msg) => msg.clone(),
            other => other.to_string(),
        };

        let (fine_id, fine_status) = match &self {
            AppError::FineBlocking { fine_id, status } => (Some(*fine_id), Some(*status)),
            AppError::AlreadyPaid(id) | AppError::FineCancelled(id) => (Some(*id), None),
            _ => (None, None),
        };

        let code = self.code();
        let body = Json(ErrorResponse {
            code: code as u32,
            error: format!("{:?}", code),
            message,
            fine_id,
            fine_status,
        });

        (status, body).into_response()
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(errors.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(error = %rejection.body_text(), "Rejected request body");
        let message = match rejection {
            JsonRejection::JsonDataError(_) => "Request body does not match the expected fields",
            JsonRejection::JsonSyntaxError(_) => "Request body is not valid JSON",
            JsonRejection::MissingJsonContentType(_) => "Expected a JSON request body",
            _ => "Invalid request body",
        };
        AppError::BadRequest(message.to_string())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        tracing::debug!(error = %rejection.body_text(), "Rejected path parameters");
        AppError::BadRequest("Invalid path parameter".to_string())
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
