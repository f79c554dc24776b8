//! API error types with structured JSON responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::db::DatabaseError;
use crate::error::BookingError;

/// Structured error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
}

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Authentication required")]
    Unauthorized,
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error(transparent)]
    Domain(#[from] BookingError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "AUTH_REQUIRED",
                "Authentication required".to_string(),
            ),
            ApiError::BadRequest(detail) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", detail.clone())
            }
            ApiError::Domain(err) => domain_mapping(err),
        };

        let body = ErrorBody {
            error: ErrorDetail { code, message },
        };
        (status, Json(body)).into_response()
    }
}

/// Stable (status, code) pair per domain error kind, so the
/// presentation layer can translate without string matching.
fn domain_mapping(err: &BookingError) -> (StatusCode, &'static str, String) {
    match err {
        BookingError::NotFound { .. } => {
            (StatusCode::NOT_FOUND, "NOT_FOUND", err.to_string())
        }
        BookingError::Forbidden => (StatusCode::FORBIDDEN, "FORBIDDEN", err.to_string()),
        BookingError::SlotConflict => {
            (StatusCode::CONFLICT, "SLOT_CONFLICT", err.to_string())
        }
        BookingError::InvalidTransition { .. } => {
            (StatusCode::CONFLICT, "INVALID_TRANSITION", err.to_string())
        }
        // Distinct code: callers render this as a non-error notice
        BookingError::AlreadyCancelled => {
            (StatusCode::CONFLICT, "ALREADY_CANCELLED", err.to_string())
        }
        BookingError::TerminalState => {
            (StatusCode::CONFLICT, "TERMINAL_STATE", err.to_string())
        }
        BookingError::AlreadyPaid => {
            (StatusCode::CONFLICT, "ALREADY_PAID", err.to_string())
        }
        BookingError::PaymentRejected => (
            StatusCode::UNPROCESSABLE_ENTITY,
            "PAYMENT_REJECTED",
            err.to_string(),
        ),
        BookingError::Validation(detail) => {
            (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", detail.clone())
        }
        BookingError::Database(detail) => {
            tracing::error!(%detail, "storage failure");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL",
                "An internal error occurred".to_string(),
            )
        }
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        ApiError::Domain(BookingError::Database(err))
    }
}
