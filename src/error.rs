use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

use crate::auth::GateError;

/// Application-wide error types with appropriate HTTP status codes.
///
/// Authentication denials are not errors; they are
/// [`Denial`](crate::auth::Denial) values rendered by the gate itself.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error(transparent)]
    Gate(#[from] GateError),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response body for API endpoints.
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Full detail stays in the server log
        tracing::error!(error = %self, "Request failed");

        let (error_type, message) = match &self {
            AppError::ConfigError(_) | AppError::Gate(_) => (
                "config_error",
                "Service configuration error. Please contact support.",
            ),
            AppError::Internal(_) => (
                "internal_error",
                "An internal error occurred. Please contact support if the issue persists.",
            ),
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message: message.to_string(),
        };

        (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(body)).into_response()
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
