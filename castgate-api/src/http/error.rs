// HTTP error handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Result type for HTTP handlers
pub type AppResult<T> = Result<T, AppError>;

/// Application error with HTTP status code
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.status, self.message)
    }
}

impl std::error::Error for AppError {}

/// Error response JSON structure
#[derive(Debug, Serialize, Deserialize)]
struct ErrorResponse {
    error: String,
    status: u16,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status;
        let body = Json(ErrorResponse {
            error: self.message,
            status: status.as_u16(),
        });

        (status, body).into_response()
    }
}

/// Convert castgate_core errors to HTTP errors.
///
/// Anything carrying server-side detail is logged here and flattened to a
/// generic message; the client never sees store or provider internals.
impl From<castgate_core::Error> for AppError {
    fn from(err: castgate_core::Error) -> Self {
        use castgate_core::Error;

        match err {
            Error::UserNotFound => AppError::forbidden("not authorized"),
            Error::Conflict(msg) => AppError::conflict(msg),
            Error::NotFound(msg) => AppError::not_found(msg),
            Error::StateMismatch | Error::MissingCode => AppError::bad_request("oauth failure"),
            Error::Configuration(_) => AppError::bad_request("oauth not configured"),
            Error::InvalidInput(msg) => AppError::bad_request(msg),
            Error::Upstream(msg) => {
                tracing::error!("Upstream failure: {}", msg);
                AppError::bad_request("oauth failure")
            }
            Error::Sealing(msg) => {
                tracing::error!("Sealing error: {}", msg);
                AppError::internal_server_error("Internal server error")
            }
            Error::Database(e) => {
                tracing::error!("Database error: {}", e);
                AppError::internal_server_error("Database error")
            }
            Error::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                AppError::internal_server_error("Internal server error")
            }
        }
    }
}

/// Convert anyhow errors to HTTP errors
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        tracing::error!("Anyhow error: {}", err);
        AppError::internal_server_error("Internal server error")
    }
}
