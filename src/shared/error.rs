//! Application Error Types
//!
//! Centralized error handling with Axum integration.
//!
//! Internal error detail (database messages, unexpected faults) is attached to
//! responses only when detail exposure has been switched on at startup, which
//! happens in development environments. Production callers always receive a
//! generic internal-error body.

use std::sync::atomic::{AtomicBool, Ordering};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Whether error responses may carry internal detail. Set once at startup.
static EXPOSE_DETAILS: AtomicBool = AtomicBool::new(false);

/// Enable or disable internal detail on error responses.
///
/// Called from `main` after settings are loaded; `true` only for the
/// development environment.
pub fn set_expose_details(expose: bool) {
    EXPOSE_DETAILS.store(expose, Ordering::Relaxed);
}

fn expose_details() -> bool {
    EXPOSE_DETAILS.load(Ordering::Relaxed)
}

/// Application error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Persistence failure: {0}")]
    Persistence(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// True for errors the caller caused and may safely see verbatim.
    fn is_client_fault(&self) -> bool {
        matches!(
            self,
            AppError::NotFound(_)
                | AppError::BadRequest(_)
                | AppError::Unauthorized(_)
                | AppError::Forbidden(_)
                | AppError::Validation(_)
        )
    }

    /// The message a caller is allowed to read.
    ///
    /// Client-fault errors pass through; server-side failures collapse to a
    /// generic message unless detail exposure is on.
    pub fn client_message(&self) -> String {
        self.message_with_exposure(expose_details())
    }

    fn message_with_exposure(&self, expose: bool) -> String {
        match self {
            AppError::NotFound(msg)
            | AppError::BadRequest(msg)
            | AppError::Unauthorized(msg)
            | AppError::Forbidden(msg)
            | AppError::Validation(msg) => msg.clone(),
            _ if expose => self.to_string(),
            _ => "Internal server error".into(),
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,
}

/// Field-level validation error
#[derive(Debug, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl AppError {
    fn status_and_code(&self) -> (StatusCode, u16) {
        match self {
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, 10001),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, 10002),
            AppError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, 10003),
            AppError::Forbidden(_) => (StatusCode::FORBIDDEN, 10004),
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, 10007),
            AppError::Persistence(_) => (StatusCode::INTERNAL_SERVER_ERROR, 10008),
            AppError::Database(_) | AppError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, 10000)
            }
        }
    }

    fn body(&self, expose: bool) -> ErrorResponse {
        let (_, code) = self.status_and_code();
        let detail = if expose && !self.is_client_fault() {
            Some(self.to_string())
        } else {
            None
        };
        ErrorResponse {
            code,
            message: self.message_with_exposure(expose),
            detail,
            errors: None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if !self.is_client_fault() {
            tracing::error!(error = %self, "Request failed");
        }
        let (status, _) = self.status_and_code();
        let body = self.body(expose_details());
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_faults_pass_through_verbatim() {
        let err = AppError::Validation("You cannot send messages to yourself".into());
        assert_eq!(
            err.message_with_exposure(false),
            "You cannot send messages to yourself"
        );
    }

    #[test]
    fn internal_detail_hidden_unless_exposed() {
        let err = AppError::Persistence("no rows affected".into());
        assert_eq!(err.message_with_exposure(false), "Internal server error");
        assert_eq!(
            err.message_with_exposure(true),
            "Persistence failure: no rows affected"
        );
    }

    #[test]
    fn body_attaches_detail_only_when_exposed() {
        let err = AppError::Internal("boom".into());
        assert!(err.body(false).detail.is_none());
        assert_eq!(err.body(true).detail.as_deref(), Some("Internal error: boom"));
    }
}
