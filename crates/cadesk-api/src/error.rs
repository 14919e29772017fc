//! # Structured Error Responses
//!
//! Every JSON route fails with the same body shape:
//!
//! ```json
//! { "error": { "code": "NOT_FOUND", "message": "deadline ... not found" } }
//! ```
//!
//! The reminder invocation endpoint is the one exception; it keeps its own
//! flat `{ "error": string }` body (see [`crate::routes::reminders`]).

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use cadesk_backend::BackendError;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Top-level error envelope.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Machine-readable code plus a human-readable message.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Errors returned by route handlers and middleware.
#[derive(Error, Debug)]
pub enum AppError {
    /// 404.
    #[error("not found: {0}")]
    NotFound(String),

    /// A body decoded but broke a field rule (422).
    #[error("validation error: {0}")]
    Validation(String),

    /// The body or query could not be decoded (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Missing, malformed, or rejected access token (401).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated, but the account kind does not allow this (403).
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// 409.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Logged, never returned verbatim (500).
    #[error("internal error: {0}")]
    Internal(String),

    /// The hosted backend failed or returned something unusable (502).
    #[error("upstream backend error: {0}")]
    Upstream(String),

    /// A required dependency is not configured (503).
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl AppError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            Self::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            Self::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            Self::Upstream(_) => (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR"),
            Self::ServiceUnavailable(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE")
            }
        }
    }

    pub fn upstream(msg: impl Into<String>) -> Self {
        Self::Upstream(msg.into())
    }

    pub fn service_unavailable(msg: &str) -> Self {
        Self::ServiceUnavailable(msg.to_string())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = match &self {
            Self::Internal(_) => "An internal error occurred".to_string(),
            Self::Upstream(_) => "The backend service returned an error".to_string(),
            other => other.to_string(),
        };

        match &self {
            Self::Internal(_) => tracing::error!(error = %self, "internal server error"),
            Self::Upstream(_) => tracing::error!(error = %self, "upstream backend error"),
            Self::ServiceUnavailable(_) => tracing::warn!(error = %self, "service unavailable"),
            _ => {}
        }

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                details: None,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<cadesk_core::ValidationError> for AppError {
    fn from(err: cadesk_core::ValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}

/// Backend status codes the caller can act on keep their meaning; anything
/// else is reported as an upstream failure.
impl From<BackendError> for AppError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Invalid(v) => Self::Validation(v.to_string()),
            BackendError::Api { status: 404, .. } => Self::NotFound(err.to_string()),
            BackendError::Api { status: 409, .. } => Self::Conflict(err.to_string()),
            other => Self::Upstream(other.to_string()),
        }
    }
}
