//! # Deadline Reminder Invocation
//!
//! `/functions/v1/deadline-reminders` runs one reminder sweep per call.
//! It is invoked by a scheduler, not by end users, so it sits outside the
//! session middleware. Any method triggers a sweep except `OPTIONS`, which
//! answers `ok` for browser preflights. The handler writes the CORS headers
//! itself on every response, preflight included; there is no CORS layer in
//! front of it to intercept `OPTIONS`.
//!
//! Response bodies are flat rather than the structured error envelope used
//! by `/v1/*`:
//!
//! ```json
//! { "success": true, "message": "Processed 2 deadline notifications",
//!   "processedDeadlines": ["…", "…"] }
//! ```
//!
//! and, only when the selection query fails, status 500 with
//! `{ "error": "…" }`.

use axum::extract::State;
use axum::http::header;
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use axum::{Json, Router};
use cadesk_core::DeadlineId;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::state::AppState;

pub const FUNCTION_PATH: &str = "/functions/v1/deadline-reminders";

/// Request headers browsers may send to the function.
pub const ALLOWED_HEADERS: &str = "authorization, x-client-info, apikey, content-type";

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InvocationSuccess {
    pub success: bool,
    pub message: String,
    pub processed_deadlines: Vec<DeadlineId>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct InvocationFailure {
    pub error: String,
}

pub fn router() -> Router<AppState> {
    Router::new().route(FUNCTION_PATH, any(invoke))
}

/// Any origin, and the function's fixed header list.
fn cors_headers() -> [(header::HeaderName, &'static str); 2] {
    [
        (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
        (header::ACCESS_CONTROL_ALLOW_HEADERS, ALLOWED_HEADERS),
    ]
}

/// Run one reminder sweep.
#[utoipa::path(
    post,
    path = "/functions/v1/deadline-reminders",
    responses(
        (status = 200, description = "Sweep completed; lists the deadlines marked notified", body = InvocationSuccess),
        (status = 500, description = "Due deadlines could not be selected", body = InvocationFailure),
    ),
    tag = "reminders"
)]
pub async fn invoke(State(state): State<AppState>, method: Method) -> Response {
    if method == Method::OPTIONS {
        return (StatusCode::OK, cors_headers(), "ok").into_response();
    }

    match state.sweep.run().await {
        Ok(report) => {
            state.metrics.record_sweep(report.processed.len());
            let body = InvocationSuccess {
                success: true,
                message: report.message(),
                processed_deadlines: report.processed,
            };
            (StatusCode::OK, cors_headers(), Json(body)).into_response()
        }
        Err(err) => {
            state.metrics.record_sweep_failure();
            tracing::error!(error = %err, "Error in deadline-reminders function");
            let body = InvocationFailure {
                error: err.to_string(),
            };
            (StatusCode::INTERNAL_SERVER_ERROR, cors_headers(), Json(body)).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_body_uses_camel_case_key() {
        let body = InvocationSuccess {
            success: true,
            message: "Processed 0 deadline notifications".into(),
            processed_deadlines: vec![],
        };
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("processedDeadlines").is_some());
        assert!(json.get("processed_deadlines").is_none());
    }
}
