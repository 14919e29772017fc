//! Health probes and counters. None of these require a session.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use crate::error::AppError;
use crate::middleware::metrics::MetricsSnapshot;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health/liveness", get(liveness))
        .route("/health/readiness", get(readiness))
        .route("/metrics", get(metrics))
}

/// 200 while the process is up.
async fn liveness() -> &'static str {
    "ok"
}

/// 200 when the database (if configured) answers a trivial query.
async fn readiness(State(state): State<AppState>) -> Result<&'static str, AppError> {
    if let Some(pool) = &state.db_pool {
        sqlx::query("SELECT 1").execute(pool).await.map_err(|e| {
            tracing::warn!(error = %e, "readiness check failed");
            AppError::service_unavailable("database unreachable")
        })?;
    }
    Ok("ready")
}

#[utoipa::path(
    get,
    path = "/metrics",
    responses((status = 200, description = "Request and sweep counters", body = MetricsSnapshot)),
    tag = "ops"
)]
pub async fn metrics(State(state): State<AppState>) -> Json<MetricsSnapshot> {
    Json(state.metrics.snapshot())
}
