//! # Compliance Deadline Routes
//!
//! Deadlines are always scoped to the caller: a deadline owned by someone
//! else answers 404, the same as one that does not exist.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use cadesk_core::{ComplianceDeadline, DeadlineId, DeadlinePatch, NewDeadline};

use crate::auth::CurrentSession;
use crate::error::AppError;
use crate::extractors::extract_validated_json;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/deadlines", get(list_deadlines).post(create_deadline))
        .route("/v1/deadlines/:id", get(get_deadline).patch(update_deadline))
}

#[utoipa::path(
    get,
    path = "/v1/deadlines",
    responses(
        (status = 200, description = "Caller's deadlines, soonest first", body = Vec<ComplianceDeadline>),
        (status = 401, description = "Unauthenticated", body = crate::error::ErrorBody),
    ),
    tag = "deadlines"
)]
pub async fn list_deadlines(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
) -> Result<Json<Vec<ComplianceDeadline>>, AppError> {
    let backend = state.require_backend()?;
    let rows = backend.deadlines().list_for_owner(session.user_id()).await?;
    Ok(Json(rows))
}

#[utoipa::path(
    post,
    path = "/v1/deadlines",
    request_body = NewDeadline,
    responses(
        (status = 201, description = "Deadline created", body = ComplianceDeadline),
        (status = 422, description = "Invalid fields", body = crate::error::ErrorBody),
    ),
    tag = "deadlines"
)]
pub async fn create_deadline(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    body: Result<Json<NewDeadline>, JsonRejection>,
) -> Result<(StatusCode, Json<ComplianceDeadline>), AppError> {
    let backend = state.require_backend()?;
    let new = extract_validated_json(body)?;
    let created = backend.deadlines().create(session.user_id(), &new).await?;
    tracing::info!(deadline_id = %created.id, owner_id = %created.owner_id, "deadline created");
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get,
    path = "/v1/deadlines/:id",
    params(("id" = uuid::Uuid, Path, description = "Deadline id")),
    responses(
        (status = 200, description = "Deadline", body = ComplianceDeadline),
        (status = 404, description = "No such deadline for this caller", body = crate::error::ErrorBody),
    ),
    tag = "deadlines"
)]
pub async fn get_deadline(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Path(id): Path<DeadlineId>,
) -> Result<Json<ComplianceDeadline>, AppError> {
    let backend = state.require_backend()?;
    backend
        .deadlines()
        .get(id)
        .await?
        .filter(|d| d.owner_id == session.user_id())
        .map(Json)
        .ok_or_else(|| AppError::not_found(format!("deadline {id} not found")))
}

#[utoipa::path(
    patch,
    path = "/v1/deadlines/:id",
    params(("id" = uuid::Uuid, Path, description = "Deadline id")),
    request_body = DeadlinePatch,
    responses(
        (status = 200, description = "Updated deadline", body = ComplianceDeadline),
        (status = 404, description = "No such deadline for this caller", body = crate::error::ErrorBody),
        (status = 422, description = "Empty or invalid patch", body = crate::error::ErrorBody),
    ),
    tag = "deadlines"
)]
pub async fn update_deadline(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Path(id): Path<DeadlineId>,
    body: Result<Json<DeadlinePatch>, JsonRejection>,
) -> Result<Json<ComplianceDeadline>, AppError> {
    let backend = state.require_backend()?;
    let patch = extract_validated_json(body)?;
    backend
        .deadlines()
        .update(id, session.user_id(), &patch)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found(format!("deadline {id} not found")))
}
