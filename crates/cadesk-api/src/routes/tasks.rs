//! # Compliance Task Routes
//!
//! A task belongs to a client engagement. Either party to the engagement
//! (the professional or the business) may read its tasks and move them
//! between statuses; only the professional creates them.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router};
use cadesk_backend::BackendClient;
use cadesk_core::{
    AccountKind, ClientId, ClientRecord, ComplianceTask, NewTask, TaskId, TaskStatus, UserId,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::{require_kind, CurrentSession};
use crate::error::AppError;
use crate::extractors::{extract_json, extract_validated_json};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct TaskListParams {
    pub client_id: Option<ClientId>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TaskStatusUpdate {
    pub status: TaskStatus,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/tasks", get(list_tasks).post(create_task))
        .route("/v1/tasks/:id/status", put(update_task_status))
}

/// The engagement `id`, if `user` is a party to it.
async fn engagement_for(
    backend: &BackendClient,
    id: ClientId,
    user: UserId,
) -> Result<ClientRecord, AppError> {
    backend
        .clients()
        .get(id)
        .await?
        .filter(|c| c.involves(user))
        .ok_or_else(|| AppError::not_found(format!("client {id} not found")))
}

#[utoipa::path(
    get,
    path = "/v1/tasks",
    params(("client_id" = Option<uuid::Uuid>, Query, description = "Tasks of this client engagement instead of tasks assigned to the caller")),
    responses(
        (status = 200, description = "Tasks", body = Vec<ComplianceTask>),
        (status = 404, description = "Client not found for this caller", body = crate::error::ErrorBody),
    ),
    tag = "tasks"
)]
pub async fn list_tasks(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    params: Result<Query<TaskListParams>, QueryRejection>,
) -> Result<Json<Vec<ComplianceTask>>, AppError> {
    let backend = state.require_backend()?;
    let Query(params) = params.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let tasks = match params.client_id {
        Some(client_id) => {
            engagement_for(backend, client_id, session.user_id()).await?;
            backend.tasks().list_for_client(client_id).await?
        }
        None => backend.tasks().list_assigned(session.user_id()).await?,
    };
    Ok(Json(tasks))
}

#[utoipa::path(
    post,
    path = "/v1/tasks",
    request_body = NewTask,
    responses(
        (status = 201, description = "Task created", body = ComplianceTask),
        (status = 403, description = "Caller is not a professional", body = crate::error::ErrorBody),
        (status = 404, description = "Client not found for this caller", body = crate::error::ErrorBody),
    ),
    tag = "tasks"
)]
pub async fn create_task(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    body: Result<Json<NewTask>, JsonRejection>,
) -> Result<(StatusCode, Json<ComplianceTask>), AppError> {
    let backend = state.require_backend()?;
    require_kind(&session, AccountKind::Professional)?;
    let new = extract_validated_json(body)?;

    let client = engagement_for(backend, new.client_id, session.user_id()).await?;
    if client.professional_id != session.user_id() {
        return Err(AppError::Forbidden(
            "only the engaged professional can create tasks".into(),
        ));
    }

    let task = backend.tasks().create(&new).await?;
    tracing::info!(task_id = %task.id, client_id = %task.client_id, "task created");
    Ok((StatusCode::CREATED, Json(task)))
}

#[utoipa::path(
    put,
    path = "/v1/tasks/:id/status",
    params(("id" = uuid::Uuid, Path, description = "Task id")),
    request_body = TaskStatusUpdate,
    responses(
        (status = 200, description = "Updated task", body = ComplianceTask),
        (status = 404, description = "Task not found for this caller", body = crate::error::ErrorBody),
    ),
    tag = "tasks"
)]
pub async fn update_task_status(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Path(id): Path<TaskId>,
    body: Result<Json<TaskStatusUpdate>, JsonRejection>,
) -> Result<Json<ComplianceTask>, AppError> {
    let backend = state.require_backend()?;
    let TaskStatusUpdate { status } = extract_json(body)?;

    let not_found = || AppError::not_found(format!("task {id} not found"));
    let task = backend.tasks().get(id).await?.ok_or_else(not_found)?;
    match engagement_for(backend, task.client_id, session.user_id()).await {
        Ok(_) => {}
        Err(AppError::NotFound(_)) => return Err(not_found()),
        Err(e) => return Err(e),
    }

    let updated = backend
        .tasks()
        .update_status(id, status)
        .await?
        .ok_or_else(not_found)?;
    tracing::info!(task_id = %id, status = %status, "task status updated");
    Ok(Json(updated))
}
