//! Client engagement routes. Listing and creating clients is for
//! professional accounts; either party may read a single engagement.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use cadesk_core::{AccountKind, ClientId, ClientRecord, NewClient};

use crate::auth::{require_kind, CurrentSession};
use crate::error::AppError;
use crate::extractors::extract_validated_json;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/clients", get(list_clients).post(create_client))
        .route("/v1/clients/:id", get(get_client))
}

#[utoipa::path(
    get,
    path = "/v1/clients",
    responses(
        (status = 200, description = "The professional's clients", body = Vec<ClientRecord>),
        (status = 403, description = "Caller is not a professional", body = crate::error::ErrorBody),
    ),
    tag = "clients"
)]
pub async fn list_clients(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
) -> Result<Json<Vec<ClientRecord>>, AppError> {
    let backend = state.require_backend()?;
    require_kind(&session, AccountKind::Professional)?;
    Ok(Json(
        backend
            .clients()
            .list_for_professional(session.user_id())
            .await?,
    ))
}

#[utoipa::path(
    post,
    path = "/v1/clients",
    request_body = NewClient,
    responses(
        (status = 201, description = "Client added in onboarding", body = ClientRecord),
        (status = 403, description = "Caller is not a professional", body = crate::error::ErrorBody),
        (status = 422, description = "Invalid fields", body = crate::error::ErrorBody),
    ),
    tag = "clients"
)]
pub async fn create_client(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    body: Result<Json<NewClient>, JsonRejection>,
) -> Result<(StatusCode, Json<ClientRecord>), AppError> {
    let backend = state.require_backend()?;
    require_kind(&session, AccountKind::Professional)?;
    let new = extract_validated_json(body)?;
    let client = backend.clients().create(session.user_id(), &new).await?;
    tracing::info!(client_id = %client.id, professional_id = %client.professional_id, "client added");
    Ok((StatusCode::CREATED, Json(client)))
}

#[utoipa::path(
    get,
    path = "/v1/clients/:id",
    params(("id" = uuid::Uuid, Path, description = "Client id")),
    responses(
        (status = 200, description = "Client engagement", body = ClientRecord),
        (status = 404, description = "No such client for this caller", body = crate::error::ErrorBody),
    ),
    tag = "clients"
)]
pub async fn get_client(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Path(id): Path<ClientId>,
) -> Result<Json<ClientRecord>, AppError> {
    let backend = state.require_backend()?;
    backend
        .clients()
        .get(id)
        .await?
        .filter(|c| c.involves(session.user_id()))
        .map(Json)
        .ok_or_else(|| AppError::not_found(format!("client {id} not found")))
}
