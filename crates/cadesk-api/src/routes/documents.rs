//! # Document Routes
//!
//! Uploads send the file as the raw request body with its metadata in the
//! query string:
//!
//! ```text
//! POST /v1/documents?name=gst-r1.pdf&category=GST&client_id={uuid}
//! Content-Type: application/pdf
//! ```

use axum::body::Bytes;
use axum::extract::rejection::QueryRejection;
use axum::extract::{DefaultBodyLimit, Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::routing::{delete, get};
use axum::{Json, Router};
use cadesk_core::document::MAX_DOCUMENT_BYTES;
use cadesk_core::{Document, DocumentId, NewDocument};

use crate::auth::CurrentSession;
use crate::error::AppError;
use crate::state::AppState;

const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/documents", get(list_documents).post(upload_document))
        .route("/v1/documents/:id", delete(delete_document))
        .layer(DefaultBodyLimit::max(MAX_DOCUMENT_BYTES as usize))
}

#[utoipa::path(
    get,
    path = "/v1/documents",
    responses(
        (status = 200, description = "Caller's documents, newest first", body = Vec<Document>),
    ),
    tag = "documents"
)]
pub async fn list_documents(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
) -> Result<Json<Vec<Document>>, AppError> {
    let backend = state.require_backend()?;
    Ok(Json(
        backend.documents().list_for_owner(session.user_id()).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/v1/documents",
    params(
        ("name" = String, Query, description = "File name"),
        ("category" = String, Query, description = "Document category, e.g. GST"),
        ("client_id" = Option<uuid::Uuid>, Query, description = "Client engagement the document belongs to"),
    ),
    responses(
        (status = 201, description = "Stored and recorded", body = Document),
        (status = 404, description = "Client not found for this caller", body = crate::error::ErrorBody),
        (status = 413, description = "File too large"),
        (status = 422, description = "Invalid metadata", body = crate::error::ErrorBody),
    ),
    tag = "documents"
)]
pub async fn upload_document(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    meta: Result<Query<NewDocument>, QueryRejection>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<Document>), AppError> {
    let backend = state.require_backend()?;
    let Query(meta) = meta.map_err(|e| AppError::BadRequest(e.body_text()))?;
    if body.is_empty() {
        return Err(AppError::Validation("document body must not be empty".into()));
    }

    if let Some(client_id) = meta.client_id {
        backend
            .clients()
            .get(client_id)
            .await?
            .filter(|c| c.involves(session.user_id()))
            .ok_or_else(|| AppError::not_found(format!("client {client_id} not found")))?;
    }

    let mime_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or(DEFAULT_MIME_TYPE);

    let doc = backend
        .documents()
        .upload(session.user_id(), &meta, mime_type, body.to_vec())
        .await?;
    Ok((StatusCode::CREATED, Json(doc)))
}

#[utoipa::path(
    delete,
    path = "/v1/documents/:id",
    params(("id" = uuid::Uuid, Path, description = "Document id")),
    responses(
        (status = 200, description = "Deleted document", body = Document),
        (status = 404, description = "No such document for this caller", body = crate::error::ErrorBody),
    ),
    tag = "documents"
)]
pub async fn delete_document(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Path(id): Path<DocumentId>,
) -> Result<Json<Document>, AppError> {
    let backend = state.require_backend()?;
    backend
        .documents()
        .delete(id, session.user_id())
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found(format!("document {id} not found")))
}
