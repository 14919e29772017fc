//! Notification preferences of the caller.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use cadesk_core::{NotificationPreference, Validate};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::CurrentSession;
use crate::error::AppError;
use crate::extractors::extract_json;
use crate::state::AppState;

/// Body of `PUT /v1/preferences`. The owner comes from the session.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PreferenceUpdate {
    pub email_notifications: bool,
    #[serde(default)]
    pub push_notifications: bool,
    pub reminder_days_before: i32,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/v1/preferences", get(get_preferences).put(put_preferences))
}

/// Saved preferences, or the defaults if the caller never saved any.
#[utoipa::path(
    get,
    path = "/v1/preferences",
    responses((status = 200, description = "Notification preferences", body = NotificationPreference)),
    tag = "preferences"
)]
pub async fn get_preferences(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
) -> Result<Json<NotificationPreference>, AppError> {
    let backend = state.require_backend()?;
    let pref = backend
        .preferences()
        .get(session.user_id())
        .await?
        .unwrap_or_else(|| NotificationPreference::defaults_for(session.user_id()));
    Ok(Json(pref))
}

#[utoipa::path(
    put,
    path = "/v1/preferences",
    request_body = PreferenceUpdate,
    responses(
        (status = 200, description = "Saved preferences", body = NotificationPreference),
        (status = 422, description = "reminder_days_before out of range", body = crate::error::ErrorBody),
    ),
    tag = "preferences"
)]
pub async fn put_preferences(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    body: Result<Json<PreferenceUpdate>, JsonRejection>,
) -> Result<Json<NotificationPreference>, AppError> {
    let backend = state.require_backend()?;
    let update = extract_json(body)?;
    let pref = NotificationPreference {
        owner_id: session.user_id(),
        email_notifications: update.email_notifications,
        push_notifications: update.push_notifications,
        reminder_days_before: update.reminder_days_before,
    };
    pref.validate()?;
    Ok(Json(backend.preferences().upsert(&pref).await?))
}
