//! `GET /v1/session`: who the caller is and where they are in onboarding.

use axum::routing::get;
use axum::{Json, Router};
use cadesk_core::{AccountKind, AccountProfile, AuthUser};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::CurrentSession;
use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SessionView {
    pub user: AuthUser,
    /// `None` until the caller creates a profile.
    pub account_kind: Option<AccountKind>,
    pub onboarding_complete: bool,
    pub profile: Option<AccountProfile>,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/v1/session", get(current_session))
}

#[utoipa::path(
    get,
    path = "/v1/session",
    responses(
        (status = 200, description = "Current session", body = SessionView),
        (status = 401, description = "Missing or rejected access token", body = crate::error::ErrorBody),
    ),
    tag = "session"
)]
pub async fn current_session(CurrentSession(session): CurrentSession) -> Json<SessionView> {
    Json(SessionView {
        account_kind: session.kind(),
        onboarding_complete: session.onboarding_complete(),
        user: session.user,
        profile: session.profile,
    })
}
