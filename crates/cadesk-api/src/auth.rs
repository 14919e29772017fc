//! # Session Middleware
//!
//! Every `/v1/*` request carries the caller's backend access token as
//! `Authorization: Bearer {token}`. The middleware:
//!
//! 1. asks the backend auth API who the token belongs to,
//! 2. resolves that user's account profile with a single lookup,
//! 3. injects the resulting [`Session`] into the request extensions.
//!
//! Handlers take [`CurrentSession`] to read it. Nothing about the caller is
//! stored outside the request.

use axum::extract::{Request, State};
use axum::http::request::Parts;
use axum::http::{header, HeaderMap};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use cadesk_core::{AccessToken, AccountKind, Session};

use crate::error::AppError;
use crate::state::AppState;

/// The session the middleware attached to this request.
#[derive(Debug, Clone)]
pub struct CurrentSession(pub Session);

#[axum::async_trait]
impl<S: Send + Sync> axum::extract::FromRequestParts<S> for CurrentSession {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Session>()
            .cloned()
            .map(CurrentSession)
            .ok_or_else(|| AppError::Unauthorized("no session in request context".into()))
    }
}

/// Require the caller to hold an account of `kind`. Callers who have not
/// created a profile yet are refused as well.
pub fn require_kind(session: &Session, kind: AccountKind) -> Result<(), AppError> {
    if session.is(kind) {
        return Ok(());
    }
    match session.kind() {
        Some(other) => Err(AppError::Forbidden(format!(
            "{kind} account required, caller is {other}"
        ))),
        None => Err(AppError::Forbidden(format!(
            "{kind} account required; complete onboarding first"
        ))),
    }
}

/// Pull the bearer token out of the `Authorization` header.
pub fn bearer_token(headers: &HeaderMap) -> Result<AccessToken, AppError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| AppError::Unauthorized("missing authorization header".into()))?
        .to_str()
        .map_err(|_| AppError::Unauthorized("authorization header is not valid text".into()))?;
    let token = value.strip_prefix("Bearer ").ok_or_else(|| {
        AppError::Unauthorized("authorization header must use Bearer scheme".into())
    })?;
    let token = token.trim();
    if token.is_empty() {
        return Err(AppError::Unauthorized("empty bearer token".into()));
    }
    Ok(AccessToken::new(token))
}

async fn resolve_session(state: &AppState, headers: &HeaderMap) -> Result<Session, AppError> {
    let backend = state.require_backend()?;
    let token = bearer_token(headers)?;
    let user = backend
        .accounts()
        .user_for_token(&token)
        .await?
        .ok_or_else(|| AppError::Unauthorized("invalid or expired access token".into()))?;
    let profile = backend.accounts().profile(user.id).await?;
    tracing::debug!(
        user_id = %user.id,
        account_kind = profile.as_ref().map(|p| p.kind().as_str()),
        "session resolved"
    );
    Ok(Session::new(user, token, profile))
}

/// Resolve the caller and attach a [`Session`], or answer with the error.
pub async fn session_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    match resolve_session(&state, request.headers()).await {
        Ok(session) => {
            request.extensions_mut().insert(session);
            next.run(request).await
        }
        Err(err) => {
            if matches!(err, AppError::Unauthorized(_)) {
                tracing::warn!(error = %err, "authentication failed");
            }
            err.into_response()
        }
    }
}
