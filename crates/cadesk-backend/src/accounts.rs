//! # Auth and Account Resolution
//!
//! Two calls turn a bearer token into a role:
//!
//! 1. `GET /auth/v1/user` with the caller's token yields the [`AuthUser`].
//! 2. `GET /rest/v1/accounts?user_id=eq.{id}` yields at most one row whose
//!    `account_type` discriminates professional from business.
//!
//! The second call is a single lookup against one view, so there is no
//! ordering between role tables to get wrong.

use cadesk_core::{AccessToken, AccountProfile, AuthUser, UserId, Validate};

use crate::error::BackendError;
use crate::rest::{check_status, Query, Rest};

const ACCOUNTS: &str = "accounts";

/// Client for the auth API and the `accounts` view.
#[derive(Debug, Clone)]
pub struct AccountClient {
    rest: Rest,
}

impl AccountClient {
    pub(crate) fn new(rest: Rest) -> Self {
        Self { rest }
    }

    /// The user behind `token`, or `None` if the backend rejects the token.
    pub async fn user_for_token(
        &self,
        token: &AccessToken,
    ) -> Result<Option<AuthUser>, BackendError> {
        let endpoint = "GET /auth/v1/user";
        let resp = self
            .rest
            .backoff()
            .read(endpoint, || {
                self.rest
                    .http()
                    .get(self.rest.url("auth/v1/user"))
                    .bearer_auth(token.expose())
                    .send()
            })
            .await
            .map_err(|e| BackendError::Http {
                endpoint: endpoint.into(),
                source: e,
            })?;

        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            tracing::debug!(status = status.as_u16(), "backend rejected access token");
            return Ok(None);
        }

        let resp = check_status(endpoint, resp).await?;
        let bytes = resp.bytes().await.map_err(|e| BackendError::Http {
            endpoint: endpoint.into(),
            source: e,
        })?;
        let user: AuthUser =
            serde_json::from_slice(&bytes).map_err(|e| BackendError::Deserialization {
                endpoint: endpoint.into(),
                source: e,
            })?;
        user.validate().map_err(|e| BackendError::MalformedRow {
            endpoint: endpoint.into(),
            index: 0,
            reason: e.to_string(),
        })?;
        Ok(Some(user))
    }

    /// Resolve the account profile of `user`, or `None` if the user has not
    /// created one yet.
    pub async fn profile(&self, user: UserId) -> Result<Option<AccountProfile>, BackendError> {
        self.rest
            .select_one(ACCOUNTS, Query::new().eq("user_id", user))
            .await
    }
}
