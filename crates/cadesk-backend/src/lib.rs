//! # cadesk-backend: Typed client for the hosted backend
//!
//! Provides typed access to the three APIs the hosted backend exposes:
//! - **Tables** via `{base}/rest/v1/{table}` (deadlines, preferences, tasks,
//!   documents, clients, accounts)
//! - **Auth** via `{base}/auth/v1/user`
//! - **Storage** via `{base}/storage/v1/object/{bucket}/{path}`
//!
//! ## Architecture
//!
//! This crate is the only place in the workspace that talks to the backend
//! over HTTP. Every row it returns has been decoded into a `cadesk-core`
//! record and validated; callers never see raw JSON.
//!
//! Requests carry the service credential both as the `apikey` header and as
//! the bearer token. The one exception is [`accounts::AccountClient::user_for_token`],
//! which sends the caller's own access token so the backend reports who
//! that token belongs to.

pub mod accounts;
pub mod clients;
pub mod config;
pub mod deadlines;
pub mod documents;
pub mod error;
pub mod preferences;
pub mod rest;
pub(crate) mod retry;
pub mod tasks;

pub use config::BackendConfig;
pub use error::BackendError;
pub use rest::{PartialRows, RejectedRow};

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};

/// Top-level backend client. Holds one sub-client per record kind.
#[derive(Debug, Clone)]
pub struct BackendClient {
    deadlines: deadlines::DeadlineClient,
    preferences: preferences::PreferenceClient,
    tasks: tasks::TaskClient,
    documents: documents::DocumentClient,
    clients: clients::ClientRecordClient,
    accounts: accounts::AccountClient,
}

impl BackendClient {
    /// Create a client from configuration.
    ///
    /// Construction does not contact the backend and accepts an empty URL
    /// or key; such a client fails on its first request.
    pub fn new(config: BackendConfig) -> Result<Self, BackendError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "apikey",
            HeaderValue::from_str(config.service_key.as_str())
                .map_err(|_| BackendError::Config("service key is not a valid header value".into()))?,
        );
        let mut bearer = HeaderValue::from_str(&format!("Bearer {}", config.service_key.as_str()))
            .map_err(|_| BackendError::Config("service key is not a valid header value".into()))?;
        bearer.set_sensitive(true);
        headers.insert(AUTHORIZATION, bearer);

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| BackendError::Http {
                endpoint: "client_init".into(),
                source: e,
            })?;

        let rest = rest::Rest::new(
            http,
            config.base_url,
            retry::Backoff::new(config.read_retries),
        );
        Ok(Self {
            deadlines: deadlines::DeadlineClient::new(rest.clone()),
            preferences: preferences::PreferenceClient::new(rest.clone()),
            tasks: tasks::TaskClient::new(rest.clone()),
            documents: documents::DocumentClient::new(rest.clone(), config.documents_bucket),
            clients: clients::ClientRecordClient::new(rest.clone()),
            accounts: accounts::AccountClient::new(rest),
        })
    }

    /// Access the compliance deadlines client.
    pub fn deadlines(&self) -> &deadlines::DeadlineClient {
        &self.deadlines
    }

    /// Access the notification preferences client.
    pub fn preferences(&self) -> &preferences::PreferenceClient {
        &self.preferences
    }

    /// Access the tasks client.
    pub fn tasks(&self) -> &tasks::TaskClient {
        &self.tasks
    }

    /// Access the documents client (metadata rows plus stored objects).
    pub fn documents(&self) -> &documents::DocumentClient {
        &self.documents
    }

    /// Access the client records client.
    pub fn clients(&self) -> &clients::ClientRecordClient {
        &self.clients
    }

    /// Access auth and account profile resolution.
    pub fn accounts(&self) -> &accounts::AccountClient {
        &self.accounts
    }
}
