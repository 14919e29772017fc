//! Backend client configuration.
//!
//! The connection URL and the privileged service credential are read from
//! the environment. Neither is validated here: an absent variable yields an
//! empty string, and the first request made with it fails instead.

use zeroize::Zeroizing;

use crate::retry::DEFAULT_READ_RETRIES;

/// Default object-storage bucket for uploaded documents.
pub const DEFAULT_DOCUMENTS_BUCKET: &str = "documents";

/// Configuration for connecting to the hosted backend.
///
/// `Debug` prints `service_key` as `[REDACTED]`.
#[derive(Clone)]
pub struct BackendConfig {
    /// Project URL, e.g. `https://abc.backend.example`. No trailing path.
    pub base_url: String,
    /// Privileged service credential sent as `apikey` and bearer token.
    pub service_key: Zeroizing<String>,
    /// Storage bucket holding uploaded documents.
    pub documents_bucket: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Re-sends allowed for a read that got no response.
    pub read_retries: u32,
}

impl std::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendConfig")
            .field("base_url", &self.base_url)
            .field("service_key", &"[REDACTED]")
            .field("documents_bucket", &self.documents_bucket)
            .field("timeout_secs", &self.timeout_secs)
            .field("read_retries", &self.read_retries)
            .finish()
    }
}

impl BackendConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `BACKEND_URL` (empty if unset)
    /// - `BACKEND_SERVICE_KEY` (empty if unset)
    /// - `BACKEND_DOCUMENTS_BUCKET` (default: `documents`)
    /// - `BACKEND_TIMEOUT_SECS` (default: 30)
    /// - `BACKEND_READ_RETRIES` (default: 3)
    pub fn from_env() -> Self {
        Self {
            base_url: env_or_empty("BACKEND_URL"),
            service_key: Zeroizing::new(env_or_empty("BACKEND_SERVICE_KEY")),
            documents_bucket: std::env::var("BACKEND_DOCUMENTS_BUCKET")
                .unwrap_or_else(|_| DEFAULT_DOCUMENTS_BUCKET.to_string()),
            timeout_secs: std::env::var("BACKEND_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),
            read_retries: std::env::var("BACKEND_READ_RETRIES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_READ_RETRIES),
        }
    }

    /// Configuration pointing at a local mock server (for testing).
    pub fn local_mock(base_url: &str, service_key: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            service_key: Zeroizing::new(service_key.to_string()),
            documents_bucket: DEFAULT_DOCUMENTS_BUCKET.to_string(),
            timeout_secs: 5,
            read_retries: DEFAULT_READ_RETRIES,
        }
    }

    /// Whether both connection parameters are non-empty.
    pub fn is_complete(&self) -> bool {
        !self.base_url.trim().is_empty() && !self.service_key.trim().is_empty()
    }
}

fn env_or_empty(var: &str) -> String {
    std::env::var(var).unwrap_or_else(|_| {
        tracing::warn!("{var} is not set; using an empty value");
        String::new()
    })
}
