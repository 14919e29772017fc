//! Backend client error types.

/// Errors from backend calls.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// HTTP transport error (including an unusable base URL).
    #[error("HTTP error calling {endpoint}: {source}")]
    Http {
        endpoint: String,
        source: reqwest::Error,
    },
    /// Backend returned a non-2xx status.
    #[error("backend {endpoint} returned {status}: {body}")]
    Api {
        endpoint: String,
        status: u16,
        body: String,
    },
    /// Response body was not the expected JSON shape.
    #[error("failed to deserialize response from {endpoint}: {source}")]
    Deserialization {
        endpoint: String,
        source: serde_json::Error,
    },
    /// A row decoded but is missing fields, has unknown enum values, or
    /// fails validation.
    #[error("malformed row {index} from {endpoint}: {reason}")]
    MalformedRow {
        endpoint: String,
        index: usize,
        reason: String,
    },
    /// A request was rejected before it was sent.
    #[error("invalid request: {0}")]
    Invalid(#[from] cadesk_core::ValidationError),
    /// Client could not be constructed from its configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

impl BackendError {
    /// HTTP status returned by the backend, if the call got that far.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}
