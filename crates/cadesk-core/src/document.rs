//! Uploaded documents: metadata rows pointing at objects in backend storage.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::ids::{ClientId, DocumentId, UserId};
use crate::validate::{require_range, require_text, Validate};

/// Largest accepted upload, in bytes.
pub const MAX_DOCUMENT_BYTES: i64 = 25 * 1024 * 1024;

/// A row of the `documents` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Document {
    pub id: DocumentId,
    pub owner_id: UserId,
    #[serde(default)]
    pub client_id: Option<ClientId>,
    pub name: String,
    /// Object key inside the documents bucket.
    pub storage_path: String,
    pub mime_type: String,
    pub size_bytes: i64,
    pub category: String,
    pub uploaded_at: DateTime<Utc>,
}

impl Validate for Document {
    fn validate(&self) -> Result<(), ValidationError> {
        require_text("name", &self.name, 255)?;
        require_text("storage_path", &self.storage_path, 1024)?;
        require_text("mime_type", &self.mime_type, 255)?;
        require_text("category", &self.category, 100)?;
        require_range("size_bytes", self.size_bytes, 0, MAX_DOCUMENT_BYTES)
    }
}

/// Metadata supplied alongside an upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct NewDocument {
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub client_id: Option<ClientId>,
}

impl NewDocument {
    /// Object key for an upload: `{owner}/{document}/{sanitized name}`.
    ///
    /// Path separators and control characters in the name are replaced so a
    /// caller cannot address another owner's prefix.
    pub fn storage_path(&self, owner: UserId, id: DocumentId) -> String {
        let safe: String = self
            .name
            .chars()
            .map(|c| {
                if c == '/' || c == '\\' || c.is_control() {
                    '_'
                } else {
                    c
                }
            })
            .collect();
        format!("{owner}/{id}/{safe}")
    }
}

impl Validate for NewDocument {
    fn validate(&self) -> Result<(), ValidationError> {
        require_text("name", &self.name, 255)?;
        if self.name.trim() == "." || self.name.trim() == ".." {
            return Err(ValidationError::Malformed {
                field: "name",
                reason: "must be a file name".to_string(),
            });
        }
        require_text("category", &self.category, 100)
    }
}
