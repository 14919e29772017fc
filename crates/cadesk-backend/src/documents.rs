//! # Documents
//!
//! An uploaded document lives in two places: the object itself in the
//! storage bucket, and a metadata row in the `documents` table. Uploads
//! write the object first and the row second; if the row insert fails the
//! object is removed again on a best-effort basis. Deletes remove the row
//! first, so a failed object delete leaves an orphaned object rather than
//! a row pointing at nothing.

use cadesk_core::document::MAX_DOCUMENT_BYTES;
use cadesk_core::{ClientId, Document, DocumentId, NewDocument, UserId, Validate, ValidationError};
use serde::Serialize;
use url::Url;

use crate::error::BackendError;
use crate::rest::{check_status, Query, Rest};

const TABLE: &str = "documents";

#[derive(Debug, Serialize)]
struct InsertDocument<'a> {
    id: DocumentId,
    owner_id: UserId,
    #[serde(skip_serializing_if = "Option::is_none")]
    client_id: Option<ClientId>,
    name: &'a str,
    storage_path: &'a str,
    mime_type: &'a str,
    size_bytes: i64,
    category: &'a str,
}

/// Client for document metadata and stored objects.
#[derive(Debug, Clone)]
pub struct DocumentClient {
    rest: Rest,
    bucket: String,
}

impl DocumentClient {
    pub(crate) fn new(rest: Rest, bucket: String) -> Self {
        Self { rest, bucket }
    }

    /// Documents uploaded by `owner`, newest first.
    pub async fn list_for_owner(&self, owner: UserId) -> Result<Vec<Document>, BackendError> {
        let query = Query::new()
            .eq("owner_id", owner)
            .order("uploaded_at", false);
        self.rest.select(TABLE, &query).await
    }

    /// Store `bytes` and record the document for `owner`.
    pub async fn upload(
        &self,
        owner: UserId,
        meta: &NewDocument,
        mime_type: &str,
        bytes: Vec<u8>,
    ) -> Result<Document, BackendError> {
        meta.validate()?;
        let size_bytes = i64::try_from(bytes.len()).unwrap_or(i64::MAX);
        if size_bytes > MAX_DOCUMENT_BYTES {
            return Err(ValidationError::OutOfRange {
                field: "size_bytes",
                min: 0,
                max: MAX_DOCUMENT_BYTES,
                actual: size_bytes,
            }
            .into());
        }

        let id = DocumentId::new();
        let path = meta.storage_path(owner, id);
        self.put_object(&path, mime_type, bytes).await?;

        let row = InsertDocument {
            id,
            owner_id: owner,
            client_id: meta.client_id,
            name: &meta.name,
            storage_path: &path,
            mime_type,
            size_bytes,
            category: &meta.category,
        };
        match self.rest.insert(TABLE, &row).await {
            Ok(doc) => {
                tracing::info!(document_id = %id, %owner, size_bytes, "document uploaded");
                Ok(doc)
            }
            Err(e) => {
                if let Err(cleanup) = self.remove_object(&path).await {
                    tracing::warn!(%path, error = %cleanup, "failed to remove orphaned object");
                }
                Err(e)
            }
        }
    }

    /// Delete a document owned by `owner`. `None` if there was no such row.
    pub async fn delete(
        &self,
        id: DocumentId,
        owner: UserId,
    ) -> Result<Option<Document>, BackendError> {
        let query = Query::new().eq("id", id).eq("owner_id", owner);
        let removed: Vec<Document> = self.rest.delete(TABLE, &query).await?;
        let Some(doc) = removed.into_iter().next() else {
            return Ok(None);
        };
        if let Err(e) = self.remove_object(&doc.storage_path).await {
            tracing::warn!(document_id = %id, error = %e, "document row deleted but object remains");
        }
        Ok(Some(doc))
    }

    /// `{base}/storage/v1/object/{bucket}/{path...}` with each segment
    /// percent-encoded.
    fn object_url(&self, path: &str) -> Result<Url, BackendError> {
        let mut url = Url::parse(&self.rest.url("storage/v1/object"))
            .map_err(|e| BackendError::Config(format!("invalid storage URL: {e}")))?;
        url.path_segments_mut()
            .map_err(|()| BackendError::Config("backend URL cannot be a base".into()))?
            .push(&self.bucket)
            .extend(path.split('/'));
        Ok(url)
    }

    async fn put_object(
        &self,
        path: &str,
        mime_type: &str,
        bytes: Vec<u8>,
    ) -> Result<(), BackendError> {
        let endpoint = "POST /storage/object";
        let resp = self
            .rest
            .http()
            .post(self.object_url(path)?)
            .header(reqwest::header::CONTENT_TYPE, mime_type)
            .body(bytes)
            .send()
            .await
            .map_err(|e| BackendError::Http {
                endpoint: endpoint.into(),
                source: e,
            })?;
        check_status(endpoint, resp).await.map(|_| ())
    }

    async fn remove_object(&self, path: &str) -> Result<(), BackendError> {
        let endpoint = "DELETE /storage/object";
        let resp = self
            .rest
            .http()
            .delete(self.object_url(path)?)
            .send()
            .await
            .map_err(|e| BackendError::Http {
                endpoint: endpoint.into(),
                source: e,
            })?;
        check_status(endpoint, resp).await.map(|_| ())
    }
}
