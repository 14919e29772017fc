//! # Table API Plumbing
//!
//! Shared request building and row decoding for the backend's table API
//! (`{base}/rest/v1/{table}`). Filters use the `column=op.value` query
//! convention; writes ask for `return=representation` so the stored rows
//! come back and go through the same validation as reads.
//!
//! Every decoded row is checked twice before it leaves this module: serde
//! rejects missing fields and unknown enum values, then [`Validate`] runs
//! the record's business rules. The first failure aborts the whole call
//! with [`BackendError::MalformedRow`].

use std::fmt::Display;

use cadesk_core::Validate;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::header::HeaderValue;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::BackendError;
use crate::retry::Backoff;

/// Query string for a table request.
#[derive(Debug, Clone, Default)]
pub struct Query {
    params: Vec<(String, String)>,
}

impl Query {
    /// An empty query (selects every column).
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict returned columns.
    pub fn select(self, columns: &str) -> Self {
        self.param("select", columns.to_string())
    }

    /// `column = value`
    pub fn eq(self, column: &str, value: impl Display) -> Self {
        self.param(column, format!("eq.{value}"))
    }

    /// `column >= value`
    pub fn gte_time(self, column: &str, value: DateTime<Utc>) -> Self {
        self.param(column, format!("gte.{}", timestamp(value)))
    }

    /// `column <= value`
    pub fn lte_time(self, column: &str, value: DateTime<Utc>) -> Self {
        self.param(column, format!("lte.{}", timestamp(value)))
    }

    /// `column IN (values...)`
    pub fn in_list<T: Display>(self, column: &str, values: &[T]) -> Self {
        let joined = values
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");
        self.param(column, format!("in.({joined})"))
    }

    /// Sort by `column`.
    pub fn order(self, column: &str, ascending: bool) -> Self {
        let dir = if ascending { "asc" } else { "desc" };
        self.param("order", format!("{column}.{dir}"))
    }

    /// Cap the number of rows returned.
    pub fn limit(self, n: usize) -> Self {
        self.param("limit", n.to_string())
    }

    fn param(mut self, key: &str, value: String) -> Self {
        self.params.push((key.to_string(), value));
        self
    }

    pub(crate) fn pairs(&self) -> &[(String, String)] {
        &self.params
    }
}

/// Timestamps go on the wire with millisecond precision and a `Z` suffix.
pub(crate) fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Low-level table API client shared by the per-entity accessors.
#[derive(Debug, Clone)]
pub(crate) struct Rest {
    http: reqwest::Client,
    base_url: String,
    backoff: Backoff,
}

impl Rest {
    pub(crate) fn new(http: reqwest::Client, base_url: String, backoff: Backoff) -> Self {
        Self {
            http,
            base_url,
            backoff,
        }
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub(crate) fn backoff(&self) -> Backoff {
        self.backoff
    }

    /// `{base}/{path}` with exactly one slash between them.
    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    fn table_url(&self, table: &str) -> String {
        self.url(&format!("rest/v1/{table}"))
    }

    /// `GET /rest/v1/{table}?{query}`, retried on transport errors.
    async fn get(
        &self,
        endpoint: &str,
        table: &str,
        query: &Query,
    ) -> Result<reqwest::Response, BackendError> {
        let url = self.table_url(table);
        self.backoff
            .read(endpoint, || self.http.get(&url).query(query.pairs()).send())
            .await
            .map_err(|e| BackendError::Http {
                endpoint: endpoint.to_string(),
                source: e,
            })
    }

    /// Rows matching `query`, each decoded and validated.
    pub(crate) async fn select<T>(&self, table: &str, query: &Query) -> Result<Vec<T>, BackendError>
    where
        T: DeserializeOwned + Validate,
    {
        let endpoint = format!("GET /{table}");
        let resp = self.get(&endpoint, table, query).await?;
        decode_rows(&endpoint, resp).await
    }

    /// Like [`Rest::select`], but a row that does not decode is set aside
    /// instead of failing the call. Rows are decoded only; [`Validate`]
    /// checks are left to the caller.
    pub(crate) async fn select_lenient<T>(
        &self,
        table: &str,
        query: &Query,
    ) -> Result<PartialRows<T>, BackendError>
    where
        T: DeserializeOwned,
    {
        let endpoint = format!("GET /{table}");
        let resp = self.get(&endpoint, table, query).await?;
        let resp = check_status(&endpoint, resp).await?;
        let bytes = resp.bytes().await.map_err(|e| BackendError::Http {
            endpoint: endpoint.clone(),
            source: e,
        })?;
        parse_rows_lenient(&endpoint, &bytes)
    }

    /// First row matching `query`, or `None`.
    pub(crate) async fn select_one<T>(
        &self,
        table: &str,
        query: Query,
    ) -> Result<Option<T>, BackendError>
    where
        T: DeserializeOwned + Validate,
    {
        let rows = self.select(table, &query.limit(1)).await?;
        Ok(rows.into_iter().next())
    }

    /// `POST /rest/v1/{table}` returning the stored row.
    pub(crate) async fn insert<T, B>(&self, table: &str, body: &B) -> Result<T, BackendError>
    where
        T: DeserializeOwned + Validate,
        B: Serialize + ?Sized,
    {
        let endpoint = format!("POST /{table}");
        let resp = self
            .http
            .post(self.table_url(table))
            .header("Prefer", HeaderValue::from_static("return=representation"))
            .json(body)
            .send()
            .await
            .map_err(|e| BackendError::Http {
                endpoint: endpoint.clone(),
                source: e,
            })?;

        single_row(&endpoint, decode_rows(&endpoint, resp).await?)
    }

    /// `POST /rest/v1/{table}?on_conflict={column}` merging duplicates.
    pub(crate) async fn upsert<T, B>(
        &self,
        table: &str,
        on_conflict: &str,
        body: &B,
    ) -> Result<T, BackendError>
    where
        T: DeserializeOwned + Validate,
        B: Serialize + ?Sized,
    {
        let endpoint = format!("UPSERT /{table}");
        let resp = self
            .http
            .post(self.table_url(table))
            .query(&[("on_conflict", on_conflict)])
            .header(
                "Prefer",
                HeaderValue::from_static("resolution=merge-duplicates,return=representation"),
            )
            .json(body)
            .send()
            .await
            .map_err(|e| BackendError::Http {
                endpoint: endpoint.clone(),
                source: e,
            })?;

        single_row(&endpoint, decode_rows(&endpoint, resp).await?)
    }

    /// `PATCH /rest/v1/{table}?{query}` returning every updated row.
    ///
    /// Not retried: a write whose response was lost may already have landed.
    pub(crate) async fn update<T, B>(
        &self,
        table: &str,
        query: &Query,
        body: &B,
    ) -> Result<Vec<T>, BackendError>
    where
        T: DeserializeOwned + Validate,
        B: Serialize + ?Sized,
    {
        let endpoint = format!("PATCH /{table}");
        let resp = self
            .http
            .patch(self.table_url(table))
            .query(query.pairs())
            .header("Prefer", HeaderValue::from_static("return=representation"))
            .json(body)
            .send()
            .await
            .map_err(|e| BackendError::Http {
                endpoint: endpoint.clone(),
                source: e,
            })?;

        decode_rows(&endpoint, resp).await
    }

    /// `DELETE /rest/v1/{table}?{query}` returning the deleted rows.
    pub(crate) async fn delete<T>(&self, table: &str, query: &Query) -> Result<Vec<T>, BackendError>
    where
        T: DeserializeOwned + Validate,
    {
        let endpoint = format!("DELETE /{table}");
        let resp = self
            .http
            .delete(self.table_url(table))
            .query(query.pairs())
            .header("Prefer", HeaderValue::from_static("return=representation"))
            .send()
            .await
            .map_err(|e| BackendError::Http {
                endpoint: endpoint.clone(),
                source: e,
            })?;

        decode_rows(&endpoint, resp).await
    }
}

/// Map a non-2xx response to [`BackendError::Api`], passing success through.
pub(crate) async fn check_status(
    endpoint: &str,
    resp: reqwest::Response,
) -> Result<reqwest::Response, BackendError> {
    if resp.status().is_success() {
        return Ok(resp);
    }
    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap_or_default();
    Err(BackendError::Api {
        endpoint: endpoint.to_string(),
        status,
        body,
    })
}

/// Decode a JSON array of rows, validating each one.
pub(crate) async fn decode_rows<T>(
    endpoint: &str,
    resp: reqwest::Response,
) -> Result<Vec<T>, BackendError>
where
    T: DeserializeOwned + Validate,
{
    let resp = check_status(endpoint, resp).await?;
    let bytes = resp.bytes().await.map_err(|e| BackendError::Http {
        endpoint: endpoint.to_string(),
        source: e,
    })?;
    parse_rows(endpoint, &bytes)
}

/// Parse and validate rows from a raw response body.
pub(crate) fn parse_rows<T>(endpoint: &str, bytes: &[u8]) -> Result<Vec<T>, BackendError>
where
    T: DeserializeOwned + Validate,
{
    let raw: Vec<serde_json::Value> =
        serde_json::from_slice(bytes).map_err(|e| BackendError::Deserialization {
            endpoint: endpoint.to_string(),
            source: e,
        })?;

    raw.into_iter()
        .enumerate()
        .map(|(index, value)| {
            let row: T = serde_json::from_value(value).map_err(|e| BackendError::MalformedRow {
                endpoint: endpoint.to_string(),
                index,
                reason: e.to_string(),
            })?;
            row.validate().map_err(|e| BackendError::MalformedRow {
                endpoint: endpoint.to_string(),
                index,
                reason: e.to_string(),
            })?;
            Ok(row)
        })
        .collect()
}

/// A row from a lenient read that could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedRow {
    /// Position in the response array.
    pub index: usize,
    /// The row's `id` column, when it was a string.
    pub id: Option<String>,
    pub reason: String,
}

/// Result of a lenient read: the rows that decoded and the ones that did not.
#[derive(Debug, Clone, PartialEq)]
pub struct PartialRows<T> {
    pub rows: Vec<T>,
    pub rejected: Vec<RejectedRow>,
}

/// Parse rows from a raw response body, setting aside rows that fail to
/// decode. Only a body that is not a JSON array fails.
pub(crate) fn parse_rows_lenient<T>(
    endpoint: &str,
    bytes: &[u8],
) -> Result<PartialRows<T>, BackendError>
where
    T: DeserializeOwned,
{
    let raw: Vec<serde_json::Value> =
        serde_json::from_slice(bytes).map_err(|e| BackendError::Deserialization {
            endpoint: endpoint.to_string(),
            source: e,
        })?;

    let mut out = PartialRows {
        rows: Vec::with_capacity(raw.len()),
        rejected: Vec::new(),
    };
    for (index, value) in raw.into_iter().enumerate() {
        let id = value
            .get("id")
            .and_then(serde_json::Value::as_str)
            .map(str::to_owned);
        match serde_json::from_value(value) {
            Ok(row) => out.rows.push(row),
            Err(e) => {
                tracing::warn!(endpoint, index, id = ?id, error = %e, "skipping undecodable row");
                out.rejected.push(RejectedRow {
                    index,
                    id,
                    reason: e.to_string(),
                });
            }
        }
    }
    Ok(out)
}

fn single_row<T>(endpoint: &str, rows: Vec<T>) -> Result<T, BackendError> {
    let count = rows.len();
    rows.into_iter()
        .next()
        .ok_or_else(|| BackendError::MalformedRow {
            endpoint: endpoint.to_string(),
            index: count,
            reason: "write returned no rows".to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadesk_core::NotificationPreference;
    use chrono::TimeZone;

    #[test]
    fn query_builds_filter_pairs() {
        let at = Utc.with_ymd_and_hms(2026, 7, 1, 0, 0, 0).unwrap();
        let q = Query::new()
            .eq("status", "pending")
            .gte_time("due_date", at)
            .in_list("owner_id", &["a", "b"])
            .order("due_date", true);
        let pairs = q.pairs();
        assert_eq!(pairs[0], ("status".into(), "eq.pending".into()));
        assert_eq!(
            pairs[1],
            ("due_date".into(), "gte.2026-07-01T00:00:00.000Z".into())
        );
        assert_eq!(pairs[2], ("owner_id".into(), "in.(a,b)".into()));
        assert_eq!(pairs[3], ("order".into(), "due_date.asc".into()));
    }

    #[test]
    fn parse_rows_reports_index_of_bad_row() {
        let body = serde_json::json!([
            {"owner_id": "6ba7b810-9dad-11d1-80b4-00c04fd430c8",
             "email_notifications": true, "reminder_days_before": 7},
            {"owner_id": "6ba7b810-9dad-11d1-80b4-00c04fd430c8",
             "email_notifications": true}
        ]);
        let bytes = serde_json::to_vec(&body).unwrap();
        let err = parse_rows::<NotificationPreference>("GET /notification_preferences", &bytes)
            .unwrap_err();
        match err {
            BackendError::MalformedRow { index, reason, .. } => {
                assert_eq!(index, 1);
                assert!(reason.contains("reminder_days_before"));
            }
            other => panic!("expected MalformedRow, got {other:?}"),
        }
    }

    #[test]
    fn parse_rows_runs_validation() {
        let body = serde_json::json!([
            {"owner_id": "6ba7b810-9dad-11d1-80b4-00c04fd430c8",
             "email_notifications": true, "reminder_days_before": 900}
        ]);
        let bytes = serde_json::to_vec(&body).unwrap();
        let err = parse_rows::<NotificationPreference>("GET /notification_preferences", &bytes)
            .unwrap_err();
        assert!(matches!(err, BackendError::MalformedRow { index: 0, .. }));
    }

    #[test]
    fn parse_rows_rejects_non_array() {
        let err = parse_rows::<NotificationPreference>("GET /x", br#"{"message":"oops"}"#)
            .unwrap_err();
        assert!(matches!(err, BackendError::Deserialization { .. }));
    }

    fn deadline_json(id: &str, title: &str, status: &str) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "title": title,
            "category": "GST",
            "due_date": "2026-07-20T00:00:00Z",
            "priority": "high",
            "status": status,
            "notification_sent": false,
            "owner_id": "6ba7b810-9dad-11d1-80b4-00c04fd430c8",
            "created_at": "2026-06-02T00:00:00Z",
            "updated_at": "2026-06-01T00:00:00Z"
        })
    }

    #[test]
    fn lenient_parse_sets_aside_undecodable_rows() {
        let good = "11111111-1111-4111-8111-111111111111";
        let bad = "22222222-2222-4222-8222-222222222222";
        let body = serde_json::json!([
            deadline_json(good, "GSTR-1", "pending"),
            deadline_json(bad, "GSTR-3B", "archived"),
        ]);
        let bytes = serde_json::to_vec(&body).unwrap();

        let parsed = parse_rows_lenient::<cadesk_core::ComplianceDeadline>(
            "GET /compliance_deadlines",
            &bytes,
        )
        .unwrap();
        assert_eq!(parsed.rows.len(), 1);
        assert_eq!(parsed.rows[0].id.to_string(), good);
        assert_eq!(parsed.rejected.len(), 1);
        assert_eq!(parsed.rejected[0].index, 1);
        assert_eq!(parsed.rejected[0].id.as_deref(), Some(bad));
    }

    #[test]
    fn lenient_parse_skips_validation() {
        // Timestamps out of order and an over-long title still decode.
        let body = serde_json::json!([deadline_json(
            "11111111-1111-4111-8111-111111111111",
            &"x".repeat(201),
            "pending"
        )]);
        let bytes = serde_json::to_vec(&body).unwrap();

        let parsed = parse_rows_lenient::<cadesk_core::ComplianceDeadline>("GET /d", &bytes)
            .unwrap();
        assert_eq!(parsed.rows.len(), 1);
        assert!(parsed.rejected.is_empty());
    }

    #[test]
    fn lenient_parse_still_rejects_non_array() {
        let err = parse_rows_lenient::<NotificationPreference>("GET /x", br#"{"message":"oops"}"#)
            .unwrap_err();
        assert!(matches!(err, BackendError::Deserialization { .. }));
    }

    #[test]
    fn url_joins_without_double_slash() {
        let rest = Rest::new(reqwest::Client::new(), "http://host:1/".into(), Backoff::default());
        assert_eq!(rest.url("rest/v1/tasks"), "http://host:1/rest/v1/tasks");
    }
}
