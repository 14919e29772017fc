//! # cadesk-cli: operator commands
//!
//! - `cadesk sweep`: run one reminder sweep against the hosted backend and
//!   print the report as JSON. `--dry-run` prints what would happen without
//!   claiming anything.
//! - `cadesk window`: print the reminder window for a given instant.
//!
//! Backend settings come from the same `BACKEND_*` variables the HTTP
//! service reads.

pub mod sweep;
pub mod window;

use chrono::{DateTime, Utc};

/// Parse an RFC 3339 timestamp given on the command line.
pub fn parse_instant(raw: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| format!("expected an RFC 3339 timestamp: {e}"))
}
