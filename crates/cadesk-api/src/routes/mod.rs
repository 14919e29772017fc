//! # Route Modules
//!
//! - `reminders`: the sweep invocation endpoint (no session).
//! - `session`, `deadlines`, `tasks`, `documents`, `clients`,
//!   `preferences`: `/v1/*` JSON routes behind the session middleware.
//! - `ops`: health probes and `/metrics` (no session).

pub mod clients;
pub mod deadlines;
pub mod documents;
pub mod ops;
pub mod preferences;
pub mod reminders;
pub mod session;
pub mod tasks;
