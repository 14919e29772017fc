//! Error types for the reminder sweep and its stores.

use cadesk_backend::BackendError;
use thiserror::Error;

/// A deadline store could not complete a read or a claim.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The hosted backend rejected or failed the call.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// A direct database query failed.
    #[error("database error: {0}")]
    Database(String),
}

/// A sweep invocation failed as a whole.
///
/// Only selection can fail a sweep. Per-row claim failures are recorded in
/// the report instead.
#[derive(Error, Debug)]
pub enum SweepError {
    #[error("failed to select due deadlines: {0}")]
    Selection(#[source] StoreError),
}

/// A reminder could not be dispatched.
#[derive(Error, Debug)]
#[error("reminder dispatch failed: {0}")]
pub struct NotifyError(pub String);
