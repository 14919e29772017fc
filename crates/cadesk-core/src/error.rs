//! # Validation Errors
//!
//! Raised when a record violates a field-level rule, either while decoding a
//! backend row or while checking an incoming request body.

use thiserror::Error;

/// A record failed validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required text field is empty or whitespace.
    #[error("{field} must not be empty")]
    EmptyField {
        /// Field name as it appears on the wire.
        field: &'static str,
    },

    /// A text field exceeds its maximum length.
    #[error("{field} must not exceed {max} characters")]
    TooLong {
        /// Field name as it appears on the wire.
        field: &'static str,
        /// Maximum permitted length.
        max: usize,
    },

    /// A numeric field is outside its permitted range.
    #[error("{field} must be between {min} and {max}, got {actual}")]
    OutOfRange {
        /// Field name as it appears on the wire.
        field: &'static str,
        /// Inclusive lower bound.
        min: i64,
        /// Inclusive upper bound.
        max: i64,
        /// The rejected value.
        actual: i64,
    },

    /// A field has a value that is malformed for its type.
    #[error("invalid {field}: {reason}")]
    Malformed {
        /// Field name as it appears on the wire.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// Two timestamps on the same record are out of order.
    #[error("{later} must not precede {earlier}")]
    TimestampOrder {
        /// Field expected to be earlier.
        earlier: &'static str,
        /// Field expected to be later.
        later: &'static str,
    },
}
