//! # Record Validation
//!
//! The [`Validate`] trait and the field helpers shared by every record.

use crate::error::ValidationError;

/// Business-rule checks beyond what serde decoding enforces.
pub trait Validate {
    /// Check the record. Returns the first violated rule.
    fn validate(&self) -> Result<(), ValidationError>;
}

/// Reject empty or whitespace-only text, and text longer than `max` characters.
pub fn require_text(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyField { field });
    }
    if value.chars().count() > max {
        return Err(ValidationError::TooLong { field, max });
    }
    Ok(())
}

/// Like [`require_text`], but `None` is accepted.
pub fn optional_text(
    field: &'static str,
    value: Option<&str>,
    max: usize,
) -> Result<(), ValidationError> {
    match value {
        Some(v) => require_text(field, v, max),
        None => Ok(()),
    }
}

/// Reject integers outside `[min, max]`.
pub fn require_range(
    field: &'static str,
    value: i64,
    min: i64,
    max: i64,
) -> Result<(), ValidationError> {
    if value < min || value > max {
        return Err(ValidationError::OutOfRange {
            field,
            min,
            max,
            actual: value,
        });
    }
    Ok(())
}

/// Minimal structural check for an email address: one `@` with text on both
/// sides and a dot in the domain.
pub fn require_email(field: &'static str, value: &str) -> Result<(), ValidationError> {
    require_text(field, value, 320)?;
    let malformed = || ValidationError::Malformed {
        field,
        reason: format!("'{value}' is not an email address"),
    };
    let (local, domain) = value.split_once('@').ok_or_else(malformed)?;
    if local.is_empty() || domain.contains('@') || !domain.contains('.') || domain.ends_with('.') {
        return Err(malformed());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_rules() {
        assert!(require_text("title", "GST return filing", 10).is_err());
        assert!(require_text("title", "GSTR-3B", 10).is_ok());
        assert_eq!(
            require_text("title", "   ", 10),
            Err(ValidationError::EmptyField { field: "title" })
        );
        assert!(optional_text("description", None, 5).is_ok());
    }

    #[test]
    fn range_rule_is_inclusive() {
        assert!(require_range("days", 0, 0, 365).is_ok());
        assert!(require_range("days", 365, 0, 365).is_ok());
        assert!(require_range("days", 366, 0, 365).is_err());
        assert!(require_range("days", -1, 0, 365).is_err());
    }

    #[test]
    fn email_rule() {
        assert!(require_email("email", "ca@firm.in").is_ok());
        assert!(require_email("email", "ca@firm").is_err());
        assert!(require_email("email", "@firm.in").is_err());
        assert!(require_email("email", "ca@@firm.in").is_err());
        assert!(require_email("email", "no-at-sign").is_err());
    }
}
