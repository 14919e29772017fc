//! # Compliance Deadlines
//!
//! A compliance deadline is an obligation with a due date (a GST return, an
//! ROC filing, a TDS deposit) plus the flag the reminder sweep uses to
//! remember that its owner has already been reminded.
//!
//! ## Reminder State Machine
//!
//! ```text
//! NotDue ──(enters window)──▶ DueSoonUnnotified ──(sweep claims)──▶ Notified
//! ```
//!
//! `Notified` is terminal for the sweep: `notification_sent` is never reset
//! automatically.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::ids::{DeadlineId, UserId};
use crate::validate::{optional_text, require_text, Validate};
use crate::window::ReminderWindow;

const MAX_TITLE: usize = 200;
const MAX_DESCRIPTION: usize = 4000;
const MAX_CATEGORY: usize = 100;

/// Priority of a deadline or task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    /// Wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Priority {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(ValidationError::Malformed {
                field: "priority",
                reason: format!("unknown priority '{other}'"),
            }),
        }
    }
}

/// Workflow status of a deadline. Only `Pending` deadlines are reminded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum DeadlineStatus {
    Pending,
    InProgress,
    Completed,
    Overdue,
}

impl DeadlineStatus {
    /// Wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Overdue => "overdue",
        }
    }
}

impl std::fmt::Display for DeadlineStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DeadlineStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "overdue" => Ok(Self::Overdue),
            other => Err(ValidationError::Malformed {
                field: "status",
                reason: format!("unknown deadline status '{other}'"),
            }),
        }
    }
}

/// Where a deadline stands with respect to a particular reminder window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderState {
    /// Outside the window, or not pending. The sweep ignores it.
    NotDue,
    /// Pending, inside the window, and not yet reminded.
    DueSoonUnnotified,
    /// Already reminded. Terminal for the sweep.
    Notified,
}

/// A compliance deadline as stored in the `compliance_deadlines` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ComplianceDeadline {
    pub id: DeadlineId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub category: String,
    pub due_date: DateTime<Utc>,
    pub priority: Priority,
    pub status: DeadlineStatus,
    pub notification_sent: bool,
    pub owner_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ComplianceDeadline {
    /// Classify this deadline against `window`.
    pub fn reminder_state(&self, window: &ReminderWindow) -> ReminderState {
        if self.notification_sent {
            ReminderState::Notified
        } else if self.status == DeadlineStatus::Pending && window.contains(self.due_date) {
            ReminderState::DueSoonUnnotified
        } else {
            ReminderState::NotDue
        }
    }

    /// The sweep's selection predicate: pending, not yet notified, and due
    /// within `window`.
    pub fn is_due_for_reminder(&self, window: &ReminderWindow) -> bool {
        self.reminder_state(window) == ReminderState::DueSoonUnnotified
    }
}

impl Validate for ComplianceDeadline {
    fn validate(&self) -> Result<(), ValidationError> {
        require_text("title", &self.title, MAX_TITLE)?;
        optional_text("description", self.description.as_deref(), MAX_DESCRIPTION)?;
        require_text("category", &self.category, MAX_CATEGORY)?;
        if self.updated_at < self.created_at {
            return Err(ValidationError::TimestampOrder {
                earlier: "created_at",
                later: "updated_at",
            });
        }
        Ok(())
    }
}

/// Fields accepted when creating a deadline. The owner comes from the
/// session, never from the request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct NewDeadline {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub category: String,
    pub due_date: DateTime<Utc>,
    #[serde(default = "default_priority")]
    pub priority: Priority,
}

fn default_priority() -> Priority {
    Priority::Medium
}

impl Validate for NewDeadline {
    fn validate(&self) -> Result<(), ValidationError> {
        require_text("title", &self.title, MAX_TITLE)?;
        optional_text("description", self.description.as_deref(), MAX_DESCRIPTION)?;
        require_text("category", &self.category, MAX_CATEGORY)
    }
}

/// Partial update of a deadline. Absent fields are left untouched.
///
/// `description` distinguishes absent (`None`, unchanged) from `null`
/// (`Some(None)`, cleared). `notification_sent` is deliberately absent: only
/// the sweep sets it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct DeadlinePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present_or_null"
    )]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>))]
    pub description: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<DeadlineStatus>,
}

impl DeadlinePatch {
    /// Whether the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.due_date.is_none()
            && self.priority.is_none()
            && self.status.is_none()
    }
}

impl Validate for DeadlinePatch {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.is_empty() {
            return Err(ValidationError::Malformed {
                field: "body",
                reason: "at least one field must be provided".to_string(),
            });
        }
        optional_text("title", self.title.as_deref(), MAX_TITLE)?;
        optional_text(
            "description",
            self.description.as_ref().and_then(Option::as_deref),
            MAX_DESCRIPTION,
        )
    }
}

/// A field that is present, even as `null`, becomes `Some`. Paired with
/// `#[serde(default)]` so an absent field stays `None`.
fn present_or_null<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 7, 1, 0, 0, 0).unwrap()
    }

    fn deadline(due_in: Duration) -> ComplianceDeadline {
        ComplianceDeadline {
            id: DeadlineId::new(),
            title: "GSTR-3B for June".into(),
            description: None,
            category: "gst".into(),
            due_date: now() + due_in,
            priority: Priority::High,
            status: DeadlineStatus::Pending,
            notification_sent: false,
            owner_id: UserId::new(),
            created_at: now() - Duration::days(30),
            updated_at: now() - Duration::days(30),
        }
    }

    #[test]
    fn pending_unnotified_in_window_is_due() {
        let window = ReminderWindow::starting_at(now());
        let d = deadline(Duration::days(5));
        assert_eq!(d.reminder_state(&window), ReminderState::DueSoonUnnotified);
        assert!(d.is_due_for_reminder(&window));
    }

    #[test]
    fn notified_is_terminal_regardless_of_window() {
        let window = ReminderWindow::starting_at(now());
        let mut d = deadline(Duration::days(1));
        d.notification_sent = true;
        assert_eq!(d.reminder_state(&window), ReminderState::Notified);
        d.due_date = now() + Duration::days(40);
        assert_eq!(d.reminder_state(&window), ReminderState::Notified);
    }

    #[test]
    fn non_pending_statuses_are_never_due() {
        let window = ReminderWindow::starting_at(now());
        for status in [
            DeadlineStatus::InProgress,
            DeadlineStatus::Completed,
            DeadlineStatus::Overdue,
        ] {
            let mut d = deadline(Duration::days(2));
            d.status = status;
            assert!(!d.is_due_for_reminder(&window), "{status} must not be reminded");
        }
    }

    #[test]
    fn past_and_far_future_are_not_due() {
        let window = ReminderWindow::starting_at(now());
        assert!(!deadline(-Duration::hours(1)).is_due_for_reminder(&window));
        assert!(!deadline(Duration::days(10)).is_due_for_reminder(&window));
    }

    #[test]
    fn decodes_backend_row() {
        let row = serde_json::json!({
            "id": "550e8400-e29b-41d4-a716-446655440000",
            "title": "TDS deposit",
            "description": null,
            "category": "tds",
            "due_date": "2026-07-07T00:00:00Z",
            "priority": "medium",
            "status": "pending",
            "notification_sent": false,
            "owner_id": "6ba7b810-9dad-11d1-80b4-00c04fd430c8",
            "created_at": "2026-06-01T00:00:00Z",
            "updated_at": "2026-06-01T00:00:00Z"
        });
        let d: ComplianceDeadline = serde_json::from_value(row).unwrap();
        assert_eq!(d.priority, Priority::Medium);
        assert!(d.validate().is_ok());
    }

    #[test]
    fn unknown_status_is_rejected_on_decode() {
        let row = serde_json::json!({
            "id": "550e8400-e29b-41d4-a716-446655440000",
            "title": "TDS deposit",
            "category": "tds",
            "due_date": "2026-07-07T00:00:00Z",
            "priority": "medium",
            "status": "archived",
            "notification_sent": false,
            "owner_id": "6ba7b810-9dad-11d1-80b4-00c04fd430c8",
            "created_at": "2026-06-01T00:00:00Z",
            "updated_at": "2026-06-01T00:00:00Z"
        });
        assert!(serde_json::from_value::<ComplianceDeadline>(row).is_err());
    }

    #[test]
    fn validation_rejects_reversed_timestamps() {
        let mut d = deadline(Duration::days(1));
        d.updated_at = d.created_at - Duration::seconds(1);
        assert!(matches!(
            d.validate(),
            Err(ValidationError::TimestampOrder { .. })
        ));
    }

    #[test]
    fn empty_patch_is_rejected() {
        assert!(DeadlinePatch::default().validate().is_err());
        let patch = DeadlinePatch {
            status: Some(DeadlineStatus::Completed),
            ..Default::default()
        };
        assert!(patch.validate().is_ok());
    }

    #[test]
    fn patch_tells_absent_description_from_null() {
        let absent: DeadlinePatch = serde_json::from_str(r#"{"title":"GSTR-1"}"#).unwrap();
        assert_eq!(absent.description, None);
        assert!(serde_json::to_value(&absent).unwrap().get("description").is_none());

        let cleared: DeadlinePatch = serde_json::from_str(r#"{"description":null}"#).unwrap();
        assert_eq!(cleared.description, Some(None));
        assert!(cleared.validate().is_ok());
        assert_eq!(
            serde_json::to_value(&cleared).unwrap(),
            serde_json::json!({"description": null})
        );

        let set: DeadlinePatch = serde_json::from_str(r#"{"description":"Q2 filing"}"#).unwrap();
        assert_eq!(set.description, Some(Some("Q2 filing".to_string())));
    }

    #[test]
    fn status_round_trips_through_str() {
        for s in ["pending", "in_progress", "completed", "overdue"] {
            let parsed: DeadlineStatus = s.parse().unwrap();
            assert_eq!(parsed.as_str(), s);
        }
        assert!("archived".parse::<DeadlineStatus>().is_err());
    }
}
