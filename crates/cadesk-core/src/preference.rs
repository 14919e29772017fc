//! Per-user notification preferences (`notification_preferences` table).

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::ids::UserId;
use crate::validate::{require_range, Validate};

/// Largest accepted `reminder_days_before`.
pub const MAX_REMINDER_DAYS: i32 = 365;

/// How and when a user wants to be reminded about their deadlines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct NotificationPreference {
    pub owner_id: UserId,
    pub email_notifications: bool,
    #[serde(default)]
    pub push_notifications: bool,
    pub reminder_days_before: i32,
}

impl NotificationPreference {
    /// Preferences assumed for users who never saved any.
    pub fn defaults_for(owner_id: UserId) -> Self {
        Self {
            owner_id,
            email_notifications: true,
            push_notifications: false,
            reminder_days_before: 7,
        }
    }
}

impl Validate for NotificationPreference {
    fn validate(&self) -> Result<(), ValidationError> {
        require_range(
            "reminder_days_before",
            i64::from(self.reminder_days_before),
            0,
            i64::from(MAX_REMINDER_DAYS),
        )
    }
}
