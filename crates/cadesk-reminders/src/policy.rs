//! How owner notification preferences affect a sweep.

use cadesk_core::ReminderWindow;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::DueDeadline;

/// Whether a sweep acts on the preferences attached to each selected row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreferencePolicy {
    /// Preferences are logged and otherwise ignored. Every selected row is
    /// claimed and a reminder dispatched.
    #[default]
    Ignore,
    /// Each owner's window shrinks to `min(reminder_days_before, 7)` days,
    /// and owners with email turned off get their rows marked without a
    /// reminder being sent.
    Honor,
}

impl PreferencePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ignore => "ignore",
            Self::Honor => "honor",
        }
    }

    /// Decide what a sweep running at `now` does with `due`.
    pub fn plan(&self, due: &DueDeadline, now: DateTime<Utc>) -> PlannedAction {
        let Self::Honor = self else {
            return PlannedAction::Notify;
        };
        let Some(pref) = due.preference.as_ref() else {
            return PlannedAction::Notify;
        };

        let owner_window =
            ReminderWindow::starting_at(now).narrowed_to_days(i64::from(pref.reminder_days_before));
        if !owner_window.contains(due.deadline.due_date) {
            PlannedAction::Defer
        } else if !pref.email_notifications {
            PlannedAction::MarkOnly
        } else {
            PlannedAction::Notify
        }
    }
}

impl std::fmt::Display for PreferencePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PreferencePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ignore" => Ok(Self::Ignore),
            "honor" | "honour" => Ok(Self::Honor),
            other => Err(format!(
                "unknown preference policy '{other}' (expected 'ignore' or 'honor')"
            )),
        }
    }
}

/// What the sweep will do with one selected row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlannedAction {
    /// Claim the row and dispatch a reminder.
    Notify,
    /// Claim the row without dispatching (email disabled).
    MarkOnly,
    /// Leave the row for a later sweep (outside the owner's window).
    Defer,
}
