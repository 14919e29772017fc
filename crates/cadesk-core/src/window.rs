//! # Notification Horizon
//!
//! The reminder sweep looks a fixed number of days ahead of the moment it
//! runs. [`ReminderWindow`] captures that look-ahead as a closed interval
//! `[start, end]`: both bounds are inclusive.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Length of the look-ahead used to select deadlines for reminding.
pub const NOTIFICATION_HORIZON_DAYS: i64 = 7;

/// A closed time interval `[start, end]` used to select due deadlines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ReminderWindow {
    /// Inclusive lower bound, normally the sweep's invocation time.
    pub start: DateTime<Utc>,
    /// Inclusive upper bound.
    pub end: DateTime<Utc>,
}

impl ReminderWindow {
    /// The standard window: `[now, now + NOTIFICATION_HORIZON_DAYS]`.
    pub fn starting_at(now: DateTime<Utc>) -> Self {
        Self::with_days(now, NOTIFICATION_HORIZON_DAYS)
    }

    /// A window of `days` days starting at `now`. Negative values collapse
    /// to an empty-length window at `now`.
    pub fn with_days(now: DateTime<Utc>, days: i64) -> Self {
        Self {
            start: now,
            end: now + Duration::days(days.max(0)),
        }
    }

    /// Whether `at` falls inside the window, bounds included.
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.start && at <= self.end
    }

    /// A window with the same start and an end no later than this one's,
    /// covering at most `days` days.
    pub fn narrowed_to_days(&self, days: i64) -> Self {
        let candidate = Self::with_days(self.start, days);
        Self {
            start: self.start,
            end: candidate.end.min(self.end),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap()
    }

    #[test]
    fn upper_bound_is_inclusive() {
        let window = ReminderWindow::starting_at(now());
        assert!(window.contains(now() + Duration::days(7)));
        assert!(!window.contains(now() + Duration::days(7) + Duration::milliseconds(1)));
    }

    #[test]
    fn lower_bound_is_inclusive() {
        let window = ReminderWindow::starting_at(now());
        assert!(window.contains(now()));
        assert!(!window.contains(now() - Duration::milliseconds(1)));
    }

    #[test]
    fn narrowing_never_widens() {
        let window = ReminderWindow::starting_at(now());
        assert_eq!(window.narrowed_to_days(3).end, now() + Duration::days(3));
        assert_eq!(window.narrowed_to_days(30).end, window.end);
        assert_eq!(window.narrowed_to_days(-2).end, now());
    }

    proptest! {
        #[test]
        fn contains_matches_offset(offset_ms in -1_000_000_000i64..1_000_000_000i64) {
            let window = ReminderWindow::starting_at(now());
            let at = now() + Duration::milliseconds(offset_ms);
            let horizon_ms = NOTIFICATION_HORIZON_DAYS * 24 * 60 * 60 * 1000;
            prop_assert_eq!(window.contains(at), (0..=horizon_ms).contains(&offset_ms));
        }
    }
}
