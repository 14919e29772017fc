//! `cadesk window`: show the `[start, end]` range a sweep would select.

use anyhow::{bail, Result};
use cadesk_core::{ReminderWindow, NOTIFICATION_HORIZON_DAYS};
use chrono::{DateTime, Utc};
use clap::Args;

#[derive(Args, Debug)]
pub struct WindowArgs {
    /// Instant the window starts at (RFC 3339). Defaults to now.
    #[arg(long, value_parser = crate::parse_instant)]
    pub at: Option<DateTime<Utc>>,

    /// Narrow the window to this many days, as an owner preference would.
    #[arg(long)]
    pub days: Option<i64>,
}

/// Compute the window described by `args`.
pub fn window_for(args: &WindowArgs) -> Result<ReminderWindow> {
    let now = args.at.unwrap_or_else(Utc::now);
    let full = ReminderWindow::starting_at(now);
    match args.days {
        None => Ok(full),
        Some(days) if days < 0 => bail!("--days must not be negative, got {days}"),
        Some(days) => Ok(full.narrowed_to_days(days)),
    }
}

/// Print the window as JSON. Always exits 0 on success.
pub fn run_window(args: &WindowArgs) -> Result<u8> {
    let window = window_for(args)?;
    if args.days.is_some_and(|d| d > NOTIFICATION_HORIZON_DAYS) {
        tracing::warn!(
            "--days is capped at the {NOTIFICATION_HORIZON_DAYS}-day notification horizon"
        );
    }
    println!("{}", serde_json::to_string_pretty(&window)?);
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 7, 15, 6, 30, 0).unwrap()
    }

    #[test]
    fn default_window_spans_horizon() {
        let w = window_for(&WindowArgs {
            at: Some(at()),
            days: None,
        })
        .unwrap();
        assert_eq!(w.start, at());
        assert_eq!(w.end, at() + Duration::days(NOTIFICATION_HORIZON_DAYS));
    }

    #[test]
    fn days_narrow_but_never_widen() {
        let narrow = window_for(&WindowArgs {
            at: Some(at()),
            days: Some(3),
        })
        .unwrap();
        assert_eq!(narrow.end, at() + Duration::days(3));

        let capped = window_for(&WindowArgs {
            at: Some(at()),
            days: Some(30),
        })
        .unwrap();
        assert_eq!(capped.end, at() + Duration::days(NOTIFICATION_HORIZON_DAYS));
    }

    #[test]
    fn negative_days_are_rejected() {
        assert!(window_for(&WindowArgs {
            at: Some(at()),
            days: Some(-1),
        })
        .is_err());
    }
}
