//! # Deadline Reminder Sweep
//!
//! One sweep, run at time `now`:
//!
//! 1. Select pending, unnotified deadlines with `due_date` in
//!    `[now, now + 7 days]`. A selection failure fails the sweep.
//! 2. For each row in order, claim it (`notification_sent: false → true`),
//!    then dispatch a reminder. Rows are handled one at a time; each claim is
//!    awaited before the next row starts.
//! 3. Report the ids that were claimed.
//!
//! A row whose claim errors is logged and skipped. It stays unnotified and
//! the next sweep selects it again. Nothing is retried within a sweep.
//! Rows the store could not decode are reported as `malformed` skips and do
//! not stop the healthy rows from being processed.

use std::sync::Arc;

use cadesk_core::{ComplianceDeadline, DeadlineId, ReminderWindow};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::SweepError;
use crate::notifier::ReminderNotifier;
use crate::policy::{PlannedAction, PreferencePolicy};
use crate::store::{ClaimOutcome, DeadlineStore, Selection, UnreadableRow};

/// Why a selected row was not reported as processed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum SkipReason {
    /// Another sweep claimed it first.
    AlreadyClaimed,
    /// The row disappeared between selection and claim.
    Missing,
    /// The claim failed; the row stays unnotified.
    ClaimFailed(String),
    /// Outside the owner's preferred window.
    Deferred,
    /// The store could not decode the row. It stays unnotified.
    Malformed(String),
}

/// A row the sweep did not process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRow {
    pub id: DeadlineId,
    #[serde(flatten)]
    pub reason: SkipReason,
}

/// Outcome of one sweep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    pub window: ReminderWindow,
    pub policy: PreferencePolicy,
    /// Rows this sweep claimed, in processing order.
    pub processed: Vec<DeadlineId>,
    /// Claimed rows whose owner had email turned off, so no reminder went out.
    pub suppressed: Vec<DeadlineId>,
    pub skipped: Vec<SkippedRow>,
}

impl SweepReport {
    fn new(window: ReminderWindow, policy: PreferencePolicy) -> Self {
        Self {
            window,
            policy,
            processed: Vec::new(),
            suppressed: Vec::new(),
            skipped: Vec::new(),
        }
    }

    /// Human-readable summary for the invocation response.
    pub fn message(&self) -> String {
        format!("Processed {} deadline notifications", self.processed.len())
    }
}

/// One row of a dry run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlannedReminder {
    pub deadline: ComplianceDeadline,
    pub action: PlannedAction,
}

/// What a sweep would do, computed without mutating anything.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepPreview {
    pub window: ReminderWindow,
    pub policy: PreferencePolicy,
    pub planned: Vec<PlannedReminder>,
    pub unreadable: Vec<UnreadableRow>,
}

/// The reminder sweep over a [`DeadlineStore`].
#[derive(Clone)]
pub struct ReminderSweep {
    store: Arc<dyn DeadlineStore>,
    notifier: Arc<dyn ReminderNotifier>,
    policy: PreferencePolicy,
}

impl std::fmt::Debug for ReminderSweep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReminderSweep")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl ReminderSweep {
    pub fn new(store: Arc<dyn DeadlineStore>, notifier: Arc<dyn ReminderNotifier>) -> Self {
        Self {
            store,
            notifier,
            policy: PreferencePolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: PreferencePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> PreferencePolicy {
        self.policy
    }

    /// Run a sweep against the current wall-clock time.
    pub async fn run(&self) -> Result<SweepReport, SweepError> {
        self.run_at(Utc::now()).await
    }

    /// Run a sweep as if invoked at `now`.
    pub async fn run_at(&self, now: DateTime<Utc>) -> Result<SweepReport, SweepError> {
        let window = ReminderWindow::starting_at(now);
        let Selection {
            due: selected,
            unreadable,
        } = self
            .store
            .select_due(&window)
            .await
            .map_err(SweepError::Selection)?;

        tracing::info!(
            selected = selected.len(),
            window_start = %window.start,
            window_end = %window.end,
            policy = %self.policy,
            "Found {} deadlines to notify",
            selected.len()
        );

        let mut report = SweepReport::new(window, self.policy);
        for row in unreadable {
            match row.id {
                Some(id) => {
                    tracing::warn!(deadline_id = %id, reason = %row.reason, "skipping unreadable deadline");
                    report.skipped.push(SkippedRow {
                        id,
                        reason: SkipReason::Malformed(row.reason),
                    });
                }
                None => {
                    tracing::error!(reason = %row.reason, "skipping unreadable deadline without an id");
                }
            }
        }
        for due in selected {
            let deadline = &due.deadline;
            let id = deadline.id;

            if !deadline.is_due_for_reminder(&window) {
                tracing::warn!(deadline_id = %id, "store returned a row outside the selection; ignoring");
                continue;
            }
            if let Some(pref) = &due.preference {
                tracing::debug!(
                    deadline_id = %id,
                    email_notifications = pref.email_notifications,
                    reminder_days_before = pref.reminder_days_before,
                    "owner preferences"
                );
            }

            let action = self.policy.plan(&due, now);
            if action == PlannedAction::Defer {
                report.skipped.push(SkippedRow {
                    id,
                    reason: SkipReason::Deferred,
                });
                continue;
            }

            match self.store.claim_notified(id).await {
                Ok(ClaimOutcome::Claimed) => {
                    if action == PlannedAction::Notify {
                        if let Err(e) = self.notifier.notify(deadline, due.preference.as_ref()).await {
                            tracing::warn!(deadline_id = %id, error = %e, "reminder dispatch failed after claim");
                        }
                    } else {
                        tracing::info!(deadline_id = %id, "email disabled by owner; marked without reminder");
                        report.suppressed.push(id);
                    }
                    report.processed.push(id);
                }
                Ok(ClaimOutcome::AlreadyClaimed) => {
                    tracing::debug!(deadline_id = %id, "already claimed by another sweep");
                    report.skipped.push(SkippedRow {
                        id,
                        reason: SkipReason::AlreadyClaimed,
                    });
                }
                Ok(ClaimOutcome::Missing) => {
                    tracing::debug!(deadline_id = %id, "deadline vanished before claim");
                    report.skipped.push(SkippedRow {
                        id,
                        reason: SkipReason::Missing,
                    });
                }
                Err(e) => {
                    tracing::warn!(deadline_id = %id, error = %e, "Error updating deadline");
                    report.skipped.push(SkippedRow {
                        id,
                        reason: SkipReason::ClaimFailed(e.to_string()),
                    });
                }
            }
        }

        tracing::info!(
            processed = report.processed.len(),
            skipped = report.skipped.len(),
            "sweep complete"
        );
        Ok(report)
    }

    /// Dry run at `now`: the selection and the planned action for each row.
    pub async fn preview_at(&self, now: DateTime<Utc>) -> Result<SweepPreview, SweepError> {
        let window = ReminderWindow::starting_at(now);
        let Selection { due, unreadable } = self
            .store
            .select_due(&window)
            .await
            .map_err(SweepError::Selection)?;
        let planned = due
            .into_iter()
            .filter(|due| due.deadline.is_due_for_reminder(&window))
            .map(|due| PlannedReminder {
                action: self.policy.plan(&due, now),
                deadline: due.deadline,
            })
            .collect();
        Ok(SweepPreview {
            window,
            policy: self.policy,
            planned,
            unreadable,
        })
    }
}
