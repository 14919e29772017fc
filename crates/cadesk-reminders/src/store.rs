//! # Deadline Stores
//!
//! The sweep reads and claims deadlines through [`DeadlineStore`]. Two
//! implementations live in this crate: [`InMemoryDeadlineStore`] for tests
//! and local runs, and [`BackendDeadlineStore`] over the hosted backend's
//! table API. The HTTP service adds a direct Postgres store.
//!
//! ## Claim Semantics
//!
//! `claim_notified` must be a conditional write: it sets
//! `notification_sent = true` only if the flag is still false, and reports
//! which case happened. Two sweeps racing over the same row therefore see
//! exactly one [`ClaimOutcome::Claimed`] between them.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use cadesk_backend::{BackendClient, PartialRows};
use cadesk_core::{
    ComplianceDeadline, DeadlineId, NotificationPreference, ReminderWindow, UserId,
};
use chrono::Utc;
use parking_lot::RwLock;
use serde::Serialize;

use crate::error::StoreError;

/// A selected deadline together with its owner's saved preferences.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DueDeadline {
    pub deadline: ComplianceDeadline,
    /// `None` if the owner never saved preferences.
    pub preference: Option<NotificationPreference>,
}

/// A row the store selected but could not turn into a [`ComplianceDeadline`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnreadableRow {
    /// `None` when even the id could not be read.
    pub id: Option<DeadlineId>,
    pub reason: String,
}

/// What [`DeadlineStore::select_due`] returns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    /// Soonest first.
    pub due: Vec<DueDeadline>,
    /// Rows that matched the predicate but could not be decoded.
    pub unreadable: Vec<UnreadableRow>,
}

impl From<Vec<DueDeadline>> for Selection {
    fn from(due: Vec<DueDeadline>) -> Self {
        Self {
            due,
            unreadable: Vec::new(),
        }
    }
}

/// Result of a conditional claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimOutcome {
    /// This caller flipped the flag.
    Claimed,
    /// The flag was already set, usually by a concurrent sweep.
    AlreadyClaimed,
    /// The row no longer exists.
    Missing,
}

/// Storage seam for the reminder sweep.
#[async_trait::async_trait]
pub trait DeadlineStore: Send + Sync {
    /// Pending, unnotified deadlines due inside `window`, soonest first, each
    /// paired with its owner's preferences.
    ///
    /// Only a failed query is an error. A matching row that cannot be
    /// decoded goes into [`Selection::unreadable`].
    async fn select_due(&self, window: &ReminderWindow) -> Result<Selection, StoreError>;

    /// Set `notification_sent = true` if it is still false.
    async fn claim_notified(&self, id: DeadlineId) -> Result<ClaimOutcome, StoreError>;
}

// -- In-memory ---------------------------------------------------------------

/// Deadlines and preferences held in process memory.
///
/// The lock is `parking_lot` and is never held across an `.await`.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDeadlineStore {
    deadlines: Arc<RwLock<HashMap<DeadlineId, ComplianceDeadline>>>,
    preferences: Arc<RwLock<HashMap<UserId, NotificationPreference>>>,
}

impl InMemoryDeadlineStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a deadline.
    pub fn insert(&self, deadline: ComplianceDeadline) -> Option<ComplianceDeadline> {
        self.deadlines.write().insert(deadline.id, deadline)
    }

    /// Insert or replace an owner's preferences.
    pub fn set_preference(&self, pref: NotificationPreference) {
        self.preferences.write().insert(pref.owner_id, pref);
    }

    pub fn get(&self, id: DeadlineId) -> Option<ComplianceDeadline> {
        self.deadlines.read().get(&id).cloned()
    }

    /// All deadlines, soonest first. Ties break on id.
    pub fn list(&self) -> Vec<ComplianceDeadline> {
        let mut all: Vec<_> = self.deadlines.read().values().cloned().collect();
        all.sort_by_key(|d| (d.due_date, d.id));
        all
    }
}

#[async_trait::async_trait]
impl DeadlineStore for InMemoryDeadlineStore {
    async fn select_due(&self, window: &ReminderWindow) -> Result<Selection, StoreError> {
        let prefs = self.preferences.read();
        let due: Vec<DueDeadline> = self
            .list()
            .into_iter()
            .filter(|d| d.is_due_for_reminder(window))
            .map(|deadline| DueDeadline {
                preference: prefs.get(&deadline.owner_id).cloned(),
                deadline,
            })
            .collect();
        Ok(due.into())
    }

    async fn claim_notified(&self, id: DeadlineId) -> Result<ClaimOutcome, StoreError> {
        let mut deadlines = self.deadlines.write();
        let Some(row) = deadlines.get_mut(&id) else {
            return Ok(ClaimOutcome::Missing);
        };
        if row.notification_sent {
            return Ok(ClaimOutcome::AlreadyClaimed);
        }
        row.notification_sent = true;
        row.updated_at = Utc::now().max(row.created_at);
        Ok(ClaimOutcome::Claimed)
    }
}

// -- Hosted backend ----------------------------------------------------------

/// Store backed by the hosted backend's table API.
///
/// Selection is two reads: the due deadlines, then the preferences of their
/// distinct owners. Either failing fails the selection.
#[derive(Debug, Clone)]
pub struct BackendDeadlineStore {
    client: BackendClient,
}

impl BackendDeadlineStore {
    pub fn new(client: BackendClient) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl DeadlineStore for BackendDeadlineStore {
    async fn select_due(&self, window: &ReminderWindow) -> Result<Selection, StoreError> {
        let PartialRows { rows, rejected } = self.client.deadlines().select_due(window).await?;
        let unreadable: Vec<UnreadableRow> = rejected
            .into_iter()
            .map(|r| UnreadableRow {
                id: r.id.and_then(|raw| raw.parse().ok()),
                reason: format!("row {}: {}", r.index, r.reason),
            })
            .collect();
        if rows.is_empty() {
            return Ok(Selection {
                due: Vec::new(),
                unreadable,
            });
        }

        let owners: Vec<UserId> = rows
            .iter()
            .map(|d| d.owner_id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let prefs: HashMap<UserId, NotificationPreference> = self
            .client
            .preferences()
            .for_owners(&owners)
            .await?
            .into_iter()
            .map(|p| (p.owner_id, p))
            .collect();

        let due = rows
            .into_iter()
            .map(|deadline| DueDeadline {
                preference: prefs.get(&deadline.owner_id).cloned(),
                deadline,
            })
            .collect();
        Ok(Selection { due, unreadable })
    }

    async fn claim_notified(&self, id: DeadlineId) -> Result<ClaimOutcome, StoreError> {
        if self.client.deadlines().claim_notified(id).await? {
            return Ok(ClaimOutcome::Claimed);
        }
        // Nothing matched the conditional update: find out why.
        if self.client.deadlines().exists(id).await? {
            Ok(ClaimOutcome::AlreadyClaimed)
        } else {
            Ok(ClaimOutcome::Missing)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadesk_core::{DeadlineStatus, Priority};
    use chrono::{DateTime, Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 7, 15, 6, 30, 0).unwrap()
    }

    fn deadline(due_in: Duration, status: DeadlineStatus, notified: bool) -> ComplianceDeadline {
        let created = now() - Duration::days(30);
        ComplianceDeadline {
            id: DeadlineId::new(),
            title: "TDS deposit".into(),
            description: None,
            category: "TDS".into(),
            due_date: now() + due_in,
            priority: Priority::Medium,
            status,
            notification_sent: notified,
            owner_id: UserId::new(),
            created_at: created,
            updated_at: created,
        }
    }

    #[tokio::test]
    async fn memory_selection_applies_full_predicate() {
        let store = InMemoryDeadlineStore::new();
        let due = deadline(Duration::days(2), DeadlineStatus::Pending, false);
        store.insert(due.clone());
        store.insert(deadline(Duration::days(2), DeadlineStatus::Completed, false));
        store.insert(deadline(Duration::days(2), DeadlineStatus::Pending, true));
        store.insert(deadline(Duration::days(9), DeadlineStatus::Pending, false));
        store.insert(deadline(-Duration::hours(1), DeadlineStatus::Pending, false));

        let selected = store
            .select_due(&ReminderWindow::starting_at(now()))
            .await
            .unwrap();
        assert_eq!(selected.due.len(), 1);
        assert_eq!(selected.due[0].deadline.id, due.id);
        assert!(selected.due[0].preference.is_none());
        assert!(selected.unreadable.is_empty());
    }

    #[tokio::test]
    async fn memory_selection_attaches_owner_preference() {
        let store = InMemoryDeadlineStore::new();
        let due = deadline(Duration::days(1), DeadlineStatus::Pending, false);
        let pref = NotificationPreference::defaults_for(due.owner_id);
        store.insert(due);
        store.set_preference(pref.clone());

        let selected = store
            .select_due(&ReminderWindow::starting_at(now()))
            .await
            .unwrap();
        assert_eq!(selected.due[0].preference.as_ref(), Some(&pref));
    }

    #[tokio::test]
    async fn memory_selection_is_soonest_first() {
        let store = InMemoryDeadlineStore::new();
        let days: [i64; 6] = [6, 1, 4, 2, 5, 3];
        for d in days {
            store.insert(deadline(Duration::days(d), DeadlineStatus::Pending, false));
        }

        let selected = store
            .select_due(&ReminderWindow::starting_at(now()))
            .await
            .unwrap();
        let due: Vec<_> = selected.due.iter().map(|d| d.deadline.due_date).collect();
        let expected: Vec<_> = (1..=6).map(|d| now() + Duration::days(d)).collect();
        assert_eq!(due, expected);
    }

    #[test]
    fn list_orders_by_due_date() {
        let store = InMemoryDeadlineStore::new();
        let late = deadline(Duration::days(3), DeadlineStatus::Pending, false);
        let early = deadline(Duration::days(1), DeadlineStatus::Completed, true);
        store.insert(late.clone());
        store.insert(early.clone());

        let ids: Vec<_> = store.list().into_iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![early.id, late.id]);
    }

    #[tokio::test]
    async fn memory_claim_outcomes() {
        let store = InMemoryDeadlineStore::new();
        let due = deadline(Duration::days(1), DeadlineStatus::Pending, false);
        store.insert(due.clone());

        assert_eq!(store.claim_notified(due.id).await.unwrap(), ClaimOutcome::Claimed);
        assert_eq!(
            store.claim_notified(due.id).await.unwrap(),
            ClaimOutcome::AlreadyClaimed
        );
        assert_eq!(
            store.claim_notified(DeadlineId::new()).await.unwrap(),
            ClaimOutcome::Missing
        );
        assert!(store.get(due.id).unwrap().notification_sent);
    }
}
