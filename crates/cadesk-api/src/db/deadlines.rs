//! [`DeadlineStore`] over the `compliance_deadlines` and
//! `notification_preferences` tables.

use cadesk_core::{
    ComplianceDeadline, DeadlineId, NotificationPreference, ReminderWindow, UserId, Validate,
};
use cadesk_reminders::{
    ClaimOutcome, DeadlineStore, DueDeadline, Selection, StoreError, UnreadableRow,
};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct PgDeadlineStore {
    pool: PgPool,
}

impl PgDeadlineStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn db_error(err: sqlx::Error) -> StoreError {
    StoreError::Database(err.to_string())
}

#[async_trait::async_trait]
impl DeadlineStore for PgDeadlineStore {
    async fn select_due(&self, window: &ReminderWindow) -> Result<Selection, StoreError> {
        let rows = sqlx::query_as::<_, DueRow>(
            "SELECT d.id, d.title, d.description, d.category, d.due_date, d.priority,
                    d.status, d.notification_sent, d.owner_id, d.created_at, d.updated_at,
                    p.owner_id AS pref_owner_id, p.email_notifications,
                    p.push_notifications, p.reminder_days_before
             FROM compliance_deadlines d
             LEFT JOIN notification_preferences p ON p.owner_id = d.owner_id
             WHERE d.notification_sent = false
               AND d.status = 'pending'
               AND d.due_date >= $1
               AND d.due_date <= $2
             ORDER BY d.due_date ASC",
        )
        .bind(window.start)
        .bind(window.end)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        let mut selection = Selection::default();
        for (index, row) in rows.into_iter().enumerate() {
            match row.into_due(index) {
                Ok(due) => selection.due.push(due),
                Err(unreadable) => {
                    tracing::warn!(index, reason = %unreadable.reason, "deadline row set aside");
                    selection.unreadable.push(unreadable);
                }
            }
        }
        Ok(selection)
    }

    async fn claim_notified(&self, id: DeadlineId) -> Result<ClaimOutcome, StoreError> {
        let result = sqlx::query(
            "UPDATE compliance_deadlines
             SET notification_sent = true, updated_at = now()
             WHERE id = $1 AND notification_sent = false",
        )
        .bind(*id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        if result.rows_affected() > 0 {
            return Ok(ClaimOutcome::Claimed);
        }

        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM compliance_deadlines WHERE id = $1)")
                .bind(*id.as_uuid())
                .fetch_one(&self.pool)
                .await
                .map_err(db_error)?;
        Ok(if exists {
            ClaimOutcome::AlreadyClaimed
        } else {
            ClaimOutcome::Missing
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct DueRow {
    id: Uuid,
    title: String,
    description: Option<String>,
    category: String,
    due_date: DateTime<Utc>,
    priority: String,
    status: String,
    notification_sent: bool,
    owner_id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    pref_owner_id: Option<Uuid>,
    email_notifications: Option<bool>,
    push_notifications: Option<bool>,
    reminder_days_before: Option<i32>,
}

impl DueRow {
    /// Decode one joined row. Only columns the sweep cannot interpret make
    /// the row unreadable; field-length and timestamp checks are left to the
    /// write path.
    fn into_due(self, index: usize) -> Result<DueDeadline, UnreadableRow> {
        let id = DeadlineId::from_uuid(self.id);
        let malformed = |reason: String| UnreadableRow {
            id: Some(id),
            reason: format!("row {index}: {reason}"),
        };

        let owner_id = UserId::from_uuid(self.owner_id);
        let deadline = ComplianceDeadline {
            id,
            title: self.title,
            description: self.description,
            category: self.category,
            due_date: self.due_date,
            priority: self.priority.parse().map_err(|e| malformed(format!("{e}")))?,
            status: self.status.parse().map_err(|e| malformed(format!("{e}")))?,
            notification_sent: self.notification_sent,
            owner_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        };

        let preference = match self.pref_owner_id {
            Some(_) => {
                let defaults = NotificationPreference::defaults_for(owner_id);
                let pref = NotificationPreference {
                    owner_id,
                    email_notifications: self
                        .email_notifications
                        .unwrap_or(defaults.email_notifications),
                    push_notifications: self
                        .push_notifications
                        .unwrap_or(defaults.push_notifications),
                    reminder_days_before: self
                        .reminder_days_before
                        .unwrap_or(defaults.reminder_days_before),
                };
                match pref.validate() {
                    Ok(()) => Some(pref),
                    Err(err) => {
                        tracing::warn!(owner_id = %owner_id, "ignoring invalid preference: {err}");
                        None
                    }
                }
            }
            None => None,
        };

        Ok(DueDeadline {
            deadline,
            preference,
        })
    }
}
