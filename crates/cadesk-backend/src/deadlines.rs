//! Typed accessor for the `compliance_deadlines` table.
//!
//! | Method | Query | Operation |
//! |--------|-------|-----------|
//! | GET    | `owner_id=eq.{owner}&order=due_date.asc` | List an owner's deadlines |
//! | GET    | `id=eq.{id}` | Get one deadline |
//! | POST   | - | Create a deadline |
//! | PATCH  | `id=eq.{id}&owner_id=eq.{owner}` | Update fields |
//! | GET    | `notification_sent=eq.false&status=eq.pending&due_date=gte..&due_date=lte..` | Reminder selection |
//! | PATCH  | `select=id&id=eq.{id}&notification_sent=eq.false` | Claim a reminder |

use cadesk_core::{
    ComplianceDeadline, DeadlineId, DeadlinePatch, DeadlineStatus, NewDeadline, Priority,
    ReminderWindow, UserId, Validate, ValidationError,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::BackendError;
use crate::rest::{PartialRows, Query, Rest};

const TABLE: &str = "compliance_deadlines";

/// Insert body: the creatable fields plus owner and initial reminder state.
#[derive(Debug, Serialize)]
struct InsertDeadline<'a> {
    title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    category: &'a str,
    due_date: DateTime<Utc>,
    priority: Priority,
    status: DeadlineStatus,
    notification_sent: bool,
    owner_id: UserId,
}

#[derive(Debug, Serialize)]
struct PatchBody<'a> {
    #[serde(flatten)]
    patch: &'a DeadlinePatch,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
struct ClaimBody {
    notification_sent: bool,
    updated_at: DateTime<Utc>,
}

/// Reads that only need to know a row is there select just its id.
#[derive(Debug, Deserialize)]
struct IdRow {
    id: DeadlineId,
}

impl Validate for IdRow {
    fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }
}

/// Client for compliance deadlines.
#[derive(Debug, Clone)]
pub struct DeadlineClient {
    rest: Rest,
}

impl DeadlineClient {
    pub(crate) fn new(rest: Rest) -> Self {
        Self { rest }
    }

    /// All deadlines owned by `owner`, soonest first.
    pub async fn list_for_owner(
        &self,
        owner: UserId,
    ) -> Result<Vec<ComplianceDeadline>, BackendError> {
        let query = Query::new()
            .eq("owner_id", owner)
            .order("due_date", true);
        self.rest.select(TABLE, &query).await
    }

    /// One deadline by id.
    pub async fn get(&self, id: DeadlineId) -> Result<Option<ComplianceDeadline>, BackendError> {
        self.rest.select_one(TABLE, Query::new().eq("id", id)).await
    }

    /// Create a pending, unnotified deadline for `owner`.
    pub async fn create(
        &self,
        owner: UserId,
        new: &NewDeadline,
    ) -> Result<ComplianceDeadline, BackendError> {
        let body = InsertDeadline {
            title: &new.title,
            description: new.description.as_deref(),
            category: &new.category,
            due_date: new.due_date,
            priority: new.priority,
            status: DeadlineStatus::Pending,
            notification_sent: false,
            owner_id: owner,
        };
        self.rest.insert(TABLE, &body).await
    }

    /// Apply `patch` to a deadline owned by `owner`. Returns `None` when no
    /// such deadline exists for that owner.
    pub async fn update(
        &self,
        id: DeadlineId,
        owner: UserId,
        patch: &DeadlinePatch,
    ) -> Result<Option<ComplianceDeadline>, BackendError> {
        let query = Query::new().eq("id", id).eq("owner_id", owner);
        let body = PatchBody {
            patch,
            updated_at: Utc::now(),
        };
        let rows = self.rest.update(TABLE, &query, &body).await?;
        Ok(rows.into_iter().next())
    }

    /// Whether a deadline with `id` exists, whatever its contents.
    pub async fn exists(&self, id: DeadlineId) -> Result<bool, BackendError> {
        let query = Query::new().select("id").eq("id", id).limit(1);
        let rows: Vec<IdRow> = self.rest.select(TABLE, &query).await?;
        Ok(rows.iter().any(|row| row.id == id))
    }

    /// The reminder selection: pending, unnotified deadlines due inside `window`.
    ///
    /// Rows are decoded but not validated, and a row that fails to decode is
    /// returned under `rejected` rather than failing the read.
    pub async fn select_due(
        &self,
        window: &ReminderWindow,
    ) -> Result<PartialRows<ComplianceDeadline>, BackendError> {
        let query = Query::new()
            .eq("notification_sent", false)
            .eq("status", DeadlineStatus::Pending)
            .gte_time("due_date", window.start)
            .lte_time("due_date", window.end)
            .order("due_date", true);
        self.rest.select_lenient(TABLE, &query).await
    }

    /// Conditionally set `notification_sent = true`.
    ///
    /// The update only matches while the flag is still false, so of two
    /// overlapping sweeps exactly one sees `true` here.
    pub async fn claim_notified(&self, id: DeadlineId) -> Result<bool, BackendError> {
        let query = Query::new()
            .select("id")
            .eq("id", id)
            .eq("notification_sent", false);
        let body = ClaimBody {
            notification_sent: true,
            updated_at: Utc::now(),
        };
        let rows: Vec<IdRow> = self.rest.update(TABLE, &query, &body).await?;
        Ok(rows.iter().any(|row| row.id == id))
    }
}
