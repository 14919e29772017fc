//! Typed accessor for the `tasks` table.

use cadesk_core::{ClientId, ComplianceTask, NewTask, TaskId, TaskStatus, UserId};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::BackendError;
use crate::rest::{Query, Rest};

const TABLE: &str = "tasks";

#[derive(Debug, Serialize)]
struct InsertTask<'a> {
    #[serde(flatten)]
    task: &'a NewTask,
    status: TaskStatus,
}

#[derive(Debug, Serialize)]
struct StatusBody {
    status: TaskStatus,
    updated_at: DateTime<Utc>,
}

/// Client for compliance tasks.
#[derive(Debug, Clone)]
pub struct TaskClient {
    rest: Rest,
}

impl TaskClient {
    pub(crate) fn new(rest: Rest) -> Self {
        Self { rest }
    }

    /// Tasks raised against `client`, newest first.
    pub async fn list_for_client(
        &self,
        client: ClientId,
    ) -> Result<Vec<ComplianceTask>, BackendError> {
        let query = Query::new()
            .eq("client_id", client)
            .order("created_at", false);
        self.rest.select(TABLE, &query).await
    }

    /// Tasks assigned to `user`, earliest due first.
    pub async fn list_assigned(&self, user: UserId) -> Result<Vec<ComplianceTask>, BackendError> {
        let query = Query::new()
            .eq("assigned_to", user)
            .order("due_date", true);
        self.rest.select(TABLE, &query).await
    }

    /// One task by id.
    pub async fn get(&self, id: TaskId) -> Result<Option<ComplianceTask>, BackendError> {
        self.rest.select_one(TABLE, Query::new().eq("id", id)).await
    }

    /// Create a task in `todo`.
    pub async fn create(&self, task: &NewTask) -> Result<ComplianceTask, BackendError> {
        let body = InsertTask {
            task,
            status: TaskStatus::Todo,
        };
        self.rest.insert(TABLE, &body).await
    }

    /// Move a task to `status`. `None` if the task does not exist.
    pub async fn update_status(
        &self,
        id: TaskId,
        status: TaskStatus,
    ) -> Result<Option<ComplianceTask>, BackendError> {
        let body = StatusBody {
            status,
            updated_at: Utc::now(),
        };
        let rows = self
            .rest
            .update(TABLE, &Query::new().eq("id", id), &body)
            .await?;
        Ok(rows.into_iter().next())
    }
}
