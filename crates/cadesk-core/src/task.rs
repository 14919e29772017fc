//! Compliance tasks: units of work a professional tracks for a client.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::deadline::Priority;
use crate::error::ValidationError;
use crate::ids::{ClientId, TaskId, UserId};
use crate::validate::{optional_text, require_text, Validate};

/// Board column a task sits in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Todo,
    InProgress,
    Review,
    Done,
}

impl TaskStatus {
    /// Wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "in_progress",
            Self::Review => "review",
            Self::Done => "done",
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A row of the `tasks` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ComplianceTask {
    pub id: TaskId,
    pub client_id: ClientId,
    #[serde(default)]
    pub assigned_to: Option<UserId>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: Priority,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Validate for ComplianceTask {
    fn validate(&self) -> Result<(), ValidationError> {
        require_text("title", &self.title, 200)?;
        optional_text("description", self.description.as_deref(), 4000)?;
        if self.updated_at < self.created_at {
            return Err(ValidationError::TimestampOrder {
                earlier: "created_at",
                later: "updated_at",
            });
        }
        Ok(())
    }
}

/// Fields accepted when creating a task.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct NewTask {
    pub client_id: ClientId,
    #[serde(default)]
    pub assigned_to: Option<UserId>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub priority: Priority,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
}

impl Validate for NewTask {
    fn validate(&self) -> Result<(), ValidationError> {
        require_text("title", &self.title, 200)?;
        optional_text("description", self.description.as_deref(), 4000)
    }
}
