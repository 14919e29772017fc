//! Typed accessor for the `notification_preferences` table.

use cadesk_core::{NotificationPreference, UserId};

use crate::error::BackendError;
use crate::rest::{Query, Rest};

const TABLE: &str = "notification_preferences";

/// Client for notification preferences.
#[derive(Debug, Clone)]
pub struct PreferenceClient {
    rest: Rest,
}

impl PreferenceClient {
    pub(crate) fn new(rest: Rest) -> Self {
        Self { rest }
    }

    /// Preferences saved by `owner`, if any.
    pub async fn get(&self, owner: UserId) -> Result<Option<NotificationPreference>, BackendError> {
        self.rest
            .select_one(TABLE, Query::new().eq("owner_id", owner))
            .await
    }

    /// Preferences for every owner in `owners` that has saved some.
    pub async fn for_owners(
        &self,
        owners: &[UserId],
    ) -> Result<Vec<NotificationPreference>, BackendError> {
        if owners.is_empty() {
            return Ok(Vec::new());
        }
        self.rest
            .select(TABLE, &Query::new().in_list("owner_id", owners))
            .await
    }

    /// Insert or replace the preferences for `pref.owner_id`.
    pub async fn upsert(
        &self,
        pref: &NotificationPreference,
    ) -> Result<NotificationPreference, BackendError> {
        self.rest.upsert(TABLE, "owner_id", pref).await
    }
}
