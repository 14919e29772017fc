//! Typed accessor for the `clients` table: the engagements between a
//! professional and the businesses they serve.

use cadesk_core::{ClientId, ClientRecord, ClientStatus, NewClient, UserId};
use serde::Serialize;

use crate::error::BackendError;
use crate::rest::{Query, Rest};

const TABLE: &str = "clients";

#[derive(Debug, Serialize)]
struct InsertClient<'a> {
    #[serde(flatten)]
    client: &'a NewClient,
    professional_id: UserId,
    status: ClientStatus,
}

/// Client for client records.
#[derive(Debug, Clone)]
pub struct ClientRecordClient {
    rest: Rest,
}

impl ClientRecordClient {
    pub(crate) fn new(rest: Rest) -> Self {
        Self { rest }
    }

    /// Engagements held by a professional, alphabetically.
    pub async fn list_for_professional(
        &self,
        professional: UserId,
    ) -> Result<Vec<ClientRecord>, BackendError> {
        let query = Query::new()
            .eq("professional_id", professional)
            .order("company_name", true);
        self.rest.select(TABLE, &query).await
    }

    /// One client record by id.
    pub async fn get(&self, id: ClientId) -> Result<Option<ClientRecord>, BackendError> {
        self.rest.select_one(TABLE, Query::new().eq("id", id)).await
    }

    /// Add a client for `professional`. New clients start in `onboarding`.
    pub async fn create(
        &self,
        professional: UserId,
        client: &NewClient,
    ) -> Result<ClientRecord, BackendError> {
        let body = InsertClient {
            client,
            professional_id: professional,
            status: ClientStatus::Onboarding,
        };
        self.rest.insert(TABLE, &body).await
    }
}
