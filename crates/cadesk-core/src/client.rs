//! Client engagements between a professional and a business.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::ids::{ClientId, UserId};
use crate::validate::{require_email, require_text, Validate};

/// Engagement status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum ClientStatus {
    Active,
    Inactive,
    Onboarding,
}

/// A row of the `clients` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ClientRecord {
    pub id: ClientId,
    pub professional_id: UserId,
    /// The business account, once the client has signed up.
    #[serde(default)]
    pub business_id: Option<UserId>,
    pub company_name: String,
    pub contact_email: String,
    pub status: ClientStatus,
    pub created_at: DateTime<Utc>,
}

impl ClientRecord {
    /// Whether `user` is a party to this engagement.
    pub fn involves(&self, user: UserId) -> bool {
        self.professional_id == user || self.business_id == Some(user)
    }
}

impl Validate for ClientRecord {
    fn validate(&self) -> Result<(), ValidationError> {
        require_text("company_name", &self.company_name, 200)?;
        require_email("contact_email", &self.contact_email)
    }
}

/// Fields accepted when a professional adds a client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct NewClient {
    pub company_name: String,
    pub contact_email: String,
}

impl Validate for NewClient {
    fn validate(&self) -> Result<(), ValidationError> {
        require_text("company_name", &self.company_name, 200)?;
        require_email("contact_email", &self.contact_email)
    }
}
