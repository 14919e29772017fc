//! # Account Profiles
//!
//! Every user is either a *professional* (a chartered accountant or company
//! secretary serving clients) or a *business* (the client being served).
//! The backend exposes both kinds through one `accounts` view whose
//! `account_type` column discriminates the shape of the rest of the row, so
//! a role is resolved with a single decode of [`AccountProfile`].

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::ids::UserId;
use crate::validate::{optional_text, require_text, Validate};

/// Which side of the engagement an account is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum AccountKind {
    Professional,
    Business,
}

impl AccountKind {
    /// Wire representation, matching the `account_type` discriminator.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Professional => "professional",
            Self::Business => "business",
        }
    }
}

impl std::fmt::Display for AccountKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Profile of a CA/CS professional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ProfessionalProfile {
    pub user_id: UserId,
    pub full_name: String,
    /// ICAI / ICSI membership number.
    #[serde(default)]
    pub membership_number: Option<String>,
    #[serde(default)]
    pub firm_name: Option<String>,
    #[serde(default)]
    pub specializations: Vec<String>,
    #[serde(default)]
    pub onboarding_completed: bool,
}

/// Profile of a business client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct BusinessProfile {
    pub user_id: UserId,
    pub company_name: String,
    /// Corporate identification number.
    #[serde(default)]
    pub registration_number: Option<String>,
    #[serde(default)]
    pub gstin: Option<String>,
    #[serde(default)]
    pub pan: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub onboarding_completed: bool,
}

/// A resolved account, discriminated by `account_type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(tag = "account_type", rename_all = "snake_case")]
pub enum AccountProfile {
    Professional(ProfessionalProfile),
    Business(BusinessProfile),
}

impl AccountProfile {
    /// Which kind of account this is.
    pub fn kind(&self) -> AccountKind {
        match self {
            Self::Professional(_) => AccountKind::Professional,
            Self::Business(_) => AccountKind::Business,
        }
    }

    /// The user this profile belongs to.
    pub fn user_id(&self) -> UserId {
        match self {
            Self::Professional(p) => p.user_id,
            Self::Business(b) => b.user_id,
        }
    }

    /// Display name: the professional's name or the company's name.
    pub fn display_name(&self) -> &str {
        match self {
            Self::Professional(p) => &p.full_name,
            Self::Business(b) => &b.company_name,
        }
    }

    /// Whether the user finished onboarding.
    pub fn onboarding_completed(&self) -> bool {
        match self {
            Self::Professional(p) => p.onboarding_completed,
            Self::Business(b) => b.onboarding_completed,
        }
    }
}

impl Validate for AccountProfile {
    fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Self::Professional(p) => {
                require_text("full_name", &p.full_name, 200)?;
                optional_text("membership_number", p.membership_number.as_deref(), 32)?;
                optional_text("firm_name", p.firm_name.as_deref(), 200)
            }
            Self::Business(b) => {
                require_text("company_name", &b.company_name, 200)?;
                if let Some(gstin) = b.gstin.as_deref() {
                    validate_gstin(gstin)?;
                }
                if let Some(pan) = b.pan.as_deref() {
                    validate_pan(pan)?;
                }
                Ok(())
            }
        }
    }
}

/// PAN: five letters, four digits, one letter.
fn validate_pan(pan: &str) -> Result<(), ValidationError> {
    let bytes = pan.as_bytes();
    let ok = bytes.len() == 10
        && bytes[..5].iter().all(u8::is_ascii_uppercase)
        && bytes[5..9].iter().all(u8::is_ascii_digit)
        && bytes[9].is_ascii_uppercase();
    if ok {
        Ok(())
    } else {
        Err(ValidationError::Malformed {
            field: "pan",
            reason: format!("'{pan}' is not a 10-character PAN"),
        })
    }
}

/// GSTIN: 15 uppercase alphanumerics embedding a PAN at positions 3..13.
fn validate_gstin(gstin: &str) -> Result<(), ValidationError> {
    let malformed = || ValidationError::Malformed {
        field: "gstin",
        reason: format!("'{gstin}' is not a 15-character GSTIN"),
    };
    if gstin.len() != 15
        || !gstin
            .bytes()
            .all(|b| b.is_ascii_digit() || b.is_ascii_uppercase())
    {
        return Err(malformed());
    }
    if !gstin.as_bytes()[..2].iter().all(u8::is_ascii_digit) {
        return Err(malformed());
    }
    validate_pan(&gstin[2..12]).map_err(|_| malformed())
}
