//! # Session Context
//!
//! The authenticated caller, passed explicitly to whatever needs it. A
//! session is built once per request from the bearer access token: the
//! token resolves to an [`AuthUser`], the user resolves to an optional
//! [`AccountProfile`], and onboarding completion is derived from the
//! profile rather than stored separately.

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::error::ValidationError;
use crate::ids::UserId;
use crate::profile::{AccountKind, AccountProfile};
use crate::validate::{require_email, Validate};

/// The identity behind an access token, as reported by the backend's auth API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AuthUser {
    pub id: UserId,
    #[serde(default)]
    pub email: Option<String>,
}

impl Validate for AuthUser {
    fn validate(&self) -> Result<(), ValidationError> {
        match self.email.as_deref() {
            Some(email) => require_email("email", email),
            None => Ok(()),
        }
    }
}

/// A bearer access token. Zeroized on drop and redacted in `Debug`.
#[derive(Clone)]
pub struct AccessToken(Zeroizing<String>);

impl AccessToken {
    /// Wrap a raw token string.
    pub fn new(token: impl Into<String>) -> Self {
        Self(Zeroizing::new(token.into()))
    }

    /// Borrow the raw token for use in an outgoing header.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AccessToken([REDACTED])")
    }
}

/// The authenticated caller of one request.
#[derive(Debug, Clone)]
pub struct Session {
    pub user: AuthUser,
    pub access_token: AccessToken,
    /// `None` until the user has created an account profile.
    pub profile: Option<AccountProfile>,
}

impl Session {
    /// Build a session from its parts.
    pub fn new(user: AuthUser, access_token: AccessToken, profile: Option<AccountProfile>) -> Self {
        Self {
            user,
            access_token,
            profile,
        }
    }

    /// The caller's user id.
    pub fn user_id(&self) -> UserId {
        self.user.id
    }

    /// The caller's account kind, if a profile exists.
    pub fn kind(&self) -> Option<AccountKind> {
        self.profile.as_ref().map(AccountProfile::kind)
    }

    /// Derived flag: a profile exists and its onboarding is complete.
    pub fn onboarding_complete(&self) -> bool {
        self.profile
            .as_ref()
            .is_some_and(AccountProfile::onboarding_completed)
    }

    /// Whether the caller is an account of the given kind.
    pub fn is(&self, kind: AccountKind) -> bool {
        self.kind() == Some(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::BusinessProfile;

    fn user() -> AuthUser {
        AuthUser {
            id: UserId::new(),
            email: Some("owner@kaveri.in".into()),
        }
    }

    #[test]
    fn onboarding_is_derived_from_profile() {
        let u = user();
        let without_profile = Session::new(u.clone(), AccessToken::new("t"), None);
        assert!(!without_profile.onboarding_complete());
        assert_eq!(without_profile.kind(), None);

        let profile = AccountProfile::Business(BusinessProfile {
            user_id: u.id,
            company_name: "Kaveri Foods".into(),
            registration_number: None,
            gstin: None,
            pan: None,
            industry: None,
            onboarding_completed: true,
        });
        let with_profile = Session::new(u, AccessToken::new("t"), Some(profile));
        assert!(with_profile.onboarding_complete());
        assert!(with_profile.is(AccountKind::Business));
        assert!(!with_profile.is(AccountKind::Professional));
    }

    #[test]
    fn token_debug_is_redacted() {
        let token = AccessToken::new("eyJhbGciOi.secret");
        let rendered = format!("{token:?}");
        assert!(!rendered.contains("secret"));
        assert_eq!(token.expose(), "eyJhbGciOi.secret");
    }
}
