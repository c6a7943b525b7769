use serde::{Deserialize, Serialize};

use crate::UserId;

/// User information carried by an authenticated request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    user_id: UserId,
    display_name: String,
    email: Option<String>,
}

impl UserIdentity {
    /// Creates a user identity from authentication data.
    #[must_use]
    pub fn new(user_id: UserId, display_name: impl Into<String>, email: Option<String>) -> Self {
        Self {
            user_id,
            display_name: display_name.into(),
            email,
        }
    }

    /// Returns the stable account identifier.
    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the display name for the current user.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.display_name.as_str()
    }

    /// Returns the email, if the identity provider returned one.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }
}

/// The acting party of a permission check.
///
/// Callers build this from their session layer before invoking the
/// authorization services; an unauthenticated request maps to [`Principal::Guest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Principal {
    /// Unauthenticated caller.
    Guest,
    /// Authenticated caller with a stable identity.
    Authenticated(UserIdentity),
}

impl Principal {
    /// Returns whether the principal is authenticated.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    /// Returns the account identifier for authenticated principals.
    #[must_use]
    pub fn user_id(&self) -> Option<UserId> {
        match self {
            Self::Guest => None,
            Self::Authenticated(identity) => Some(identity.user_id()),
        }
    }

    /// Returns a diagnostic label for log lines.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Guest => "guest".to_owned(),
            Self::Authenticated(identity) => identity.user_id().to_string(),
        }
    }
}

/// Opaque owner reference attached to a protected resource.
///
/// Owners are compared by stringified identity so callers may pass whatever
/// identifier representation their resource store uses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceOwner(String);

impl ResourceOwner {
    /// Creates an owner reference from any identifier representation.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the owner identity as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns whether the owner identity matches the given account.
    #[must_use]
    pub fn matches(&self, user_id: UserId) -> bool {
        self.0 == user_id.to_string()
    }
}

impl From<UserId> for ResourceOwner {
    fn from(value: UserId) -> Self {
        Self(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use crate::UserId;

    use super::{Principal, ResourceOwner, UserIdentity};

    #[test]
    fn guest_has_no_user_id() {
        assert!(Principal::Guest.user_id().is_none());
        assert!(!Principal::Guest.is_authenticated());
    }

    #[test]
    fn owner_matches_stringified_identity() {
        let user_id = UserId::new();
        let owner = ResourceOwner::new(user_id.to_string());
        assert!(owner.matches(user_id));
        assert!(!owner.matches(UserId::new()));
    }

    #[test]
    fn owner_from_user_id_round_trips() {
        let user_id = UserId::new();
        let owner = ResourceOwner::from(user_id);
        assert_eq!(owner.as_str(), user_id.to_string());
    }

    #[test]
    fn authenticated_principal_exposes_identity() {
        let user_id = UserId::new();
        let principal =
            Principal::Authenticated(UserIdentity::new(user_id, "Alice", None));
        assert_eq!(principal.user_id(), Some(user_id));
    }
}
