use chrono::{DateTime, Utc};
use rolegate_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Role auto-assigned to newly registered accounts.
pub const DEFAULT_ROLE_NAME: &str = "user";

/// Role granted unrestricted administrative capabilities by convention.
pub const ADMIN_ROLE_NAME: &str = "admin";

/// Role allowed to read administrative listings without mutating them.
pub const MANAGER_ROLE_NAME: &str = "manager";

/// Names reserved for system-managed roles; custom roles may not use them.
pub const RESERVED_ROLE_NAMES: &[&str] = &["admin", "manager", "user", "guest"];

/// Validated unique role name.
///
/// Role names order lexicographically; that ordering is the effective-role
/// tie-break when a user holds several active assignments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RoleName(String);

impl RoleName {
    /// Creates a validated role name.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let trimmed = value.trim();

        if trimmed.is_empty() {
            return Err(AppError::Validation(
                "role name must not be empty or whitespace".to_owned(),
            ));
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the underlying string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns whether the name belongs to the reserved system set.
    #[must_use]
    pub fn is_reserved(&self) -> bool {
        RESERVED_ROLE_NAMES.contains(&self.0.as_str())
    }
}

impl From<RoleName> for String {
    fn from(value: RoleName) -> Self {
        value.0
    }
}

impl std::fmt::Display for RoleName {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Named bundle of permission grants assignable to users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    /// Unique role name.
    pub name: RoleName,
    /// Human-readable description.
    pub description: String,
    /// Marks the single role assigned to accounts by default.
    pub is_default: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::{RESERVED_ROLE_NAMES, RoleName};

    #[test]
    fn role_name_rejects_whitespace() {
        assert!(RoleName::new("   ").is_err());
    }

    #[test]
    fn role_name_trims_surrounding_whitespace() {
        let name = RoleName::new("  ops  ");
        assert!(name.is_ok_and(|name| name.as_str() == "ops"));
    }

    #[test]
    fn reserved_names_are_flagged() {
        for reserved in RESERVED_ROLE_NAMES {
            let name = RoleName::new(*reserved);
            assert!(name.is_ok_and(|name| name.is_reserved()));
        }

        let name = RoleName::new("ops");
        assert!(name.is_ok_and(|name| !name.is_reserved()));
    }

    #[test]
    fn role_names_order_lexicographically() {
        let admin = RoleName::new("admin");
        let manager = RoleName::new("manager");
        let user = RoleName::new("user");

        assert!(admin.is_ok());
        assert!(manager.is_ok());
        assert!(user.is_ok());
        if let (Ok(admin), Ok(manager), Ok(user)) = (admin, manager, user) {
            assert!(admin < manager);
            assert!(manager < user);
        }
    }
}
