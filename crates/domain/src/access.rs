use std::str::FromStr;

use chrono::{DateTime, Utc};
use rolegate_core::AppError;
use serde::{Deserialize, Serialize};

use crate::{ResourceTypeName, RoleName};

/// Actions evaluated by the access decision engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceAction {
    /// Create a new resource of a type.
    Create,
    /// Read resources of a type.
    Read,
    /// Update an existing resource.
    Update,
    /// Delete an existing resource.
    Delete,
}

impl ResourceAction {
    /// Returns a stable storage value for this action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Read => "read",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }

    /// Returns all known actions.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[ResourceAction] = &[
            ResourceAction::Create,
            ResourceAction::Read,
            ResourceAction::Update,
            ResourceAction::Delete,
        ];

        ALL
    }
}

impl FromStr for ResourceAction {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "create" => Ok(Self::Create),
            "read" => Ok(Self::Read),
            "update" => Ok(Self::Update),
            "delete" => Ok(Self::Delete),
            _ => Err(AppError::Validation(format!(
                "unknown resource action '{value}'"
            ))),
        }
    }
}

/// The five boolean flags governing one role's access to one resource type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionFlags {
    /// Allows creating resources of the type.
    pub can_create: bool,
    /// Allows reading resources of the type.
    pub can_read: bool,
    /// Allows updating resources of the type.
    pub can_update: bool,
    /// Allows deleting resources of the type.
    pub can_delete: bool,
    /// Allows acting on resources owned by other users.
    pub can_manage_others: bool,
}

impl PermissionFlags {
    /// Returns flags with no access at all.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Returns the read-only flags used for freshly provisioned grants.
    #[must_use]
    pub fn read_only() -> Self {
        Self {
            can_read: true,
            ..Self::default()
        }
    }

    /// Returns flags with every capability enabled.
    #[must_use]
    pub fn full_access() -> Self {
        Self {
            can_create: true,
            can_read: true,
            can_update: true,
            can_delete: true,
            can_manage_others: true,
        }
    }

    /// Applies the manage-others consistency rule.
    ///
    /// A grant that may manage other users' resources must be able to read
    /// them, and must carry at least one of update/delete. Violations are
    /// corrected rather than rejected.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        if self.can_manage_others {
            self.can_read = true;
            if !self.can_update && !self.can_delete {
                self.can_update = true;
            }
        }

        self
    }

    /// Returns the base flag governing the action, ignoring ownership.
    #[must_use]
    pub fn base_flag(&self, action: ResourceAction) -> bool {
        match action {
            ResourceAction::Create => self.can_create,
            ResourceAction::Read => self.can_read,
            ResourceAction::Update => self.can_update,
            ResourceAction::Delete => self.can_delete,
        }
    }
}

/// Permission row for one (role, resource type) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionGrant {
    /// Role owning this grant.
    pub role_name: RoleName,
    /// Resource type this grant applies to.
    pub resource_type: ResourceTypeName,
    /// Effective permission flags.
    pub flags: PermissionFlags,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}
