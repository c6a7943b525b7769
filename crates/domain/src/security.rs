use serde::{Deserialize, Serialize};

/// Stable audit actions emitted by application use-cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// Emitted when a role is created.
    RoleCreated,
    /// Emitted when a role becomes the default role.
    RoleMarkedDefault,
    /// Emitted when a role is assigned to a user.
    RoleAssigned,
    /// Emitted when a role assignment is deactivated or purged.
    RoleUnassigned,
    /// Emitted when a permission grant is created or updated.
    GrantUpdated,
    /// Emitted when a resource type is created.
    ResourceTypeCreated,
    /// Emitted when a resource type is soft-deleted.
    ResourceTypeDeactivated,
}

impl AuditAction {
    /// Returns a stable storage value for this action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RoleCreated => "access.role.created",
            Self::RoleMarkedDefault => "access.role.marked_default",
            Self::RoleAssigned => "access.role.assigned",
            Self::RoleUnassigned => "access.role.unassigned",
            Self::GrantUpdated => "access.grant.updated",
            Self::ResourceTypeCreated => "access.resource_type.created",
            Self::ResourceTypeDeactivated => "access.resource_type.deactivated",
        }
    }
}
