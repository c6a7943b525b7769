use async_trait::async_trait;
use rolegate_core::{AppResult, UserId};
use rolegate_domain::{
    PermissionFlags, PermissionGrant, ResourceType, ResourceTypeName, Role, RoleAssignment,
    RoleName,
};

/// Input payload for creating roles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRoleInput {
    /// Unique role name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// Marks the role as the single account default.
    pub is_default: bool,
}

/// Input payload for creating resource types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateResourceTypeInput {
    /// Unique type name; case-normalized on save.
    pub name: String,
    /// Human-readable description.
    pub description: String,
}

/// Input payload for creating role assignments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRoleAssignment {
    /// Account receiving the role.
    pub user_id: UserId,
    /// Assigned role name.
    pub role_name: RoleName,
    /// Account performing the grant, when known.
    pub assigned_by: Option<UserId>,
}

/// Repository port for administrative access-control writes.
///
/// Uniqueness constraints (role name, resource type name, one row per
/// (role, resource type) grant and per (user, role) assignment) are enforced
/// by implementations; violations surface as [`rolegate_core::AppError::Conflict`].
#[async_trait]
pub trait AccessAdminRepository: Send + Sync {
    /// Finds a role by name.
    async fn find_role(&self, name: &RoleName) -> AppResult<Option<Role>>;

    /// Creates a role; when `is_default` is set, clears the flag from every
    /// other role in the same write.
    async fn create_role(&self, input: CreateRoleInput) -> AppResult<Role>;

    /// Lists all roles ordered by name.
    async fn list_roles(&self) -> AppResult<Vec<Role>>;

    /// Marks one role as the account default and clears the flag elsewhere.
    async fn mark_default_role(&self, name: &RoleName) -> AppResult<()>;

    /// Finds a resource type by normalized name.
    async fn find_resource_type(&self, name: &ResourceTypeName)
    -> AppResult<Option<ResourceType>>;

    /// Creates a resource type.
    async fn create_resource_type(&self, input: CreateResourceTypeInput)
    -> AppResult<ResourceType>;

    /// Lists all resource types, inactive ones included, ordered by name.
    async fn list_resource_types(&self) -> AppResult<Vec<ResourceType>>;

    /// Soft-deletes a resource type by clearing its active flag.
    async fn deactivate_resource_type(&self, name: &ResourceTypeName) -> AppResult<()>;

    /// Creates or replaces the grant row for one (role, resource type) pair.
    async fn upsert_grant(
        &self,
        role_name: &RoleName,
        resource_type: &ResourceTypeName,
        flags: PermissionFlags,
    ) -> AppResult<PermissionGrant>;

    /// Creates a grant row only when the pair has none yet.
    async fn create_grant_if_absent(
        &self,
        role_name: &RoleName,
        resource_type: &ResourceTypeName,
        flags: PermissionFlags,
    ) -> AppResult<()>;

    /// Finds the grant row for one (role, resource type) pair.
    async fn find_grant(
        &self,
        role_name: &RoleName,
        resource_type: &ResourceTypeName,
    ) -> AppResult<Option<PermissionGrant>>;

    /// Lists grant rows attached to one role, ordered by resource type.
    async fn list_grants_for_role(&self, role_name: &RoleName)
    -> AppResult<Vec<PermissionGrant>>;

    /// Creates a role assignment; an existing deactivated row for the same
    /// (user, role) pair is reactivated instead.
    async fn create_assignment(&self, input: NewRoleAssignment) -> AppResult<RoleAssignment>;

    /// Lists all assignments held by one user, deactivated rows included.
    async fn list_assignments_for_user(&self, user_id: UserId) -> AppResult<Vec<RoleAssignment>>;

    /// Deactivates an assignment without removing the row.
    async fn deactivate_assignment(&self, user_id: UserId, role_name: &RoleName) -> AppResult<()>;

    /// Hard-deletes an assignment row.
    async fn purge_assignment(&self, user_id: UserId, role_name: &RoleName) -> AppResult<()>;
}
