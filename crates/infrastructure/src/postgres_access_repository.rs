use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use rolegate_application::{
    AccessAdminRepository, AccessDirectory, CreateResourceTypeInput, CreateRoleInput,
    NewRoleAssignment,
};
use rolegate_core::{AppError, AppResult, UserId};
use rolegate_domain::{
    PermissionFlags, PermissionGrant, ResourceType, ResourceTypeName, Role, RoleAssignment,
    RoleName,
};

mod assignments;
mod grants;
mod resource_types;
mod roles;


/// PostgreSQL-backed repository for roles, resource types, grants, and
/// assignments.
#[derive(Clone)]
pub struct PostgresAccessRepository {
    pool: PgPool,
}

impl PostgresAccessRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct RoleRow {
    name: String,
    description: String,
    is_default: bool,
    created_at: DateTime<Utc>,
}

impl RoleRow {
    fn into_role(self) -> AppResult<Role> {
        let name = RoleName::new(self.name.as_str()).map_err(|error| {
            AppError::Internal(format!("failed to decode role '{}': {error}", self.name))
        })?;

        Ok(Role {
            name,
            description: self.description,
            is_default: self.is_default,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct ResourceTypeRow {
    name: String,
    description: String,
    is_active: bool,
    created_at: DateTime<Utc>,
}

impl ResourceTypeRow {
    fn into_resource_type(self) -> AppResult<ResourceType> {
        let name = ResourceTypeName::new(self.name.as_str()).map_err(|error| {
            AppError::Internal(format!(
                "failed to decode resource type '{}': {error}",
                self.name
            ))
        })?;

        Ok(ResourceType {
            name,
            description: self.description,
            is_active: self.is_active,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct GrantRow {
    role_name: String,
    resource_type: String,
    can_create: bool,
    can_read: bool,
    can_update: bool,
    can_delete: bool,
    can_manage_others: bool,
    created_at: DateTime<Utc>,
}

impl GrantRow {
    fn into_grant(self) -> AppResult<PermissionGrant> {
        let role_name = RoleName::new(self.role_name.as_str()).map_err(|error| {
            AppError::Internal(format!(
                "failed to decode grant role '{}': {error}",
                self.role_name
            ))
        })?;
        let resource_type = ResourceTypeName::new(self.resource_type.as_str()).map_err(|error| {
            AppError::Internal(format!(
                "failed to decode grant resource type '{}': {error}",
                self.resource_type
            ))
        })?;

        Ok(PermissionGrant {
            role_name,
            resource_type,
            flags: PermissionFlags {
                can_create: self.can_create,
                can_read: self.can_read,
                can_update: self.can_update,
                can_delete: self.can_delete,
                can_manage_others: self.can_manage_others,
            },
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct AssignmentRow {
    user_id: uuid::Uuid,
    role_name: String,
    assigned_by: Option<uuid::Uuid>,
    assigned_at: DateTime<Utc>,
    is_active: bool,
}

impl AssignmentRow {
    fn into_assignment(self) -> AppResult<RoleAssignment> {
        let role_name = RoleName::new(self.role_name.as_str()).map_err(|error| {
            AppError::Internal(format!(
                "failed to decode assignment role '{}': {error}",
                self.role_name
            ))
        })?;

        Ok(RoleAssignment {
            user_id: UserId::from_uuid(self.user_id),
            role_name,
            assigned_by: self.assigned_by.map(UserId::from_uuid),
            assigned_at: self.assigned_at,
            is_active: self.is_active,
        })
    }
}

fn is_unique_violation(error: &sqlx::Error) -> bool {
    matches!(
        error,
        sqlx::Error::Database(database_error)
            if database_error.code().as_deref() == Some("23505")
    )
}

fn is_foreign_key_violation(error: &sqlx::Error) -> bool {
    matches!(
        error,
        sqlx::Error::Database(database_error)
            if database_error.code().as_deref() == Some("23503")
    )
}

#[async_trait]
impl AccessDirectory for PostgresAccessRepository {
    async fn list_active_assignments(&self, user_id: UserId) -> AppResult<Vec<RoleAssignment>> {
        self.list_active_assignments_impl(user_id).await
    }

    async fn find_resource_type(
        &self,
        name: &ResourceTypeName,
    ) -> AppResult<Option<ResourceType>> {
        self.find_resource_type_impl(name).await
    }

    async fn find_grant(
        &self,
        role_name: &RoleName,
        resource_type: &ResourceTypeName,
    ) -> AppResult<Option<PermissionGrant>> {
        self.find_grant_impl(role_name, resource_type).await
    }

    async fn list_active_resource_types(&self) -> AppResult<Vec<ResourceType>> {
        self.list_active_resource_types_impl().await
    }
}

#[async_trait]
impl AccessAdminRepository for PostgresAccessRepository {
    async fn find_role(&self, name: &RoleName) -> AppResult<Option<Role>> {
        self.find_role_impl(name).await
    }

    async fn create_role(&self, input: CreateRoleInput) -> AppResult<Role> {
        self.create_role_impl(input).await
    }

    async fn list_roles(&self) -> AppResult<Vec<Role>> {
        self.list_roles_impl().await
    }

    async fn mark_default_role(&self, name: &RoleName) -> AppResult<()> {
        self.mark_default_role_impl(name).await
    }

    async fn find_resource_type(
        &self,
        name: &ResourceTypeName,
    ) -> AppResult<Option<ResourceType>> {
        self.find_resource_type_impl(name).await
    }

    async fn create_resource_type(
        &self,
        input: CreateResourceTypeInput,
    ) -> AppResult<ResourceType> {
        self.create_resource_type_impl(input).await
    }

    async fn list_resource_types(&self) -> AppResult<Vec<ResourceType>> {
        self.list_resource_types_impl().await
    }

    async fn deactivate_resource_type(&self, name: &ResourceTypeName) -> AppResult<()> {
        self.deactivate_resource_type_impl(name).await
    }

    async fn upsert_grant(
        &self,
        role_name: &RoleName,
        resource_type: &ResourceTypeName,
        flags: PermissionFlags,
    ) -> AppResult<PermissionGrant> {
        self.upsert_grant_impl(role_name, resource_type, flags).await
    }

    async fn create_grant_if_absent(
        &self,
        role_name: &RoleName,
        resource_type: &ResourceTypeName,
        flags: PermissionFlags,
    ) -> AppResult<()> {
        self.create_grant_if_absent_impl(role_name, resource_type, flags)
            .await
    }

    async fn find_grant(
        &self,
        role_name: &RoleName,
        resource_type: &ResourceTypeName,
    ) -> AppResult<Option<PermissionGrant>> {
        self.find_grant_impl(role_name, resource_type).await
    }

    async fn list_grants_for_role(&self, role_name: &RoleName) -> AppResult<Vec<PermissionGrant>> {
        self.list_grants_for_role_impl(role_name).await
    }

    async fn create_assignment(&self, input: NewRoleAssignment) -> AppResult<RoleAssignment> {
        self.create_assignment_impl(input).await
    }

    async fn list_assignments_for_user(&self, user_id: UserId) -> AppResult<Vec<RoleAssignment>> {
        self.list_assignments_for_user_impl(user_id).await
    }

    async fn deactivate_assignment(&self, user_id: UserId, role_name: &RoleName) -> AppResult<()> {
        self.deactivate_assignment_impl(user_id, role_name).await
    }

    async fn purge_assignment(&self, user_id: UserId, role_name: &RoleName) -> AppResult<()> {
        self.purge_assignment_impl(user_id, role_name).await
    }
}
