use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use rolegate_application::{
    AccessAdminRepository, AccessDirectory, CreateResourceTypeInput, CreateRoleInput,
    NewRoleAssignment,
};
use rolegate_core::{AppError, AppResult, UserId};
use rolegate_domain::{
    PermissionFlags, PermissionGrant, ResourceType, ResourceTypeName, Role, RoleAssignment,
    RoleName,
};

/// In-memory access repository implementation.
///
/// Backs tests and local development; state lives for the process lifetime.
#[derive(Debug, Default)]
pub struct InMemoryAccessRepository {
    roles: RwLock<Vec<Role>>,
    resource_types: RwLock<Vec<ResourceType>>,
    grants: RwLock<Vec<PermissionGrant>>,
    assignments: RwLock<Vec<RoleAssignment>>,
}

impl InMemoryAccessRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccessDirectory for InMemoryAccessRepository {
    async fn list_active_assignments(&self, user_id: UserId) -> AppResult<Vec<RoleAssignment>> {
        let mut assignments: Vec<RoleAssignment> = self
            .assignments
            .read()
            .await
            .iter()
            .filter(|assignment| assignment.user_id == user_id && assignment.is_active)
            .cloned()
            .collect();
        assignments.sort_by(|left, right| left.role_name.cmp(&right.role_name));
        Ok(assignments)
    }

    async fn find_resource_type(
        &self,
        name: &ResourceTypeName,
    ) -> AppResult<Option<ResourceType>> {
        Ok(self
            .resource_types
            .read()
            .await
            .iter()
            .find(|resource_type| &resource_type.name == name)
            .cloned())
    }

    async fn find_grant(
        &self,
        role_name: &RoleName,
        resource_type: &ResourceTypeName,
    ) -> AppResult<Option<PermissionGrant>> {
        Ok(self
            .grants
            .read()
            .await
            .iter()
            .find(|grant| &grant.role_name == role_name && &grant.resource_type == resource_type)
            .cloned())
    }

    async fn list_active_resource_types(&self) -> AppResult<Vec<ResourceType>> {
        let mut resource_types: Vec<ResourceType> = self
            .resource_types
            .read()
            .await
            .iter()
            .filter(|resource_type| resource_type.is_active)
            .cloned()
            .collect();
        resource_types.sort_by(|left, right| left.name.cmp(&right.name));
        Ok(resource_types)
    }
}

#[async_trait]
impl AccessAdminRepository for InMemoryAccessRepository {
    async fn find_role(&self, name: &RoleName) -> AppResult<Option<Role>> {
        Ok(self
            .roles
            .read()
            .await
            .iter()
            .find(|role| &role.name == name)
            .cloned())
    }

    async fn create_role(&self, input: CreateRoleInput) -> AppResult<Role> {
        let name = RoleName::new(input.name.as_str())?;
        let mut roles = self.roles.write().await;

        if roles.iter().any(|role| role.name == name) {
            return Err(AppError::Conflict(format!("role '{name}' already exists")));
        }

        if input.is_default {
            for role in roles.iter_mut() {
                role.is_default = false;
            }
        }

        let role = Role {
            name,
            description: input.description,
            is_default: input.is_default,
            created_at: Utc::now(),
        };
        roles.push(role.clone());
        Ok(role)
    }

    async fn list_roles(&self) -> AppResult<Vec<Role>> {
        let mut roles = self.roles.read().await.clone();
        roles.sort_by(|left, right| left.name.cmp(&right.name));
        Ok(roles)
    }

    async fn mark_default_role(&self, name: &RoleName) -> AppResult<()> {
        let mut roles = self.roles.write().await;

        if !roles.iter().any(|role| &role.name == name) {
            return Err(AppError::NotFound(format!("role '{name}' was not found")));
        }

        for role in roles.iter_mut() {
            role.is_default = &role.name == name;
        }
        Ok(())
    }

    async fn find_resource_type(
        &self,
        name: &ResourceTypeName,
    ) -> AppResult<Option<ResourceType>> {
        Ok(self
            .resource_types
            .read()
            .await
            .iter()
            .find(|resource_type| &resource_type.name == name)
            .cloned())
    }

    async fn create_resource_type(
        &self,
        input: CreateResourceTypeInput,
    ) -> AppResult<ResourceType> {
        let name = ResourceTypeName::new(input.name.as_str())?;
        let mut resource_types = self.resource_types.write().await;

        if resource_types
            .iter()
            .any(|resource_type| resource_type.name == name)
        {
            return Err(AppError::Conflict(format!(
                "resource type '{name}' already exists"
            )));
        }

        let resource_type = ResourceType {
            name,
            description: input.description,
            is_active: true,
            created_at: Utc::now(),
        };
        resource_types.push(resource_type.clone());
        Ok(resource_type)
    }

    async fn list_resource_types(&self) -> AppResult<Vec<ResourceType>> {
        let mut resource_types = self.resource_types.read().await.clone();
        resource_types.sort_by(|left, right| left.name.cmp(&right.name));
        Ok(resource_types)
    }

    async fn deactivate_resource_type(&self, name: &ResourceTypeName) -> AppResult<()> {
        let mut resource_types = self.resource_types.write().await;
        let Some(resource_type) = resource_types
            .iter_mut()
            .find(|resource_type| &resource_type.name == name)
        else {
            return Err(AppError::NotFound(format!(
                "resource type '{name}' was not found"
            )));
        };

        resource_type.is_active = false;
        Ok(())
    }

    async fn upsert_grant(
        &self,
        role_name: &RoleName,
        resource_type: &ResourceTypeName,
        flags: PermissionFlags,
    ) -> AppResult<PermissionGrant> {
        let mut grants = self.grants.write().await;

        if let Some(grant) = grants.iter_mut().find(|grant| {
            &grant.role_name == role_name && &grant.resource_type == resource_type
        }) {
            grant.flags = flags;
            return Ok(grant.clone());
        }

        let grant = PermissionGrant {
            role_name: role_name.clone(),
            resource_type: resource_type.clone(),
            flags,
            created_at: Utc::now(),
        };
        grants.push(grant.clone());
        Ok(grant)
    }

    async fn create_grant_if_absent(
        &self,
        role_name: &RoleName,
        resource_type: &ResourceTypeName,
        flags: PermissionFlags,
    ) -> AppResult<()> {
        let mut grants = self.grants.write().await;

        let exists = grants.iter().any(|grant| {
            &grant.role_name == role_name && &grant.resource_type == resource_type
        });
        if !exists {
            grants.push(PermissionGrant {
                role_name: role_name.clone(),
                resource_type: resource_type.clone(),
                flags,
                created_at: Utc::now(),
            });
        }
        Ok(())
    }

    async fn find_grant(
        &self,
        role_name: &RoleName,
        resource_type: &ResourceTypeName,
    ) -> AppResult<Option<PermissionGrant>> {
        Ok(self
            .grants
            .read()
            .await
            .iter()
            .find(|grant| &grant.role_name == role_name && &grant.resource_type == resource_type)
            .cloned())
    }

    async fn list_grants_for_role(&self, role_name: &RoleName) -> AppResult<Vec<PermissionGrant>> {
        let mut grants: Vec<PermissionGrant> = self
            .grants
            .read()
            .await
            .iter()
            .filter(|grant| &grant.role_name == role_name)
            .cloned()
            .collect();
        grants.sort_by(|left, right| left.resource_type.cmp(&right.resource_type));
        Ok(grants)
    }

    async fn create_assignment(&self, input: NewRoleAssignment) -> AppResult<RoleAssignment> {
        let mut assignments = self.assignments.write().await;

        if let Some(assignment) = assignments.iter_mut().find(|assignment| {
            assignment.user_id == input.user_id && assignment.role_name == input.role_name
        }) {
            if assignment.is_active {
                return Err(AppError::Conflict(format!(
                    "user '{}' already holds role '{}'",
                    input.user_id, input.role_name
                )));
            }

            assignment.is_active = true;
            assignment.assigned_by = input.assigned_by;
            assignment.assigned_at = Utc::now();
            return Ok(assignment.clone());
        }

        let assignment = RoleAssignment {
            user_id: input.user_id,
            role_name: input.role_name,
            assigned_by: input.assigned_by,
            assigned_at: Utc::now(),
            is_active: true,
        };
        assignments.push(assignment.clone());
        Ok(assignment)
    }

    async fn list_assignments_for_user(&self, user_id: UserId) -> AppResult<Vec<RoleAssignment>> {
        let mut assignments: Vec<RoleAssignment> = self
            .assignments
            .read()
            .await
            .iter()
            .filter(|assignment| assignment.user_id == user_id)
            .cloned()
            .collect();
        assignments.sort_by(|left, right| left.role_name.cmp(&right.role_name));
        Ok(assignments)
    }

    async fn deactivate_assignment(&self, user_id: UserId, role_name: &RoleName) -> AppResult<()> {
        let mut assignments = self.assignments.write().await;
        let Some(assignment) = assignments.iter_mut().find(|assignment| {
            assignment.user_id == user_id && &assignment.role_name == role_name
        }) else {
            return Err(AppError::NotFound(format!(
                "assignment '{user_id}:{role_name}' was not found"
            )));
        };

        assignment.is_active = false;
        Ok(())
    }

    async fn purge_assignment(&self, user_id: UserId, role_name: &RoleName) -> AppResult<()> {
        let mut assignments = self.assignments.write().await;
        let before = assignments.len();
        assignments.retain(|assignment| {
            !(assignment.user_id == user_id && &assignment.role_name == role_name)
        });

        if assignments.len() == before {
            return Err(AppError::NotFound(format!(
                "assignment '{user_id}:{role_name}' was not found"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rolegate_application::{AccessAdminRepository, CreateRoleInput, NewRoleAssignment};
    use rolegate_core::{AppError, UserId};
    use rolegate_domain::RoleName;

    use super::InMemoryAccessRepository;

    fn role_name(value: &str) -> RoleName {
        match RoleName::new(value) {
            Ok(name) => name,
            Err(error) => panic!("invalid role name in test: {error}"),
        }
    }

    #[tokio::test]
    async fn duplicate_role_is_a_conflict() {
        let repository = InMemoryAccessRepository::new();

        let first = repository
            .create_role(CreateRoleInput {
                name: "ops".to_owned(),
                description: String::new(),
                is_default: false,
            })
            .await;
        let second = repository
            .create_role(CreateRoleInput {
                name: "ops".to_owned(),
                description: String::new(),
                is_default: false,
            })
            .await;

        assert!(first.is_ok());
        assert!(matches!(second, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn creating_a_default_role_clears_previous_defaults() {
        let repository = InMemoryAccessRepository::new();

        let first = repository
            .create_role(CreateRoleInput {
                name: "first".to_owned(),
                description: String::new(),
                is_default: true,
            })
            .await;
        let second = repository
            .create_role(CreateRoleInput {
                name: "second".to_owned(),
                description: String::new(),
                is_default: true,
            })
            .await;
        assert!(first.is_ok());
        assert!(second.is_ok());

        let roles = repository.list_roles().await;
        assert!(matches!(
            roles,
            Ok(roles) if roles.iter().filter(|role| role.is_default).count() == 1
                && roles.iter().any(|role| role.name.as_str() == "second" && role.is_default)
        ));
    }

    #[tokio::test]
    async fn deactivated_assignments_drop_out_of_the_active_listing() {
        let repository = InMemoryAccessRepository::new();
        let user_id = UserId::new();

        let created_role = repository
            .create_role(CreateRoleInput {
                name: "viewer".to_owned(),
                description: String::new(),
                is_default: false,
            })
            .await;
        assert!(created_role.is_ok());

        let assigned = repository
            .create_assignment(NewRoleAssignment {
                user_id,
                role_name: role_name("viewer"),
                assigned_by: None,
            })
            .await;
        assert!(assigned.is_ok());

        let deactivated = repository
            .deactivate_assignment(user_id, &role_name("viewer"))
            .await;
        assert!(deactivated.is_ok());

        let active =
            rolegate_application::AccessDirectory::list_active_assignments(&repository, user_id)
                .await;
        assert!(matches!(active, Ok(assignments) if assignments.is_empty()));

        let all = repository.list_assignments_for_user(user_id).await;
        assert!(matches!(all, Ok(assignments) if assignments.len() == 1));
    }
}
