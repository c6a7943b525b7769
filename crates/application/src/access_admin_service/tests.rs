use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use rolegate_core::{AppError, AppResult, Principal, UserId, UserIdentity};
use rolegate_domain::{
    PermissionFlags, PermissionGrant, ProvisioningPolicy, ResourceType, ResourceTypeName, Role,
    RoleAssignment, RoleName,
};
use tokio::sync::Mutex;

use crate::{
    AccessAdminRepository, AuditEvent, AuditRepository, AuthorizationService,
    CreateResourceTypeInput, CreateRoleInput, EffectiveRoleCache, NewRoleAssignment,
};

use super::AccessAdminService;

#[derive(Default)]
struct FakeAccessStore {
    roles: Mutex<Vec<Role>>,
    resource_types: Mutex<Vec<ResourceType>>,
    grants: Mutex<Vec<PermissionGrant>>,
    assignments: Mutex<Vec<RoleAssignment>>,
}

impl FakeAccessStore {
    async fn seed_role(&self, name: &str) {
        self.roles.lock().await.push(Role {
            name: role_name(name),
            description: String::new(),
            is_default: false,
            created_at: Utc::now(),
        });
    }

    async fn seed_resource_type(&self, name: &str, is_active: bool) {
        self.resource_types.lock().await.push(ResourceType {
            name: type_name(name),
            description: String::new(),
            is_active,
            created_at: Utc::now(),
        });
    }

    async fn seed_assignment(&self, user_id: UserId, name: &str) {
        self.assignments.lock().await.push(RoleAssignment {
            user_id,
            role_name: role_name(name),
            assigned_by: None,
            assigned_at: Utc::now(),
            is_active: true,
        });
    }
}

#[async_trait]
impl crate::AccessDirectory for FakeAccessStore {
    async fn list_active_assignments(&self, user_id: UserId) -> AppResult<Vec<RoleAssignment>> {
        Ok(self
            .assignments
            .lock()
            .await
            .iter()
            .filter(|assignment| assignment.user_id == user_id && assignment.is_active)
            .cloned()
            .collect())
    }

    async fn find_resource_type(
        &self,
        name: &ResourceTypeName,
    ) -> AppResult<Option<ResourceType>> {
        Ok(self
            .resource_types
            .lock()
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
            .lock()
            .await
            .iter()
            .find(|grant| &grant.role_name == role_name && &grant.resource_type == resource_type)
            .cloned())
    }

    async fn list_active_resource_types(&self) -> AppResult<Vec<ResourceType>> {
        Ok(self
            .resource_types
            .lock()
            .await
            .iter()
            .filter(|resource_type| resource_type.is_active)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl AccessAdminRepository for FakeAccessStore {
    async fn find_role(&self, name: &RoleName) -> AppResult<Option<Role>> {
        Ok(self
            .roles
            .lock()
            .await
            .iter()
            .find(|role| &role.name == name)
            .cloned())
    }

    async fn create_role(&self, input: CreateRoleInput) -> AppResult<Role> {
        let name = RoleName::new(input.name.as_str())?;
        let mut roles = self.roles.lock().await;

        if roles.iter().any(|role| role.name == name) {
            return Err(AppError::Conflict(format!(
                "role '{name}' already exists"
            )));
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
        let mut roles = self.roles.lock().await.clone();
        roles.sort_by(|left, right| left.name.cmp(&right.name));
        Ok(roles)
    }

    async fn mark_default_role(&self, name: &RoleName) -> AppResult<()> {
        let mut roles = self.roles.lock().await;

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
            .lock()
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
        let mut resource_types = self.resource_types.lock().await;

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
        let mut resource_types = self.resource_types.lock().await.clone();
        resource_types.sort_by(|left, right| left.name.cmp(&right.name));
        Ok(resource_types)
    }

    async fn deactivate_resource_type(&self, name: &ResourceTypeName) -> AppResult<()> {
        let mut resource_types = self.resource_types.lock().await;
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
        let mut grants = self.grants.lock().await;

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
        let mut grants = self.grants.lock().await;

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
            .lock()
            .await
            .iter()
            .find(|grant| &grant.role_name == role_name && &grant.resource_type == resource_type)
            .cloned())
    }

    async fn list_grants_for_role(&self, role_name: &RoleName) -> AppResult<Vec<PermissionGrant>> {
        let mut grants: Vec<PermissionGrant> = self
            .grants
            .lock()
            .await
            .iter()
            .filter(|grant| &grant.role_name == role_name)
            .cloned()
            .collect();
        grants.sort_by(|left, right| left.resource_type.cmp(&right.resource_type));
        Ok(grants)
    }

    async fn create_assignment(&self, input: NewRoleAssignment) -> AppResult<RoleAssignment> {
        let mut assignments = self.assignments.lock().await;

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
        Ok(self
            .assignments
            .lock()
            .await
            .iter()
            .filter(|assignment| assignment.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn deactivate_assignment(&self, user_id: UserId, role_name: &RoleName) -> AppResult<()> {
        let mut assignments = self.assignments.lock().await;
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
        let mut assignments = self.assignments.lock().await;
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

#[derive(Default)]
struct FakeEffectiveRoleCache {
    entries: Mutex<std::collections::HashMap<UserId, RoleName>>,
    invalidations: Mutex<Vec<UserId>>,
}

#[async_trait]
impl EffectiveRoleCache for FakeEffectiveRoleCache {
    async fn get_effective_role(&self, user_id: UserId) -> AppResult<Option<RoleName>> {
        Ok(self.entries.lock().await.get(&user_id).cloned())
    }

    async fn set_effective_role(
        &self,
        user_id: UserId,
        role_name: RoleName,
        _ttl_seconds: u32,
    ) -> AppResult<()> {
        self.entries.lock().await.insert(user_id, role_name);
        Ok(())
    }

    async fn invalidate(&self, user_id: UserId) -> AppResult<()> {
        self.entries.lock().await.remove(&user_id);
        self.invalidations.lock().await.push(user_id);
        Ok(())
    }
}

#[derive(Default)]
struct FakeAuditRepository {
    events: Mutex<Vec<AuditEvent>>,
}

#[async_trait]
impl AuditRepository for FakeAuditRepository {
    async fn append_event(&self, event: AuditEvent) -> AppResult<()> {
        self.events.lock().await.push(event);
        Ok(())
    }
}

fn role_name(name: &str) -> RoleName {
    match RoleName::new(name) {
        Ok(name) => name,
        Err(error) => panic!("invalid role name in test: {error}"),
    }
}

fn type_name(name: &str) -> ResourceTypeName {
    match ResourceTypeName::new(name) {
        Ok(name) => name,
        Err(error) => panic!("invalid resource type name in test: {error}"),
    }
}

fn authenticated(user_id: UserId) -> Principal {
    Principal::Authenticated(UserIdentity::new(user_id, "Test User", None))
}

struct Harness {
    service: AccessAdminService,
    store: Arc<FakeAccessStore>,
    cache: Arc<FakeEffectiveRoleCache>,
    audit_repository: Arc<FakeAuditRepository>,
    admin: Principal,
    admin_id: UserId,
}

async fn harness() -> Harness {
    harness_with_policy(ProvisioningPolicy::default()).await
}

async fn harness_with_policy(policy: ProvisioningPolicy) -> Harness {
    let store = Arc::new(FakeAccessStore::default());
    let cache = Arc::new(FakeEffectiveRoleCache::default());
    let audit_repository = Arc::new(FakeAuditRepository::default());

    let admin_id = UserId::new();
    store.seed_role("admin").await;
    store.seed_assignment(admin_id, "admin").await;

    let authorization_service =
        AuthorizationService::new(store.clone(), cache.clone());
    let service = AccessAdminService::new(
        authorization_service,
        store.clone(),
        audit_repository.clone(),
        cache.clone(),
    )
    .with_provisioning_policy(policy);

    Harness {
        service,
        store,
        cache,
        audit_repository,
        admin: authenticated(admin_id),
        admin_id,
    }
}

#[tokio::test]
async fn create_role_requires_admin_actor() {
    let harness = harness().await;
    let outsider_id = UserId::new();
    harness.store.seed_role("user").await;
    harness.store.seed_assignment(outsider_id, "user").await;

    let result = harness
        .service
        .create_role(
            &authenticated(outsider_id),
            CreateRoleInput {
                name: "ops".to_owned(),
                description: String::new(),
                is_default: false,
            },
        )
        .await;

    assert!(matches!(result, Err(AppError::Forbidden(_))));
}

#[tokio::test]
async fn create_role_rejects_guest_actor() {
    let harness = harness().await;

    let result = harness
        .service
        .create_role(
            &Principal::Guest,
            CreateRoleInput {
                name: "ops".to_owned(),
                description: String::new(),
                is_default: false,
            },
        )
        .await;

    assert!(matches!(result, Err(AppError::Unauthorized(_))));
}

#[tokio::test]
async fn create_role_rejects_reserved_names() {
    let harness = harness().await;

    let result = harness
        .service
        .create_role(
            &harness.admin,
            CreateRoleInput {
                name: "guest".to_owned(),
                description: String::new(),
                is_default: false,
            },
        )
        .await;

    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn create_role_provisions_grants_for_active_types_only() {
    let harness = harness().await;
    harness.store.seed_resource_type("product", true).await;
    harness.store.seed_resource_type("order", false).await;

    let result = harness
        .service
        .create_role(
            &harness.admin,
            CreateRoleInput {
                name: "ops".to_owned(),
                description: String::new(),
                is_default: false,
            },
        )
        .await;
    assert!(result.is_ok());

    let product_grant = harness
        .store
        .find_grant(&role_name("ops"), &type_name("product"))
        .await;
    let order_grant = harness
        .store
        .find_grant(&role_name("ops"), &type_name("order"))
        .await;

    assert!(
        matches!(product_grant, Ok(Some(grant)) if grant.flags == PermissionFlags::read_only())
    );
    assert!(matches!(order_grant, Ok(None)));
}

#[tokio::test]
async fn duplicate_role_name_is_a_conflict() {
    let harness = harness().await;

    let first = harness
        .service
        .create_role(
            &harness.admin,
            CreateRoleInput {
                name: "ops".to_owned(),
                description: String::new(),
                is_default: false,
            },
        )
        .await;
    let second = harness
        .service
        .create_role(
            &harness.admin,
            CreateRoleInput {
                name: "ops".to_owned(),
                description: String::new(),
                is_default: false,
            },
        )
        .await;

    assert!(first.is_ok());
    assert!(matches!(second, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn marking_a_default_role_clears_the_flag_elsewhere() {
    let harness = harness().await;

    let first = harness
        .service
        .create_role(
            &harness.admin,
            CreateRoleInput {
                name: "ops".to_owned(),
                description: String::new(),
                is_default: true,
            },
        )
        .await;
    assert!(first.is_ok());

    let marked = harness
        .service
        .mark_default_role(&harness.admin, "admin")
        .await;
    assert!(marked.is_ok());

    let roles = harness.store.list_roles().await;
    assert!(matches!(
        roles,
        Ok(roles) if roles.iter().filter(|role| role.is_default).count() == 1
            && roles.iter().any(|role| role.name.as_str() == "admin" && role.is_default)
    ));
}

#[tokio::test]
async fn create_resource_type_lowercases_the_name() {
    let harness = harness().await;

    let created = harness
        .service
        .create_resource_type(
            &harness.admin,
            CreateResourceTypeInput {
                name: "Product".to_owned(),
                description: String::new(),
            },
        )
        .await;

    assert!(matches!(created, Ok(resource_type) if resource_type.name.as_str() == "product"));
}

#[tokio::test]
async fn create_resource_type_provisions_uniform_read_only_defaults() {
    let harness = harness().await;
    harness.store.seed_role("user").await;

    let created = harness
        .service
        .create_resource_type(
            &harness.admin,
            CreateResourceTypeInput {
                name: "order".to_owned(),
                description: String::new(),
            },
        )
        .await;
    assert!(created.is_ok());

    let admin_grant = harness
        .store
        .find_grant(&role_name("admin"), &type_name("order"))
        .await;
    let user_grant = harness
        .store
        .find_grant(&role_name("user"), &type_name("order"))
        .await;

    assert!(matches!(admin_grant, Ok(Some(grant)) if grant.flags == PermissionFlags::read_only()));
    assert!(matches!(user_grant, Ok(Some(grant)) if grant.flags == PermissionFlags::read_only()));
}

#[tokio::test]
async fn admin_full_access_policy_provisions_full_admin_grant() {
    let harness = harness_with_policy(ProvisioningPolicy::AdminFullAccess).await;
    harness.store.seed_role("user").await;

    let created = harness
        .service
        .create_resource_type(
            &harness.admin,
            CreateResourceTypeInput {
                name: "order".to_owned(),
                description: String::new(),
            },
        )
        .await;
    assert!(created.is_ok());

    let admin_grant = harness
        .store
        .find_grant(&role_name("admin"), &type_name("order"))
        .await;
    let user_grant = harness
        .store
        .find_grant(&role_name("user"), &type_name("order"))
        .await;

    assert!(
        matches!(admin_grant, Ok(Some(grant)) if grant.flags == PermissionFlags::full_access())
    );
    assert!(matches!(user_grant, Ok(Some(grant)) if grant.flags == PermissionFlags::read_only()));
}

#[tokio::test]
async fn every_role_and_type_pair_gets_exactly_one_grant() {
    let harness = harness().await;

    let role = harness
        .service
        .create_role(
            &harness.admin,
            CreateRoleInput {
                name: "ops".to_owned(),
                description: String::new(),
                is_default: false,
            },
        )
        .await;
    let resource_type = harness
        .service
        .create_resource_type(
            &harness.admin,
            CreateResourceTypeInput {
                name: "order".to_owned(),
                description: String::new(),
            },
        )
        .await;
    assert!(role.is_ok());
    assert!(resource_type.is_ok());

    let grants = harness.store.grants.lock().await;
    let pair_count = grants
        .iter()
        .filter(|grant| {
            grant.role_name.as_str() == "ops" && grant.resource_type.as_str() == "order"
        })
        .count();
    assert_eq!(pair_count, 1);
}

#[tokio::test]
async fn set_grant_applies_the_manage_others_invariant() {
    let harness = harness().await;
    harness.store.seed_resource_type("product", true).await;

    let flags = PermissionFlags {
        can_manage_others: true,
        ..PermissionFlags::none()
    };
    let stored = harness
        .service
        .set_grant(&harness.admin, "admin", "product", flags)
        .await;

    assert!(matches!(
        stored,
        Ok(grant) if grant.flags.can_read && (grant.flags.can_update || grant.flags.can_delete)
    ));
}

#[tokio::test]
async fn set_grant_is_idempotent() {
    let harness = harness().await;
    harness.store.seed_resource_type("product", true).await;

    let flags = PermissionFlags {
        can_create: true,
        can_read: true,
        ..PermissionFlags::none()
    };
    let first = harness
        .service
        .set_grant(&harness.admin, "admin", "product", flags)
        .await;
    let second = harness
        .service
        .set_grant(&harness.admin, "admin", "product", flags)
        .await;

    assert!(first.is_ok());
    assert!(second.is_ok());

    let grants = harness.store.grants.lock().await;
    let rows: Vec<_> = grants
        .iter()
        .filter(|grant| {
            grant.role_name.as_str() == "admin" && grant.resource_type.as_str() == "product"
        })
        .collect();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].flags, flags);
}

#[tokio::test]
async fn set_grant_for_unknown_role_is_not_found() {
    let harness = harness().await;
    harness.store.seed_resource_type("product", true).await;

    let result = harness
        .service
        .set_grant(
            &harness.admin,
            "ghost",
            "product",
            PermissionFlags::read_only(),
        )
        .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn assign_role_invalidates_the_cached_effective_role() {
    let harness = harness().await;
    harness.store.seed_role("user").await;
    let subject_id = UserId::new();

    let assigned = harness
        .service
        .assign_role(&harness.admin, subject_id, "user")
        .await;
    assert!(assigned.is_ok());
    assert!(
        harness
            .cache
            .invalidations
            .lock()
            .await
            .contains(&subject_id)
    );
}

#[tokio::test]
async fn assign_role_records_the_acting_admin_as_assigner() {
    let harness = harness().await;
    harness.store.seed_role("user").await;
    let subject_id = UserId::new();

    let assigned = harness
        .service
        .assign_role(&harness.admin, subject_id, "user")
        .await;
    assert!(matches!(
        assigned,
        Ok(assignment) if assignment.assigned_by == Some(harness.admin_id)
    ));
}

#[tokio::test]
async fn duplicate_active_assignment_is_a_conflict() {
    let harness = harness().await;
    harness.store.seed_role("user").await;
    let subject_id = UserId::new();

    let first = harness
        .service
        .assign_role(&harness.admin, subject_id, "user")
        .await;
    let second = harness
        .service
        .assign_role(&harness.admin, subject_id, "user")
        .await;

    assert!(first.is_ok());
    assert!(matches!(second, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn unassign_role_deactivates_but_keeps_the_row() {
    let harness = harness().await;
    harness.store.seed_role("user").await;
    let subject_id = UserId::new();

    let assigned = harness
        .service
        .assign_role(&harness.admin, subject_id, "user")
        .await;
    let unassigned = harness
        .service
        .unassign_role(&harness.admin, subject_id, "user")
        .await;
    assert!(assigned.is_ok());
    assert!(unassigned.is_ok());

    let assignments = harness.store.list_assignments_for_user(subject_id).await;
    assert!(matches!(
        assignments,
        Ok(assignments) if assignments.len() == 1 && !assignments[0].is_active
    ));
}

#[tokio::test]
async fn reassigning_a_deactivated_role_reactivates_it() {
    let harness = harness().await;
    harness.store.seed_role("user").await;
    let subject_id = UserId::new();

    let assigned = harness
        .service
        .assign_role(&harness.admin, subject_id, "user")
        .await;
    let unassigned = harness
        .service
        .unassign_role(&harness.admin, subject_id, "user")
        .await;
    let reassigned = harness
        .service
        .assign_role(&harness.admin, subject_id, "user")
        .await;
    assert!(assigned.is_ok());
    assert!(unassigned.is_ok());
    assert!(reassigned.is_ok());

    let assignments = harness.store.list_assignments_for_user(subject_id).await;
    assert!(matches!(
        assignments,
        Ok(assignments) if assignments.len() == 1 && assignments[0].is_active
    ));
}

#[tokio::test]
async fn purge_assignment_removes_the_row() {
    let harness = harness().await;
    harness.store.seed_role("user").await;
    let subject_id = UserId::new();

    let assigned = harness
        .service
        .assign_role(&harness.admin, subject_id, "user")
        .await;
    let purged = harness
        .service
        .purge_assignment(&harness.admin, subject_id, "user")
        .await;
    assert!(assigned.is_ok());
    assert!(purged.is_ok());

    let assignments = harness.store.list_assignments_for_user(subject_id).await;
    assert!(matches!(assignments, Ok(assignments) if assignments.is_empty()));
}

#[tokio::test]
async fn ensure_default_assignment_creates_the_user_role_on_first_reference() {
    let harness = harness().await;
    harness.store.seed_resource_type("product", true).await;
    let new_user_id = UserId::new();

    let result = harness.service.ensure_default_assignment(new_user_id).await;
    assert!(result.is_ok());

    let role = harness.store.find_role(&role_name("user")).await;
    assert!(matches!(role, Ok(Some(_))));

    let grant = harness
        .store
        .find_grant(&role_name("user"), &type_name("product"))
        .await;
    assert!(matches!(grant, Ok(Some(grant)) if grant.flags == PermissionFlags::read_only()));

    let assignments = harness.store.list_assignments_for_user(new_user_id).await;
    assert!(matches!(
        assignments,
        Ok(assignments) if assignments.len() == 1
            && assignments[0].role_name.as_str() == "user"
            && assignments[0].assigned_by == Some(new_user_id)
    ));
}

#[tokio::test]
async fn ensure_default_assignment_skips_users_with_existing_assignments() {
    let harness = harness().await;
    harness.store.seed_role("manager").await;
    let user_id = UserId::new();
    harness.store.seed_assignment(user_id, "manager").await;

    let result = harness.service.ensure_default_assignment(user_id).await;
    assert!(result.is_ok());

    let assignments = harness.store.list_assignments_for_user(user_id).await;
    assert!(matches!(
        assignments,
        Ok(assignments) if assignments.len() == 1
            && assignments[0].role_name.as_str() == "manager"
    ));
}

#[tokio::test]
async fn listings_are_open_to_managers_but_not_plain_users() {
    let harness = harness().await;
    harness.store.seed_role("manager").await;
    harness.store.seed_role("user").await;
    let manager_id = UserId::new();
    let user_id = UserId::new();
    harness.store.seed_assignment(manager_id, "manager").await;
    harness.store.seed_assignment(user_id, "user").await;

    let manager_view = harness.service.list_roles(&authenticated(manager_id)).await;
    let user_view = harness.service.list_roles(&authenticated(user_id)).await;

    assert!(manager_view.is_ok());
    assert!(matches!(user_view, Err(AppError::Forbidden(_))));
}

#[tokio::test]
async fn administrative_mutations_append_audit_events() {
    let harness = harness().await;

    let role = harness
        .service
        .create_role(
            &harness.admin,
            CreateRoleInput {
                name: "ops".to_owned(),
                description: String::new(),
                is_default: false,
            },
        )
        .await;
    assert!(role.is_ok());

    let resource_type = harness
        .service
        .create_resource_type(
            &harness.admin,
            CreateResourceTypeInput {
                name: "order".to_owned(),
                description: String::new(),
            },
        )
        .await;
    assert!(resource_type.is_ok());

    let events = harness.audit_repository.events.lock().await;
    assert_eq!(events.len(), 2);
    assert!(events.iter().all(|event| event.actor == harness.admin_id.to_string()));
}
