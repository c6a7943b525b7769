use std::sync::Arc;

use async_trait::async_trait;
use rolegate_core::{AppError, AppResult, Principal, ResourceOwner, UserId};
use rolegate_domain::{
    ADMIN_ROLE_NAME, PermissionGrant, ResourceAction, ResourceType, ResourceTypeName,
    RoleAssignment, RoleName,
};
use tracing::{debug, warn};

/// How long a resolved effective role stays cached per user.
pub const EFFECTIVE_ROLE_CACHE_TTL_SECONDS: u32 = 300;

/// Read-only repository port for permission checks.
#[async_trait]
pub trait AccessDirectory: Send + Sync {
    /// Lists the active role assignments held by one user.
    async fn list_active_assignments(&self, user_id: UserId) -> AppResult<Vec<RoleAssignment>>;

    /// Finds a resource type by normalized name.
    async fn find_resource_type(&self, name: &ResourceTypeName)
    -> AppResult<Option<ResourceType>>;

    /// Finds the grant row for one (role, resource type) pair.
    async fn find_grant(
        &self,
        role_name: &RoleName,
        resource_type: &ResourceTypeName,
    ) -> AppResult<Option<PermissionGrant>>;

    /// Lists resource types whose active flag is set, ordered by name.
    async fn list_active_resource_types(&self) -> AppResult<Vec<ResourceType>>;
}

/// Cache port for per-user effective-role lookups.
///
/// The cache is a best-effort accelerator: every read may miss without
/// affecting correctness, and entries expire on their own after the ttl.
#[async_trait]
pub trait EffectiveRoleCache: Send + Sync {
    /// Returns the cached effective role for one user.
    async fn get_effective_role(&self, user_id: UserId) -> AppResult<Option<RoleName>>;

    /// Stores the effective role for one user with a bounded lifetime.
    async fn set_effective_role(
        &self,
        user_id: UserId,
        role_name: RoleName,
        ttl_seconds: u32,
    ) -> AppResult<()>;

    /// Drops the cached entry for one user.
    async fn invalidate(&self, user_id: UserId) -> AppResult<()>;
}

/// Application service answering allow/deny questions for resource access.
#[derive(Clone)]
pub struct AuthorizationService {
    directory: Arc<dyn AccessDirectory>,
    cache: Arc<dyn EffectiveRoleCache>,
    cache_ttl_seconds: u32,
}

impl AuthorizationService {
    /// Creates a service from a directory and a cache implementation.
    #[must_use]
    pub fn new(directory: Arc<dyn AccessDirectory>, cache: Arc<dyn EffectiveRoleCache>) -> Self {
        Self {
            directory,
            cache,
            cache_ttl_seconds: EFFECTIVE_ROLE_CACHE_TTL_SECONDS,
        }
    }

    /// Overrides the effective-role cache lifetime.
    #[must_use]
    pub fn with_cache_ttl(mut self, ttl_seconds: u32) -> Self {
        self.cache_ttl_seconds = ttl_seconds;
        self
    }

    /// Resolves the single role used for this principal's permission checks.
    ///
    /// Users holding several active assignments get the lexicographically
    /// first role name. The pick is a deterministic tie-break, not a
    /// capability ranking: `admin` wins over `manager` only because of how
    /// the names sort.
    pub async fn resolve_effective_role(
        &self,
        principal: &Principal,
    ) -> AppResult<Option<RoleName>> {
        let Some(user_id) = principal.user_id() else {
            return Ok(None);
        };

        if let Some(role_name) = self.cache.get_effective_role(user_id).await? {
            return Ok(Some(role_name));
        }

        let mut assignments = self.directory.list_active_assignments(user_id).await?;
        assignments.sort_by(|left, right| left.role_name.cmp(&right.role_name));

        let Some(assignment) = assignments.into_iter().next() else {
            return Ok(None);
        };

        self.cache
            .set_effective_role(user_id, assignment.role_name.clone(), self.cache_ttl_seconds)
            .await?;

        Ok(Some(assignment.role_name))
    }

    /// Returns whether the principal's effective role matches `role_name`.
    pub async fn has_role(&self, principal: &Principal, role_name: &str) -> AppResult<bool> {
        let effective = self.resolve_effective_role(principal).await?;
        Ok(effective.is_some_and(|role| role.as_str() == role_name))
    }

    /// Returns whether the principal's effective role is `admin`.
    pub async fn is_admin(&self, principal: &Principal) -> AppResult<bool> {
        self.has_role(principal, ADMIN_ROLE_NAME).await
    }

    /// Decides whether the principal may perform `action` on the resource type.
    ///
    /// A resource-type reference that resolves to nothing is a caller bug and
    /// surfaces as [`AppError::NotFound`]; every policy denial returns
    /// `Ok(false)`. For update/delete checks against a role without the
    /// manage-others flag, callers must pass the resource owner or the check
    /// denies.
    pub async fn can_access(
        &self,
        principal: &Principal,
        resource_type: &ResourceTypeName,
        action: ResourceAction,
        resource_owner: Option<&ResourceOwner>,
    ) -> AppResult<bool> {
        let record = self
            .directory
            .find_resource_type(resource_type)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("resource type '{resource_type}' was not found"))
            })?;

        let Some(user_id) = principal.user_id() else {
            // Hard-coded guest policy: read-only access to active types,
            // regardless of how grants are configured.
            return Ok(action == ResourceAction::Read && record.is_active);
        };

        let Some(role_name) = self.resolve_effective_role(principal).await? else {
            warn!(
                user = %user_id,
                resource_type = %resource_type,
                action = action.as_str(),
                "access denied: no role assigned"
            );
            return Ok(false);
        };

        // An inactive type counts as having no grant, even though the rows
        // are still stored.
        if !record.is_active {
            debug!(
                role = %role_name,
                resource_type = %resource_type,
                "access denied: resource type is inactive"
            );
            return Ok(false);
        }

        let Some(grant) = self.directory.find_grant(&role_name, resource_type).await? else {
            warn!(
                role = %role_name,
                resource_type = %resource_type,
                action = action.as_str(),
                "access denied: no grant row for role"
            );
            return Ok(false);
        };

        let allowed = match action {
            ResourceAction::Create | ResourceAction::Read => grant.flags.base_flag(action),
            ResourceAction::Update | ResourceAction::Delete => {
                if grant.flags.can_manage_others {
                    grant.flags.base_flag(action)
                } else if grant.flags.base_flag(action) {
                    resource_owner.is_some_and(|owner| owner.matches(user_id))
                } else {
                    false
                }
            }
        };

        debug!(
            user = %user_id,
            role = %role_name,
            resource_type = %resource_type,
            action = action.as_str(),
            allowed,
            "access decision"
        );

        Ok(allowed)
    }

    /// Ensures the principal may perform `action` on the resource type.
    pub async fn require_access(
        &self,
        principal: &Principal,
        resource_type: &ResourceTypeName,
        action: ResourceAction,
        resource_owner: Option<&ResourceOwner>,
    ) -> AppResult<()> {
        if self
            .can_access(principal, resource_type, action, resource_owner)
            .await?
        {
            return Ok(());
        }

        if !principal.is_authenticated() {
            return Err(AppError::Unauthorized(format!(
                "authentication is required to {} resources of type '{resource_type}'",
                action.as_str()
            )));
        }

        Err(AppError::Forbidden(format!(
            "principal '{}' may not {} resources of type '{resource_type}'",
            principal.describe(),
            action.as_str()
        )))
    }

    /// Returns the active resource types the principal may create resources of.
    pub async fn creatable_resource_types(
        &self,
        principal: &Principal,
    ) -> AppResult<Vec<ResourceType>> {
        if !principal.is_authenticated() {
            return Ok(Vec::new());
        }

        let Some(role_name) = self.resolve_effective_role(principal).await? else {
            return Ok(Vec::new());
        };

        let mut creatable = Vec::new();
        for resource_type in self.directory.list_active_resource_types().await? {
            let grant = self
                .directory
                .find_grant(&role_name, &resource_type.name)
                .await?;
            if grant.is_some_and(|grant| grant.flags.can_create) {
                creatable.push(resource_type);
            }
        }

        Ok(creatable)
    }
}
