use std::sync::Arc;

use rolegate_core::{AppError, AppResult, Principal};
use rolegate_domain::{ADMIN_ROLE_NAME, MANAGER_ROLE_NAME, ProvisioningPolicy};

use crate::{AccessAdminRepository, AuditRepository, AuthorizationService, EffectiveRoleCache};

mod assignments;
mod grants;
mod resource_types;
mod roles;

#[cfg(test)]
mod tests;

/// Application service for access-control administration.
///
/// Mutations are gated on the acting principal's effective role, write
/// through the admin repository, provision default grants as an explicit
/// follow-up step, and invalidate the effective-role cache whenever an
/// assignment changes.
#[derive(Clone)]
pub struct AccessAdminService {
    authorization_service: AuthorizationService,
    repository: Arc<dyn AccessAdminRepository>,
    audit_repository: Arc<dyn AuditRepository>,
    cache: Arc<dyn EffectiveRoleCache>,
    provisioning_policy: ProvisioningPolicy,
}

impl AccessAdminService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(
        authorization_service: AuthorizationService,
        repository: Arc<dyn AccessAdminRepository>,
        audit_repository: Arc<dyn AuditRepository>,
        cache: Arc<dyn EffectiveRoleCache>,
    ) -> Self {
        Self {
            authorization_service,
            repository,
            audit_repository,
            cache,
            provisioning_policy: ProvisioningPolicy::default(),
        }
    }

    /// Overrides the default-grant provisioning policy.
    #[must_use]
    pub fn with_provisioning_policy(mut self, policy: ProvisioningPolicy) -> Self {
        self.provisioning_policy = policy;
        self
    }

    async fn require_admin(&self, actor: &Principal) -> AppResult<()> {
        if !actor.is_authenticated() {
            return Err(AppError::Unauthorized(
                "authentication is required for access administration".to_owned(),
            ));
        }

        if self.authorization_service.is_admin(actor).await? {
            return Ok(());
        }

        Err(AppError::Forbidden(format!(
            "principal '{}' requires the '{ADMIN_ROLE_NAME}' role for this operation",
            actor.describe()
        )))
    }

    async fn require_admin_or_manager(&self, actor: &Principal) -> AppResult<()> {
        if !actor.is_authenticated() {
            return Err(AppError::Unauthorized(
                "authentication is required for access administration".to_owned(),
            ));
        }

        let effective = self
            .authorization_service
            .resolve_effective_role(actor)
            .await?;
        let allowed = effective
            .as_ref()
            .is_some_and(|role| matches!(role.as_str(), ADMIN_ROLE_NAME | MANAGER_ROLE_NAME));

        if allowed {
            return Ok(());
        }

        Err(AppError::Forbidden(format!(
            "principal '{}' requires the '{ADMIN_ROLE_NAME}' or '{MANAGER_ROLE_NAME}' role for this listing",
            actor.describe()
        )))
    }

    fn require_authenticated(actor: &Principal) -> AppResult<()> {
        if actor.is_authenticated() {
            return Ok(());
        }

        Err(AppError::Unauthorized(
            "authentication is required for this listing".to_owned(),
        ))
    }
}
