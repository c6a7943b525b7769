use rolegate_core::{AppError, AppResult, Principal};
use rolegate_domain::{
    AuditAction, PermissionFlags, PermissionGrant, ResourceTypeName, RoleName,
};
use tracing::info;

use crate::AuditEvent;

use super::AccessAdminService;

impl AccessAdminService {
    /// Creates or updates the grant row for one (role, resource type) pair.
    ///
    /// Flags are normalized before persisting: manage-others implies read and
    /// at least one of update/delete. The write is idempotent.
    pub async fn set_grant(
        &self,
        actor: &Principal,
        role_name: &str,
        resource_type: &str,
        flags: PermissionFlags,
    ) -> AppResult<PermissionGrant> {
        self.require_admin(actor).await?;

        let role_name = RoleName::new(role_name)?;
        let resource_type = ResourceTypeName::new(resource_type)?;

        if self.repository.find_role(&role_name).await?.is_none() {
            return Err(AppError::NotFound(format!(
                "role '{role_name}' was not found"
            )));
        }
        if self
            .repository
            .find_resource_type(&resource_type)
            .await?
            .is_none()
        {
            return Err(AppError::NotFound(format!(
                "resource type '{resource_type}' was not found"
            )));
        }

        let grant = self
            .repository
            .upsert_grant(&role_name, &resource_type, flags.normalized())
            .await?;

        info!(
            role = %role_name,
            resource_type = %resource_type,
            actor = %actor.describe(),
            "permission grant updated"
        );

        self.audit_repository
            .append_event(AuditEvent {
                actor: actor.describe(),
                action: AuditAction::GrantUpdated,
                resource_type: "rbac_role_grant".to_owned(),
                resource_id: format!("{role_name}:{resource_type}"),
                detail: Some(format!(
                    "set grant for role '{role_name}' on '{resource_type}' to \
                     create={} read={} update={} delete={} manage_others={}",
                    grant.flags.can_create,
                    grant.flags.can_read,
                    grant.flags.can_update,
                    grant.flags.can_delete,
                    grant.flags.can_manage_others
                )),
            })
            .await?;

        Ok(grant)
    }

    /// Returns the grant rows attached to one role.
    pub async fn list_grants_for_role(
        &self,
        actor: &Principal,
        role_name: &str,
    ) -> AppResult<Vec<PermissionGrant>> {
        self.require_admin_or_manager(actor).await?;

        let role_name = RoleName::new(role_name)?;
        if self.repository.find_role(&role_name).await?.is_none() {
            return Err(AppError::NotFound(format!(
                "role '{role_name}' was not found"
            )));
        }

        self.repository.list_grants_for_role(&role_name).await
    }

    /// Provisions read-only default grants for a new role against every
    /// active resource type.
    pub(super) async fn provision_grants_for_role(&self, role_name: &RoleName) -> AppResult<()> {
        for resource_type in self.repository.list_resource_types().await? {
            if !resource_type.is_active {
                continue;
            }

            self.repository
                .create_grant_if_absent(
                    role_name,
                    &resource_type.name,
                    PermissionFlags::read_only(),
                )
                .await?;
        }

        Ok(())
    }

    /// Provisions default grants for a new resource type against every
    /// existing role, per the configured provisioning policy.
    pub(super) async fn provision_grants_for_resource_type(
        &self,
        resource_type: &ResourceTypeName,
    ) -> AppResult<()> {
        for role in self.repository.list_roles().await? {
            let flags = self.provisioning_policy.default_flags(&role.name);
            self.repository
                .create_grant_if_absent(&role.name, resource_type, flags)
                .await?;
        }

        Ok(())
    }
}
