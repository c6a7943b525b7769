use rolegate_core::{AppError, AppResult, Principal, UserId};
use rolegate_domain::{AuditAction, DEFAULT_ROLE_NAME, RoleAssignment, RoleName};
use tracing::info;

use crate::{AuditEvent, CreateRoleInput, NewRoleAssignment};

use super::AccessAdminService;

impl AccessAdminService {
    /// Assigns a role to a user, invalidates their cached effective role,
    /// and emits an audit event.
    pub async fn assign_role(
        &self,
        actor: &Principal,
        user_id: UserId,
        role_name: &str,
    ) -> AppResult<RoleAssignment> {
        self.require_admin(actor).await?;

        let role_name = RoleName::new(role_name)?;
        if self.repository.find_role(&role_name).await?.is_none() {
            return Err(AppError::NotFound(format!(
                "role '{role_name}' was not found"
            )));
        }

        let assignment = self
            .repository
            .create_assignment(NewRoleAssignment {
                user_id,
                role_name: role_name.clone(),
                assigned_by: actor.user_id(),
            })
            .await?;
        self.cache.invalidate(user_id).await?;

        self.audit_repository
            .append_event(AuditEvent {
                actor: actor.describe(),
                action: AuditAction::RoleAssigned,
                resource_type: "rbac_role_assignment".to_owned(),
                resource_id: format!("{user_id}:{role_name}"),
                detail: Some(format!("assigned role '{role_name}' to user '{user_id}'")),
            })
            .await?;

        Ok(assignment)
    }

    /// Removes a role from a user by deactivating the assignment row.
    ///
    /// This is the canonical removal semantic; the row and its metadata stay
    /// behind. See [`AccessAdminService::purge_assignment`] for hard removal.
    pub async fn unassign_role(
        &self,
        actor: &Principal,
        user_id: UserId,
        role_name: &str,
    ) -> AppResult<()> {
        self.require_admin(actor).await?;

        let role_name = RoleName::new(role_name)?;
        self.repository
            .deactivate_assignment(user_id, &role_name)
            .await?;
        self.cache.invalidate(user_id).await?;

        self.audit_repository
            .append_event(AuditEvent {
                actor: actor.describe(),
                action: AuditAction::RoleUnassigned,
                resource_type: "rbac_role_assignment".to_owned(),
                resource_id: format!("{user_id}:{role_name}"),
                detail: Some(format!(
                    "deactivated role '{role_name}' for user '{user_id}'"
                )),
            })
            .await
    }

    /// Hard-deletes an assignment row; an explicit alias for callers that
    /// need the record gone rather than deactivated.
    pub async fn purge_assignment(
        &self,
        actor: &Principal,
        user_id: UserId,
        role_name: &str,
    ) -> AppResult<()> {
        self.require_admin(actor).await?;

        let role_name = RoleName::new(role_name)?;
        self.repository.purge_assignment(user_id, &role_name).await?;
        self.cache.invalidate(user_id).await?;

        self.audit_repository
            .append_event(AuditEvent {
                actor: actor.describe(),
                action: AuditAction::RoleUnassigned,
                resource_type: "rbac_role_assignment".to_owned(),
                resource_id: format!("{user_id}:{role_name}"),
                detail: Some(format!("purged role '{role_name}' for user '{user_id}'")),
            })
            .await
    }

    /// Returns every assignment held by one user, deactivated rows included.
    pub async fn list_assignments_for_user(
        &self,
        actor: &Principal,
        user_id: UserId,
    ) -> AppResult<Vec<RoleAssignment>> {
        Self::require_authenticated(actor)?;
        self.repository.list_assignments_for_user(user_id).await
    }

    /// Gives a newly registered user the default role.
    ///
    /// The role named `user` is created on first reference, with default
    /// grants provisioned; the assignment records the user as their own
    /// assigner. A user already holding any assignment is left untouched.
    /// Invoked by the registration flow, so no actor gate applies.
    pub async fn ensure_default_assignment(&self, user_id: UserId) -> AppResult<()> {
        let existing = self.repository.list_assignments_for_user(user_id).await?;
        if !existing.is_empty() {
            return Ok(());
        }

        let role_name = RoleName::new(DEFAULT_ROLE_NAME)?;
        if self.repository.find_role(&role_name).await?.is_none() {
            let role = self
                .repository
                .create_role(CreateRoleInput {
                    name: DEFAULT_ROLE_NAME.to_owned(),
                    description: "Regular system user".to_owned(),
                    is_default: false,
                })
                .await?;
            self.provision_grants_for_role(&role.name).await?;
        }

        self.repository
            .create_assignment(NewRoleAssignment {
                user_id,
                role_name: role_name.clone(),
                assigned_by: Some(user_id),
            })
            .await?;
        self.cache.invalidate(user_id).await?;

        info!(user = %user_id, role = %role_name, "default role assigned on registration");

        Ok(())
    }
}
