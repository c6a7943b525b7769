use rolegate_core::{AppError, AppResult, Principal};
use rolegate_domain::{AuditAction, Role, RoleName};
use tracing::info;

use crate::{AuditEvent, CreateRoleInput};

use super::AccessAdminService;

impl AccessAdminService {
    /// Creates a custom role, provisions its default grants, and emits an
    /// audit event.
    pub async fn create_role(&self, actor: &Principal, input: CreateRoleInput) -> AppResult<Role> {
        self.require_admin(actor).await?;

        let name = RoleName::new(input.name.as_str())?;
        if name.is_reserved() {
            return Err(AppError::Validation(format!(
                "role name '{name}' is reserved by the system"
            )));
        }

        let role = self.repository.create_role(input).await?;
        self.provision_grants_for_role(&role.name).await?;

        info!(role = %role.name, actor = %actor.describe(), "role created");

        self.audit_repository
            .append_event(AuditEvent {
                actor: actor.describe(),
                action: AuditAction::RoleCreated,
                resource_type: "rbac_role".to_owned(),
                resource_id: role.name.to_string(),
                detail: Some(format!("created role '{}'", role.name)),
            })
            .await?;

        Ok(role)
    }

    /// Marks one role as the account default; the flag is cleared from every
    /// other role in the same write.
    pub async fn mark_default_role(&self, actor: &Principal, role_name: &str) -> AppResult<()> {
        self.require_admin(actor).await?;

        let name = RoleName::new(role_name)?;
        self.repository.mark_default_role(&name).await?;

        self.audit_repository
            .append_event(AuditEvent {
                actor: actor.describe(),
                action: AuditAction::RoleMarkedDefault,
                resource_type: "rbac_role".to_owned(),
                resource_id: name.to_string(),
                detail: Some(format!("marked role '{name}' as the account default")),
            })
            .await
    }

    /// Returns all roles for administrative listings.
    pub async fn list_roles(&self, actor: &Principal) -> AppResult<Vec<Role>> {
        self.require_admin_or_manager(actor).await?;
        self.repository.list_roles().await
    }
}
