use rolegate_core::{AppResult, Principal};
use rolegate_domain::{AuditAction, ResourceType, ResourceTypeName};
use tracing::info;

use crate::{AuditEvent, CreateResourceTypeInput};

use super::AccessAdminService;

impl AccessAdminService {
    /// Registers a resource type, provisions grants for every existing role,
    /// and emits an audit event.
    pub async fn create_resource_type(
        &self,
        actor: &Principal,
        input: CreateResourceTypeInput,
    ) -> AppResult<ResourceType> {
        self.require_admin(actor).await?;

        // Validates and lowercases before the repository sees the name.
        ResourceTypeName::new(input.name.as_str())?;

        let resource_type = self.repository.create_resource_type(input).await?;
        self.provision_grants_for_resource_type(&resource_type.name)
            .await?;

        info!(
            resource_type = %resource_type.name,
            actor = %actor.describe(),
            "resource type created"
        );

        self.audit_repository
            .append_event(AuditEvent {
                actor: actor.describe(),
                action: AuditAction::ResourceTypeCreated,
                resource_type: "rbac_resource_type".to_owned(),
                resource_id: resource_type.name.to_string(),
                detail: Some(format!("created resource type '{}'", resource_type.name)),
            })
            .await?;

        Ok(resource_type)
    }

    /// Soft-deletes a resource type.
    ///
    /// Grant rows referencing the type are left in place; permission checks
    /// and default-grant provisioning stop considering the type while it is
    /// inactive.
    pub async fn deactivate_resource_type(
        &self,
        actor: &Principal,
        resource_type: &str,
    ) -> AppResult<()> {
        self.require_admin(actor).await?;

        let name = ResourceTypeName::new(resource_type)?;
        self.repository.deactivate_resource_type(&name).await?;

        self.audit_repository
            .append_event(AuditEvent {
                actor: actor.describe(),
                action: AuditAction::ResourceTypeDeactivated,
                resource_type: "rbac_resource_type".to_owned(),
                resource_id: name.to_string(),
                detail: Some(format!("deactivated resource type '{name}'")),
            })
            .await
    }

    /// Returns all resource types, inactive ones included.
    pub async fn list_resource_types(&self, actor: &Principal) -> AppResult<Vec<ResourceType>> {
        self.require_admin_or_manager(actor).await?;
        self.repository.list_resource_types().await
    }
}
