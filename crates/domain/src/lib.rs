//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod access;
mod assignment;
mod provisioning;
mod resource_type;
mod role;
mod security;

pub use access::{PermissionFlags, PermissionGrant, ResourceAction};
pub use assignment::RoleAssignment;
pub use provisioning::ProvisioningPolicy;
pub use resource_type::{ResourceType, ResourceTypeName};
pub use role::{
    ADMIN_ROLE_NAME, DEFAULT_ROLE_NAME, MANAGER_ROLE_NAME, RESERVED_ROLE_NAMES, Role, RoleName,
};
pub use security::AuditAction;
