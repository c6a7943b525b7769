//! Application services and ports for the Rolegate authorization core.

#![forbid(unsafe_code)]

mod access_admin_ports;
mod access_admin_service;
mod audit_ports;
mod authorization_service;

pub use access_admin_ports::{
    AccessAdminRepository, CreateResourceTypeInput, CreateRoleInput, NewRoleAssignment,
};
pub use access_admin_service::AccessAdminService;
pub use audit_ports::{AuditEvent, AuditRepository};
pub use authorization_service::{
    AccessDirectory, AuthorizationService, EFFECTIVE_ROLE_CACHE_TTL_SECONDS, EffectiveRoleCache,
};
