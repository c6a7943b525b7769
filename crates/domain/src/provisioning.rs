use serde::{Deserialize, Serialize};

use crate::{ADMIN_ROLE_NAME, PermissionFlags, RoleName};

/// Policy for default grants created when a new resource type appears.
///
/// New roles always receive read-only defaults; this policy only governs the
/// reverse direction, where an existing role population gets rows for a new
/// type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProvisioningPolicy {
    /// Every role receives the same read-only defaults.
    #[default]
    UniformReadOnly,
    /// The role literally named `admin` receives full access; everyone else
    /// receives read-only defaults.
    AdminFullAccess,
}

impl ProvisioningPolicy {
    /// Returns the default flags for one role under this policy.
    #[must_use]
    pub fn default_flags(&self, role_name: &RoleName) -> PermissionFlags {
        match self {
            Self::UniformReadOnly => PermissionFlags::read_only(),
            Self::AdminFullAccess => {
                if role_name.as_str() == ADMIN_ROLE_NAME {
                    PermissionFlags::full_access()
                } else {
                    PermissionFlags::read_only()
                }
            }
        }
    }
}
