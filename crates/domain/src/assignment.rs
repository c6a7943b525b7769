use chrono::{DateTime, Utc};
use rolegate_core::UserId;
use serde::{Deserialize, Serialize};

use crate::RoleName;

/// Link between a user account and a role, with assignment metadata.
///
/// A user may hold several active assignments at once; the effective-role
/// tie-break picks one deterministically at check time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleAssignment {
    /// Account holding the role.
    pub user_id: UserId,
    /// Assigned role name.
    pub role_name: RoleName,
    /// Account that granted the assignment, when known.
    pub assigned_by: Option<UserId>,
    /// Assignment timestamp.
    pub assigned_at: DateTime<Utc>,
    /// Deactivated assignments are ignored by role resolution.
    pub is_active: bool,
}
