use async_trait::async_trait;

use rolegate_application::EffectiveRoleCache;
use rolegate_core::{AppResult, UserId};
use rolegate_domain::RoleName;

/// Cache adapter that never stores anything.
///
/// Every read misses, so role resolution always consults the directory.
/// Useful in tests and in deployments that want checks to observe
/// assignment changes immediately.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpEffectiveRoleCache;

impl NoOpEffectiveRoleCache {
    /// Creates the no-op cache.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EffectiveRoleCache for NoOpEffectiveRoleCache {
    async fn get_effective_role(&self, _user_id: UserId) -> AppResult<Option<RoleName>> {
        Ok(None)
    }

    async fn set_effective_role(
        &self,
        _user_id: UserId,
        _role_name: RoleName,
        _ttl_seconds: u32,
    ) -> AppResult<()> {
        Ok(())
    }

    async fn invalidate(&self, _user_id: UserId) -> AppResult<()> {
        Ok(())
    }
}
