use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;

use rolegate_application::EffectiveRoleCache;
use rolegate_core::{AppResult, UserId};
use rolegate_domain::RoleName;

#[derive(Debug, Clone)]
struct CacheEntry {
    role_name: RoleName,
    expires_at: Instant,
}

/// In-memory cache adapter for effective-role lookups.
#[derive(Debug, Default)]
pub struct InMemoryEffectiveRoleCache {
    entries: RwLock<HashMap<UserId, CacheEntry>>,
}

impl InMemoryEffectiveRoleCache {
    /// Creates an empty in-memory effective-role cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EffectiveRoleCache for InMemoryEffectiveRoleCache {
    async fn get_effective_role(&self, user_id: UserId) -> AppResult<Option<RoleName>> {
        {
            let entries = self.entries.read().await;
            if let Some(entry) = entries.get(&user_id) {
                if entry.expires_at > Instant::now() {
                    return Ok(Some(entry.role_name.clone()));
                }
            } else {
                return Ok(None);
            }
        }

        let mut entries = self.entries.write().await;
        if entries
            .get(&user_id)
            .is_some_and(|entry| entry.expires_at <= Instant::now())
        {
            entries.remove(&user_id);
        }

        Ok(None)
    }

    async fn set_effective_role(
        &self,
        user_id: UserId,
        role_name: RoleName,
        ttl_seconds: u32,
    ) -> AppResult<()> {
        if ttl_seconds == 0 {
            return Ok(());
        }

        let now = Instant::now();
        let expires_at = now
            .checked_add(Duration::from_secs(u64::from(ttl_seconds)))
            .unwrap_or(now);

        self.entries.write().await.insert(
            user_id,
            CacheEntry {
                role_name,
                expires_at,
            },
        );

        Ok(())
    }

    async fn invalidate(&self, user_id: UserId) -> AppResult<()> {
        self.entries.write().await.remove(&user_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rolegate_application::EffectiveRoleCache;
    use rolegate_core::UserId;
    use rolegate_domain::RoleName;

    use super::InMemoryEffectiveRoleCache;

    fn role_name(value: &str) -> RoleName {
        match RoleName::new(value) {
            Ok(name) => name,
            Err(error) => panic!("invalid role name in test: {error}"),
        }
    }

    #[tokio::test]
    async fn set_and_get_round_trip() {
        let cache = InMemoryEffectiveRoleCache::new();
        let user_id = UserId::new();

        let stored = cache.set_effective_role(user_id, role_name("admin"), 60).await;
        assert!(stored.is_ok());

        let found = cache.get_effective_role(user_id).await;
        assert!(matches!(found, Ok(Some(role)) if role.as_str() == "admin"));
    }

    #[tokio::test]
    async fn zero_ttl_is_not_stored() {
        let cache = InMemoryEffectiveRoleCache::new();
        let user_id = UserId::new();

        let stored = cache.set_effective_role(user_id, role_name("admin"), 0).await;
        assert!(stored.is_ok());

        let found = cache.get_effective_role(user_id).await;
        assert!(matches!(found, Ok(None)));
    }

    #[tokio::test]
    async fn invalidate_removes_the_entry() {
        let cache = InMemoryEffectiveRoleCache::new();
        let user_id = UserId::new();

        let stored = cache.set_effective_role(user_id, role_name("admin"), 60).await;
        assert!(stored.is_ok());

        let invalidated = cache.invalidate(user_id).await;
        assert!(invalidated.is_ok());

        let found = cache.get_effective_role(user_id).await;
        assert!(matches!(found, Ok(None)));
    }

    #[tokio::test]
    async fn expired_entries_read_as_misses() {
        let cache = InMemoryEffectiveRoleCache::new();
        let user_id = UserId::new();

        let stored = cache.set_effective_role(user_id, role_name("admin"), 1).await;
        assert!(stored.is_ok());

        tokio::time::sleep(std::time::Duration::from_millis(1100)).await;

        let found = cache.get_effective_role(user_id).await;
        assert!(matches!(found, Ok(None)));
    }
}
