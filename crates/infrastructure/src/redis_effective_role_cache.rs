//! Redis-backed effective-role cache.

use async_trait::async_trait;
use redis::AsyncCommands;

use rolegate_application::EffectiveRoleCache;
use rolegate_core::{AppError, AppResult, UserId};
use rolegate_domain::RoleName;

/// Redis implementation of the effective-role cache port.
#[derive(Clone)]
pub struct RedisEffectiveRoleCache {
    client: redis::Client,
    key_prefix: String,
}

impl RedisEffectiveRoleCache {
    /// Creates a cache adapter with a configured Redis client and key prefix.
    #[must_use]
    pub fn new(client: redis::Client, key_prefix: impl Into<String>) -> Self {
        Self {
            client,
            key_prefix: key_prefix.into(),
        }
    }

    fn key_for(&self, user_id: UserId) -> String {
        format!("{}:effective_role:{user_id}", self.key_prefix)
    }
}

#[async_trait]
impl EffectiveRoleCache for RedisEffectiveRoleCache {
    async fn get_effective_role(&self, user_id: UserId) -> AppResult<Option<RoleName>> {
        let key = self.key_for(user_id);
        let mut connection = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(|error| AppError::Internal(format!("failed to connect to redis: {error}")))?;

        let encoded: Option<String> = connection.get(key).await.map_err(|error| {
            AppError::Internal(format!("failed to read effective-role cache entry: {error}"))
        })?;

        encoded
            .map(|value| {
                RoleName::new(value.as_str()).map_err(|error| {
                    AppError::Internal(format!(
                        "invalid effective-role cache value '{value}': {error}"
                    ))
                })
            })
            .transpose()
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

        let key = self.key_for(user_id);
        let mut connection = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(|error| AppError::Internal(format!("failed to connect to redis: {error}")))?;

        connection
            .set_ex(key, role_name.as_str(), u64::from(ttl_seconds))
            .await
            .map_err(|error| {
                AppError::Internal(format!(
                    "failed to write effective-role cache entry: {error}"
                ))
            })
    }

    async fn invalidate(&self, user_id: UserId) -> AppResult<()> {
        let key = self.key_for(user_id);
        let mut connection = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(|error| AppError::Internal(format!("failed to connect to redis: {error}")))?;

        connection.del(key).await.map_err(|error| {
            AppError::Internal(format!(
                "failed to drop effective-role cache entry: {error}"
            ))
        })
    }
}
