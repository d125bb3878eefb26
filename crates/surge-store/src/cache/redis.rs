//! Redis cache layer.

use std::time::Duration;

use async_trait::async_trait;
use deadpool_redis::redis::{self, AsyncCommands};
use deadpool_redis::{Pool, PoolConfig, Runtime, Timeouts};
use tracing::{debug, info};

use super::CacheLayer;
use crate::error::CacheError;
use crate::keys::CacheKey;
use crate::store::mask_password;

/// Configuration for the Redis connection pool.
#[derive(Debug, Clone)]
pub struct RedisCacheConfig {
    /// Redis URL, e.g. `redis://cache:6379/0`.
    pub url: String,
    /// Maximum number of pooled connections.
    pub pool_size: usize,
    /// Bound on waiting for, creating and recycling a connection.
    pub connect_timeout: Duration,
}

impl Default for RedisCacheConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379".to_string(),
            pool_size: 16,
            connect_timeout: Duration::from_millis(500),
        }
    }
}

/// Cache layer backed by a shared Redis instance.
///
/// The pool connects lazily, so building a `RedisCache` succeeds even when
/// Redis is down; the first command reports the failure instead.
pub struct RedisCache {
    pool: Pool,
    name: String,
}

impl RedisCache {
    /// Builds the connection pool. Does not contact Redis.
    pub fn new(config: &RedisCacheConfig) -> Result<Self, CacheError> {
        let mut timeouts = Timeouts::default();
        timeouts.wait = Some(config.connect_timeout);
        timeouts.create = Some(config.connect_timeout);
        timeouts.recycle = Some(config.connect_timeout);

        let mut pool_config = PoolConfig::new(config.pool_size);
        pool_config.timeouts = timeouts;

        let mut redis_config = deadpool_redis::Config::from_url(&config.url);
        redis_config.pool = Some(pool_config);

        let pool = redis_config
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|e| CacheError::setup(e.to_string()))?;

        let name = format!("redis({})", mask_password(&config.url));
        info!(cache = %name, pool_size = config.pool_size, "Redis cache pool created");

        Ok(Self { pool, name })
    }
}

#[async_trait]
impl CacheLayer for RedisCache {
    async fn get(&self, key: &CacheKey) -> Result<Option<Vec<u8>>, CacheError> {
        let mut conn = self.pool.get().await?;
        let value: Option<Vec<u8>> = conn.get(key.to_string()).await?;
        Ok(value)
    }

    async fn set(&self, key: &CacheKey, value: &[u8], ttl: Duration) -> Result<(), CacheError> {
        let mut conn = self.pool.get().await?;
        // EX has second granularity; never round down to "no expiry".
        let ttl_secs = ttl.as_secs().max(1);
        conn.set_ex::<_, _, ()>(key.to_string(), value, ttl_secs)
            .await?;
        debug!(key = %key, ttl_secs, "cache set");
        Ok(())
    }

    async fn delete(&self, key: &CacheKey) -> Result<(), CacheError> {
        let mut conn = self.pool.get().await?;
        conn.del::<_, ()>(key.to_string()).await?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), CacheError> {
        let mut conn = self.pool.get().await?;
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
