//! Shared fixtures for repository tests.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use surge_store::surge_core::{NewUser, Result as StoreResult, User, UserId};
use surge_store::{
    CacheError, CacheKey, CacheLayer, MemoryCache, MemoryStore, RedisCache, RedisCacheConfig,
    RepositoryConfig, UserRepository, UserStore,
};

/// Repository wired to in-memory backends, plus handles to both.
pub struct Harness {
    pub repository: UserRepository,
    pub store: Arc<MemoryStore>,
    pub cache: Arc<MemoryCache>,
}

pub fn harness() -> Harness {
    harness_with(RepositoryConfig::default())
}

pub fn harness_with(config: RepositoryConfig) -> Harness {
    let store = Arc::new(MemoryStore::new());
    let cache = Arc::new(MemoryCache::default());
    let repository = UserRepository::new(store.clone(), cache.clone(), config);

    Harness {
        repository,
        store,
        cache,
    }
}

/// Redis cache pointing at a port nobody listens on.
pub fn unreachable_redis() -> Arc<RedisCache> {
    let config = RedisCacheConfig {
        url: "redis://127.0.0.1:1".to_string(),
        pool_size: 2,
        connect_timeout: Duration::from_millis(100),
    };
    Arc::new(RedisCache::new(&config).unwrap())
}

/// Cache whose every operation hangs.
pub struct StalledCache;

#[async_trait]
impl CacheLayer for StalledCache {
    async fn get(&self, _key: &CacheKey) -> Result<Option<Vec<u8>>, CacheError> {
        std::future::pending().await
    }

    async fn set(&self, _key: &CacheKey, _value: &[u8], _ttl: Duration) -> Result<(), CacheError> {
        std::future::pending().await
    }

    async fn delete(&self, _key: &CacheKey) -> Result<(), CacheError> {
        std::future::pending().await
    }

    async fn ping(&self) -> Result<(), CacheError> {
        std::future::pending().await
    }

    fn name(&self) -> &str {
        "stalled"
    }
}

/// Store whose every query hangs, like a database that accepted the
/// connection and never answered.
pub struct StalledStore;

#[async_trait]
impl UserStore for StalledStore {
    async fn list(&self) -> StoreResult<Vec<User>> {
        std::future::pending().await
    }

    async fn find(&self, _id: UserId) -> StoreResult<Option<User>> {
        std::future::pending().await
    }

    async fn insert(&self, _new: &NewUser) -> StoreResult<User> {
        std::future::pending().await
    }

    async fn ping(&self) -> StoreResult<()> {
        std::future::pending().await
    }

    fn name(&self) -> &str {
        "stalled"
    }
}
