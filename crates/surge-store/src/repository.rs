//! Cache-aside repository.
//!
//! Reads go to the cache first and fall back to the store on a miss or on any
//! cache failure; the store result is then written back with a fixed TTL.
//! Writes go to the store only, and a successful insert deletes the collection
//! entry before returning.
//!
//! The cache is an accelerator and nothing more. A cache fault is logged,
//! counted and otherwise ignored; a store fault is always returned.
//!
//! Consistency is per key and eventual. A collection read that started before
//! an insert committed may write back the older collection after the insert's
//! invalidation; the TTL bounds how long that copy can live.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::de::DeserializeOwned;
use surge_core::{Error, NewUser, Result, User, UserId};
use tracing::{debug, info, instrument, warn};

use crate::cache::{CacheLayer, CacheLookup};
use crate::error::CacheError;
use crate::keys::CacheKey;
use crate::metrics::CacheMetrics;
use crate::store::UserStore;

/// Timing knobs for the repository.
#[derive(Debug, Clone)]
pub struct RepositoryConfig {
    /// Lifetime of every cache entry written back after a store read.
    pub cache_ttl: Duration,
    /// Bound on a single cache operation. Exceeding it counts as a miss.
    pub cache_timeout: Duration,
    /// Bound on a single store operation. Exceeding it is `StoreUnavailable`.
    pub store_timeout: Duration,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_secs(300),
            cache_timeout: Duration::from_millis(250),
            store_timeout: Duration::from_secs(5),
        }
    }
}

/// Where a payload came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Cache,
    Store,
}

impl Origin {
    /// Value of the `x-cache` response header.
    pub fn as_header(&self) -> &'static str {
        match self {
            Self::Cache => "HIT",
            Self::Store => "MISS",
        }
    }
}

/// A serialized JSON payload ready to send to the caller.
///
/// Cache hits are returned exactly as stored, so two reads within the TTL
/// yield identical bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fetched {
    body: Vec<u8>,
    origin: Origin,
}

impl Fetched {
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn into_body(self) -> Vec<u8> {
        self.body
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    /// Parses the payload.
    pub fn decode<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_slice(&self.body)
    }
}

/// Mediates every read and write between the store and the cache.
///
/// Both collaborators are injected; the repository owns no connections of its
/// own and is cheap to share behind an `Arc`.
pub struct UserRepository {
    store: Arc<dyn UserStore>,
    cache: Arc<dyn CacheLayer>,
    config: RepositoryConfig,
    metrics: CacheMetrics,
}

impl UserRepository {
    pub fn new(
        store: Arc<dyn UserStore>,
        cache: Arc<dyn CacheLayer>,
        config: RepositoryConfig,
    ) -> Self {
        info!(
            store = store.name(),
            cache = cache.name(),
            ttl_secs = config.cache_ttl.as_secs(),
            "User repository ready"
        );

        Self {
            store,
            cache,
            config,
            metrics: CacheMetrics::new(),
        }
    }

    /// Returns every user, newest first, as a JSON array.
    ///
    /// Succeeds whenever the store does, whatever state the cache is in.
    #[instrument(skip_all)]
    pub async fn list_users(&self) -> Result<Fetched> {
        let key = CacheKey::Collection;

        if let Some(hit) = self.lookup(&key).await {
            return Ok(hit);
        }

        let users = self.store_call("list", self.store.list()).await?;
        let body = encode(&users)?;
        self.populate(&key, &body).await;

        Ok(Fetched {
            body,
            origin: Origin::Store,
        })
    }

    /// Returns one user as a JSON object.
    ///
    /// # Errors
    ///
    /// - `Error::NotFound` if the store has no such user
    /// - `Error::StoreUnavailable` if the store failed
    #[instrument(skip(self))]
    pub async fn find_user(&self, id: UserId) -> Result<Fetched> {
        let key = CacheKey::User(id);

        if let Some(hit) = self.lookup(&key).await {
            return Ok(hit);
        }

        let user = self
            .store_call("find", self.store.find(id))
            .await?
            .ok_or_else(|| Error::user_not_found(id))?;
        let body = encode(&user)?;
        self.populate(&key, &body).await;

        Ok(Fetched {
            body,
            origin: Origin::Store,
        })
    }

    /// Validates and inserts a user, then invalidates the collection entry.
    ///
    /// The cache is only touched after the insert has succeeded, so a failed
    /// insert never evicts a still-valid collection.
    ///
    /// # Errors
    ///
    /// - `Error::BadInput` if a field fails validation
    /// - `Error::Conflict` if the email is taken
    /// - `Error::StoreUnavailable` if the store failed
    #[instrument(skip_all)]
    pub async fn create_user(&self, new: NewUser) -> Result<User> {
        let new = new.validated()?;

        let user = self.store_call("insert", self.store.insert(&new)).await?;
        info!(user_id = user.id, "User created");

        self.invalidate(&CacheKey::Collection).await;

        Ok(user)
    }

    /// Returns the store, for health checks.
    pub fn store(&self) -> &dyn UserStore {
        self.store.as_ref()
    }

    /// Returns the cache layer, for health checks.
    pub fn cache(&self) -> &dyn CacheLayer {
        self.cache.as_ref()
    }

    pub fn config(&self) -> &RepositoryConfig {
        &self.config
    }

    /// Returns the cache outcome counters.
    pub fn metrics(&self) -> &CacheMetrics {
        &self.metrics
    }

    /// Reads `key` from the cache. `None` means "go to the store".
    async fn lookup(&self, key: &CacheKey) -> Option<Fetched> {
        let start = Instant::now();
        let result = self.cache_call(self.cache.get(key)).await;
        self.metrics
            .record_operation_duration("get", start.elapsed());

        match CacheLookup::from_result(result) {
            CacheLookup::Hit(body) => {
                debug!(key = %key, "cache hit");
                self.metrics.record_hit(key.kind());
                Some(Fetched {
                    body,
                    origin: Origin::Cache,
                })
            },
            CacheLookup::Miss => {
                debug!(key = %key, "cache miss");
                self.metrics.record_miss(key.kind());
                None
            },
            CacheLookup::Degraded(e) => {
                warn!(key = %key, error = %e, "cache read failed, falling back to store");
                self.metrics.record_degraded("get", e.label());
                self.metrics.record_miss(key.kind());
                None
            },
        }
    }

    /// Writes a fresh store read back to the cache. Failures are swallowed.
    async fn populate(&self, key: &CacheKey, body: &[u8]) {
        let start = Instant::now();
        let result = self
            .cache_call(self.cache.set(key, body, self.config.cache_ttl))
            .await;
        self.metrics
            .record_operation_duration("set", start.elapsed());

        if let Err(e) = result {
            warn!(key = %key, error = %e, "cache write failed");
            self.metrics.record_degraded("set", e.label());
        }
    }

    /// Deletes `key` from the cache. Failures are swallowed; the TTL still
    /// bounds how stale the surviving entry can get.
    async fn invalidate(&self, key: &CacheKey) {
        match self.cache_call(self.cache.delete(key)).await {
            Ok(()) => {
                debug!(key = %key, "cache entry invalidated");
                self.metrics.record_invalidation(key.kind());
            },
            Err(e) => {
                warn!(key = %key, error = %e, "cache invalidation failed");
                self.metrics.record_degraded("delete", e.label());
            },
        }
    }

    async fn cache_call<T, F>(&self, call: F) -> std::result::Result<T, CacheError>
    where
        F: Future<Output = std::result::Result<T, CacheError>>,
    {
        let limit = self.config.cache_timeout;
        tokio::time::timeout(limit, call)
            .await
            .unwrap_or(Err(CacheError::Timeout(limit)))
    }

    async fn store_call<T, F>(&self, operation: &'static str, call: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        let limit = self.config.store_timeout;
        match tokio::time::timeout(limit, call).await {
            Ok(result) => result,
            Err(_) => Err(Error::store_unavailable(format!(
                "store {operation} timed out after {}ms",
                limit.as_millis()
            ))),
        }
    }
}

fn encode<T: serde::Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    serde_json::to_vec(value).map_err(|e| Error::internal_with_cause("failed to serialize", e))
}
