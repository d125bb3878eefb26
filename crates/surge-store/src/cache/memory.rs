//! In-process cache layer using Moka.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::Expiry;
use moka::future::Cache;
use moka::notification::RemovalCause;

use super::CacheLayer;
use crate::error::CacheError;
use crate::keys::CacheKey;
use crate::metrics::CacheMetrics;

/// Stored bytes plus the TTL they were written with.
#[derive(Clone)]
struct Entry {
    bytes: Arc<[u8]>,
    ttl: Duration,
}

/// Expires every entry after the TTL given at write time.
struct PerEntryTtl;

impl Expiry<CacheKey, Entry> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &CacheKey,
        value: &Entry,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    // An overwrite restarts the clock, like Redis SET EX.
    fn expire_after_update(
        &self,
        _key: &CacheKey,
        value: &Entry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// Cache layer living inside the process.
///
/// Thread-safe and async-friendly. Only suitable when a single instance serves
/// traffic, since other replicas cannot see its invalidations.
///
/// # Examples
///
/// ```no_run
/// use std::time::Duration;
/// use surge_store::{CacheKey, CacheLayer, MemoryCache};
///
/// # #[tokio::main]
/// # async fn main() {
/// let cache = MemoryCache::new(1_000);
/// cache.set(&CacheKey::User(1), b"{}", Duration::from_secs(60)).await.unwrap();
/// assert!(cache.get(&CacheKey::User(1)).await.unwrap().is_some());
/// # }
/// ```
#[derive(Clone)]
pub struct MemoryCache {
    inner: Cache<CacheKey, Entry>,
}

impl MemoryCache {
    /// Creates a cache holding at most `max_capacity` entries.
    pub fn new(max_capacity: u64) -> Self {
        let eviction_metrics = CacheMetrics::new();

        let inner = Cache::builder()
            .max_capacity(max_capacity)
            .expire_after(PerEntryTtl)
            .eviction_listener(move |_key, _value, cause| {
                let cause = match cause {
                    RemovalCause::Expired => "ttl",
                    RemovalCause::Size => "capacity",
                    RemovalCause::Explicit => "manual",
                    RemovalCause::Replaced => "replaced",
                };
                eviction_metrics.record_eviction(cause);
            })
            .build();

        Self { inner }
    }

    /// Returns the approximate number of live entries.
    pub fn entry_count(&self) -> u64 {
        self.inner.entry_count()
    }

    /// Runs moka's pending maintenance so counts and expiry are current.
    pub async fn sync(&self) {
        self.inner.run_pending_tasks().await;
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new(10_000)
    }
}

#[async_trait]
impl CacheLayer for MemoryCache {
    async fn get(&self, key: &CacheKey) -> Result<Option<Vec<u8>>, CacheError> {
        Ok(self.inner.get(key).await.map(|entry| entry.bytes.to_vec()))
    }

    async fn set(&self, key: &CacheKey, value: &[u8], ttl: Duration) -> Result<(), CacheError> {
        let entry = Entry {
            bytes: Arc::from(value),
            ttl,
        };
        self.inner.insert(*key, entry).await;
        Ok(())
    }

    async fn delete(&self, key: &CacheKey) -> Result<(), CacheError> {
        self.inner.invalidate(key).await;
        Ok(())
    }

    async fn ping(&self) -> Result<(), CacheError> {
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
