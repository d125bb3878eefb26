//! Cache layer abstraction.
//!
//! The cache only ever holds serialized copies of store reads. Implementations
//! report failures honestly through [`CacheError`]; deciding that a failure is
//! harmless is the repository's job.

mod memory;
mod redis;

use std::time::Duration;

use async_trait::async_trait;

use crate::error::CacheError;
use crate::keys::CacheKey;

pub use memory::MemoryCache;
pub use redis::{RedisCache, RedisCacheConfig};

/// A network-accessible key/value store with per-entry expiry.
///
/// # Implementors
///
/// - `RedisCache` - shared Redis instance, used in production
/// - `MemoryCache` - in-process moka cache, for single-instance runs and tests
#[async_trait]
pub trait CacheLayer: Send + Sync {
    /// Returns the stored bytes, or `None` if the key is absent or expired.
    async fn get(&self, key: &CacheKey) -> Result<Option<Vec<u8>>, CacheError>;

    /// Stores `value` under `key` for `ttl`, replacing any previous value.
    async fn set(&self, key: &CacheKey, value: &[u8], ttl: Duration) -> Result<(), CacheError>;

    /// Removes `key`. Removing an absent key is not an error.
    async fn delete(&self, key: &CacheKey) -> Result<(), CacheError>;

    /// Round-trips to the cache to check reachability.
    async fn ping(&self) -> Result<(), CacheError>;

    /// Returns the name of this cache layer, for logging.
    fn name(&self) -> &str;
}

/// How the repository interprets a cache read.
///
/// `Miss` and `Degraded` lead to the same store read; they are kept apart so
/// that logs and metrics can tell an empty cache from a broken one.
#[derive(Debug)]
pub enum CacheLookup {
    Hit(Vec<u8>),
    Miss,
    Degraded(CacheError),
}

impl CacheLookup {
    /// Folds a raw cache result into a lookup.
    pub fn from_result(result: Result<Option<Vec<u8>>, CacheError>) -> Self {
        match result {
            Ok(Some(bytes)) => Self::Hit(bytes),
            Ok(None) => Self::Miss,
            Err(e) => Self::Degraded(e),
        }
    }

    pub fn is_hit(&self) -> bool {
        matches!(self, Self::Hit(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_from_result() {
        assert!(CacheLookup::from_result(Ok(Some(b"[]".to_vec()))).is_hit());
        assert!(matches!(
            CacheLookup::from_result(Ok(None)),
            CacheLookup::Miss
        ));
        assert!(matches!(
            CacheLookup::from_result(Err(CacheError::Timeout(Duration::from_millis(5)))),
            CacheLookup::Degraded(CacheError::Timeout(_))
        ));
    }
}
