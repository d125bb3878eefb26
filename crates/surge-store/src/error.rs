//! Cache layer errors.
//!
//! These never leave the crate as an operation failure: the repository turns
//! every one of them into [`CacheLookup::Degraded`](crate::CacheLookup) and
//! falls back to the store.

use std::time::Duration;

use deadpool_redis::redis::RedisError;
use thiserror::Error;

/// Errors that can occur when talking to the cache layer.
#[derive(Debug, Error)]
pub enum CacheError {
    /// No connection could be taken from the pool.
    #[error("cache pool error: {0}")]
    Pool(#[from] deadpool_redis::PoolError),

    /// The cache server rejected or failed a command.
    #[error("cache command failed: {0}")]
    Command(#[from] RedisError),

    /// The pool could not be built from the configuration.
    #[error("cache setup failed: {0}")]
    Setup(String),

    /// The operation did not finish in time.
    #[error("cache operation timed out after {}ms", .0.as_millis())]
    Timeout(Duration),
}

impl CacheError {
    /// Creates a new setup error.
    pub fn setup(msg: impl Into<String>) -> Self {
        Self::Setup(msg.into())
    }

    /// Short label used for metrics and log fields.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pool(_) => "pool",
            Self::Command(_) => "command",
            Self::Setup(_) => "setup",
            Self::Timeout(_) => "timeout",
        }
    }
}
