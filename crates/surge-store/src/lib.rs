//! # Surge Store
//!
//! Data access for the Surge service: a durable Postgres store, an expiring
//! cache in front of it, and the cache-aside [`UserRepository`] that mediates
//! between the two.
//!
//! ## Features
//!
//! - [`UserStore`] trait with a `sqlx` Postgres implementation and an
//!   in-memory one that counts queries
//! - [`CacheLayer`] trait with a Redis implementation (`deadpool-redis`) and an
//!   in-process one (`moka`)
//! - Cache failures never reach the caller: they degrade to a store read
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use surge_store::{MemoryCache, MemoryStore, RepositoryConfig, UserRepository};
//!
//! let repository = UserRepository::new(
//!     Arc::new(MemoryStore::new()),
//!     Arc::new(MemoryCache::default()),
//!     RepositoryConfig::default(),
//! );
//!
//! let users = repository.list_users().await?;
//! println!("{}", String::from_utf8_lossy(users.body()));
//! ```

pub mod cache;
pub mod error;
pub mod keys;
pub mod metrics;
pub mod repository;
pub mod store;

// Re-exports
pub use cache::{CacheLayer, CacheLookup, MemoryCache, RedisCache, RedisCacheConfig};
pub use error::CacheError;
pub use keys::CacheKey;
pub use metrics::CacheMetrics;
pub use repository::{Fetched, Origin, RepositoryConfig, UserRepository};
pub use store::{MemoryStore, PgConnectOptions, PgUserStore, PostgresConfig, UserStore};

// Re-export surge_core for consumers
pub use surge_core;
