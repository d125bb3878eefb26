//! Cache key layout.

use std::fmt;

use surge_core::UserId;

/// Key of a cache entry.
///
/// There are exactly two shapes: the whole collection under one fixed key, and
/// one entry per user identity.
///
/// # Examples
///
/// ```
/// use surge_store::CacheKey;
///
/// assert_eq!(CacheKey::Collection.to_string(), "users:all");
/// assert_eq!(CacheKey::User(42).to_string(), "user:42");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// The full user collection, newest first.
    Collection,
    /// A single user.
    User(UserId),
}

impl CacheKey {
    /// Returns the metrics label for this key shape.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Collection => "collection",
            Self::User(_) => "user",
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Collection => f.write_str("users:all"),
            Self::User(id) => write!(f, "user:{id}"),
        }
    }
}
