//! Durable store abstraction.

mod memory;
mod postgres;

use async_trait::async_trait;
use surge_core::{NewUser, Result, User, UserId};

pub use memory::MemoryStore;
pub use postgres::{PgUserStore, PostgresConfig};
pub use sqlx::postgres::PgConnectOptions;
pub(crate) use postgres::mask_password;

/// The source of truth for users.
///
/// Implementations hold no cached state. Every failure other than a unique
/// violation on insert surfaces as `Error::StoreUnavailable`.
///
/// # Implementors
///
/// - `PgUserStore` - Postgres through a `sqlx` pool
/// - `MemoryStore` - in-process rows with query counters, for tests
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Returns every user, newest first.
    async fn list(&self) -> Result<Vec<User>>;

    /// Returns the user with `id`, or `None`.
    async fn find(&self, id: UserId) -> Result<Option<User>>;

    /// Inserts a user and returns it with the store-assigned `id` and
    /// `created_at`, in one round trip.
    ///
    /// # Errors
    ///
    /// - `Error::Conflict` if the email is already registered
    /// - `Error::StoreUnavailable` for anything else
    async fn insert(&self, new: &NewUser) -> Result<User>;

    /// Round-trips to the store to check reachability.
    async fn ping(&self) -> Result<()>;

    /// Returns the name of this store, for logging.
    fn name(&self) -> &str;
}
