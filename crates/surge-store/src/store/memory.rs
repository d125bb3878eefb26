//! In-memory user store.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use surge_core::{Error, NewUser, Result, User, UserId};

use super::UserStore;

#[derive(Default)]
struct Rows {
    users: Vec<User>,
    last_id: UserId,
}

/// User store kept in process memory.
///
/// Behaves like the Postgres store (ids from 1, unique emails, newest first)
/// and counts every read so tests can tell whether a request reached it.
/// [`set_available`](Self::set_available) simulates an outage.
#[derive(Default)]
pub struct MemoryStore {
    rows: Mutex<Rows>,
    reads: AtomicU64,
    writes: AtomicU64,
    unavailable: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `list` and `find` calls that reached the store.
    pub fn read_count(&self) -> u64 {
        self.reads.load(Ordering::SeqCst)
    }

    /// Number of `insert` calls that reached the store.
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::SeqCst)
    }

    /// Number of stored rows.
    pub fn len(&self) -> usize {
        self.rows.lock().users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Makes every call fail with `StoreUnavailable` while `false`.
    pub fn set_available(&self, available: bool) {
        self.unavailable.store(!available, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(Error::store_unavailable("memory store is offline"));
        }
        Ok(())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn list(&self) -> Result<Vec<User>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;

        let mut users = self.rows.lock().users.clone();
        users.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(users)
    }

    async fn find(&self, id: UserId) -> Result<Option<User>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;

        Ok(self.rows.lock().users.iter().find(|u| u.id == id).cloned())
    }

    async fn insert(&self, new: &NewUser) -> Result<User> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;

        let mut rows = self.rows.lock();
        if rows.users.iter().any(|u| u.email == new.email) {
            return Err(Error::conflict(
                "email",
                format!("email '{}' is already registered", new.email),
            ));
        }

        rows.last_id += 1;
        let user = User {
            id: rows.last_id,
            name: new.name.clone(),
            email: new.email.clone(),
            created_at: Utc::now(),
        };
        rows.users.push(user.clone());

        Ok(user)
    }

    async fn ping(&self) -> Result<()> {
        self.check_available()
    }

    fn name(&self) -> &str {
        "memory"
    }
}
