//! Surge Core - Domain types and traits
//!
//! This crate provides the foundational types shared by the Surge store and
//! server crates: the [`User`] entity, the caller-facing [`Error`] taxonomy and
//! the synthetic [`load`] unit.

pub mod error;
pub mod load;
pub mod user;

pub use error::{Error, ErrorKind, Result};
pub use load::{LoadOutcome, run_load};
pub use user::{MAX_FIELD_LEN, NewUser, User, UserId};

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
