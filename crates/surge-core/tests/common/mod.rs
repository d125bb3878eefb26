#![allow(dead_code)]
use chrono::{TimeZone, Utc};
use surge_core::User;

/// Builds a user with a fixed timestamp so JSON output is predictable.
pub fn user(id: i64, name: &str, email: &str) -> User {
    User {
        id,
        name: name.to_string(),
        email: email.to_string(),
        created_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
    }
}
