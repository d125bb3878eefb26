//! HTTP handlers.

pub mod health;
pub mod metrics;
pub mod stress;
pub mod users;
