//! Metrics for the Surge server.

pub mod http;
pub mod load;
pub mod setup;

pub use setup::init_metrics;
