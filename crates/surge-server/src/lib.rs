//! Surge Server - HTTP tier for the Surge user service.
//!
//! Exposes the users API backed by the cache-aside repository, a synthetic
//! CPU load endpoint for exercising autoscalers, health checks and Prometheus
//! metrics.

pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod server;
pub mod settings;
pub mod state;

pub use error::AppError;
pub use handlers::health::HealthResponse;
pub use server::{create_router_with_state, run_server_with_state};
pub use settings::Settings;
pub use state::AppState;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
