//! Application state.

use std::sync::Arc;
use std::time::Duration;

use surge_store::UserRepository;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    repository: Arc<UserRepository>,
    load_iterations: u64,
    health_timeout: Duration,
}

impl AppState {
    /// Creates a new AppState around the given repository.
    pub fn new(repository: Arc<UserRepository>, load_iterations: u64, health_timeout: Duration) -> Self {
        Self {
            repository,
            load_iterations,
            health_timeout,
        }
    }

    /// Returns the user repository.
    pub fn repository(&self) -> &UserRepository {
        self.repository.as_ref()
    }

    /// Iterations run by each call to the stress endpoint.
    pub fn load_iterations(&self) -> u64 {
        self.load_iterations
    }

    /// Bound on each dependency ping made by the health endpoints.
    pub fn health_timeout(&self) -> Duration {
        self.health_timeout
    }
}
