//! Synthetic CPU load endpoint.

use std::time::Instant;

use axum::{Json, extract::State};
use serde::Serialize;
use surge_core::{Error, run_load};
use tracing::{info, instrument};

use crate::error::AppError;
use crate::metrics::load::record_load_run;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct StressResponse {
    pub message: &'static str,
    pub result: u64,
    pub iterations: u64,
}

/// GET /api/stress
///
/// Runs the load unit on the blocking pool and waits for it, so the request
/// holds for the whole computation while async workers keep serving health checks.
#[instrument(skip_all)]
pub async fn stress(State(state): State<AppState>) -> Result<Json<StressResponse>, AppError> {
    let iterations = state.load_iterations();
    let start = Instant::now();

    let outcome = tokio::task::spawn_blocking(move || run_load(iterations))
        .await
        .map_err(|e| Error::internal_with_cause("load task failed", e))?;

    let elapsed = start.elapsed();
    record_load_run(elapsed);
    info!(
        iterations,
        duration_ms = elapsed.as_millis() as u64,
        "Stress test completed"
    );

    Ok(Json(StressResponse {
        message: "Stress test completed",
        result: outcome.result,
        iterations: outcome.iterations,
    }))
}
