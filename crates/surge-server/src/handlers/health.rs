//! Health, liveness and readiness endpoints.
//!
//! `/health` and `/health/live` always answer 200; only `/health/ready`
//! depends on the store. The cache never gates any of them.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use axum::{Json, extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;

use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyStatus {
    Connected,
    Disconnected,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: DependencyStatus,
    pub redis: DependencyStatus,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct LivenessResponse {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    pub status: &'static str,
    pub database: DependencyStatus,
}

/// GET /health
///
/// Reports both dependencies, checked concurrently. `status` stays "healthy"
/// whatever they answer.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let timeout = state.health_timeout();
    let repository = state.repository();

    let (database, redis) = tokio::join!(
        check_dependency("database", timeout, repository.store().ping()),
        check_dependency("cache", timeout, repository.cache().ping()),
    );

    Json(HealthResponse {
        status: "healthy",
        database,
        redis,
        timestamp: Utc::now(),
    })
}

/// GET /health/live
pub async fn liveness() -> Json<LivenessResponse> {
    Json(LivenessResponse { status: "alive" })
}

/// GET /health/ready
pub async fn readiness(State(state): State<AppState>) -> (StatusCode, Json<ReadinessResponse>) {
    let database = check_dependency(
        "database",
        state.health_timeout(),
        state.repository().store().ping(),
    )
    .await;

    match database {
        DependencyStatus::Connected => (
            StatusCode::OK,
            Json(ReadinessResponse {
                status: "ready",
                database,
            }),
        ),
        DependencyStatus::Disconnected => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ReadinessResponse {
                status: "not_ready",
                database,
            }),
        ),
    }
}

async fn check_dependency<F, E>(dependency: &'static str, timeout: Duration, ping: F) -> DependencyStatus
where
    F: Future<Output = Result<(), E>>,
    E: Display,
{
    match tokio::time::timeout(timeout, ping).await {
        Ok(Ok(())) => DependencyStatus::Connected,
        Ok(Err(e)) => {
            warn!(dependency, error = %e, "Health check failed");
            DependencyStatus::Disconnected
        },
        Err(_) => {
            warn!(
                dependency,
                timeout_ms = timeout.as_millis() as u64,
                "Health check timed out"
            );
            DependencyStatus::Disconnected
        },
    }
}
