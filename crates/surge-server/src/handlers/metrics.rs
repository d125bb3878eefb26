//! Prometheus scrape endpoint.

use axum::extract::State;
use metrics_exporter_prometheus::PrometheusHandle;

/// GET /metrics, in the Prometheus text format.
pub async fn render_metrics(State(handle): State<PrometheusHandle>) -> String {
    handle.render()
}
