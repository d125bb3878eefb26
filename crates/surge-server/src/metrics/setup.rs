//! Metrics setup and initialization.

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use tracing::info;

use super::{http::register_http_metrics, load::register_load_metrics};

/// Buckets para histogramas (en segundos). El extremo superior cubre una
/// ejecucion completa de la carga sintetica.
const BUCKETS: &[f64] = &[
    0.0001, // 100 microsegundos
    0.0005, // 500 microsegundos
    0.001,  // 1 milisegundo
    0.005,  // 5 milisegundos
    0.01,   // 10 milisegundos
    0.025,  // 25 milisegundos
    0.05,   // 50 milisegundos
    0.1,    // 100 milisegundos
    0.25,   // 250 milisegundos
    0.5,    // 500 milisegundos
    1.0,    // 1 segundo
    2.5,    // 2.5 segundos
    5.0,    // 5 segundos
    10.0,   // 10 segundos
    30.0,   // 30 segundos
];

/// Installs the global Prometheus recorder, describes every metric and
/// returns the handle for the `/metrics` endpoint.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new()
        .set_buckets(BUCKETS)?
        .install_recorder()?;

    register_http_metrics();
    register_load_metrics();
    surge_store::metrics::register_store_metrics();

    info!("Metrics system initialized");
    Ok(handle)
}
