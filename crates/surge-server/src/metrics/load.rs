//! Synthetic load metrics.

use std::time::Duration;

use metrics::{counter, histogram};

/// Registra una ejecucion del endpoint de carga.
pub fn record_load_run(duration: Duration) {
    counter!("surge_load_runs_total").increment(1);
    histogram!("surge_load_duration_seconds").record(duration.as_secs_f64());
}

pub fn register_load_metrics() {
    metrics::describe_counter!(
        "surge_load_runs_total",
        "Completed synthetic load runs"
    );
    metrics::describe_histogram!(
        "surge_load_duration_seconds",
        metrics::Unit::Seconds,
        "Wall time of one synthetic load run"
    );
}
