//! Cache and store metrics recording.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use metrics::{counter, histogram};

/// Describes the cache and store metrics.
/// Call once at startup, after the recorder is installed.
pub fn register_store_metrics() {
    metrics::describe_counter!("surge_cache_hits_total", "Total number of cache hits");
    metrics::describe_counter!("surge_cache_misses_total", "Total number of cache misses");
    metrics::describe_counter!(
        "surge_cache_degraded_total",
        "Cache operations that failed and fell back to the store"
    );
    metrics::describe_counter!(
        "surge_cache_invalidations_total",
        "Cache entries invalidated after a write"
    );
    metrics::describe_counter!(
        "surge_cache_evictions_total",
        "Entries evicted from the in-process cache"
    );
    metrics::describe_histogram!(
        "surge_cache_operation_seconds",
        "Time spent on cache operations"
    );
    metrics::describe_histogram!(
        "surge_store_query_seconds",
        "Time spent on store queries"
    );
}

/// Cache outcome recorder.
///
/// Keeps its own atomic counters next to the global recorder so that tests and
/// logs can read the hit rate without scraping `/metrics`.
#[derive(Debug, Clone, Default)]
pub struct CacheMetrics {
    hits: Arc<AtomicU64>,
    misses: Arc<AtomicU64>,
    degraded: Arc<AtomicU64>,
}

impl CacheMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_hit(&self, key_kind: &'static str) {
        self.hits.fetch_add(1, Ordering::Relaxed);
        counter!("surge_cache_hits_total", "key" => key_kind).increment(1);
    }

    pub fn record_miss(&self, key_kind: &'static str) {
        self.misses.fetch_add(1, Ordering::Relaxed);
        counter!("surge_cache_misses_total", "key" => key_kind).increment(1);
    }

    /// Records a cache failure for `operation` (get, set, delete).
    pub fn record_degraded(&self, operation: &'static str, reason: &'static str) {
        self.degraded.fetch_add(1, Ordering::Relaxed);
        counter!(
            "surge_cache_degraded_total",
            "operation" => operation,
            "reason" => reason
        )
        .increment(1);
    }

    pub fn record_invalidation(&self, key_kind: &'static str) {
        counter!("surge_cache_invalidations_total", "key" => key_kind).increment(1);
    }

    pub fn record_eviction(&self, cause: &'static str) {
        counter!("surge_cache_evictions_total", "cause" => cause).increment(1);
    }

    pub fn record_operation_duration(&self, operation: &'static str, duration: Duration) {
        histogram!("surge_cache_operation_seconds", "operation" => operation)
            .record(duration.as_secs_f64());
    }

    /// Fraction of lookups served from the cache.
    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits() as f64;
        let total = hits + self.misses() as f64;
        if total == 0.0 { 0.0 } else { hits / total }
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Misses, including lookups that degraded.
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn degraded(&self) -> u64 {
        self.degraded.load(Ordering::Relaxed)
    }
}

/// Records the duration of a store query.
pub fn record_store_query(operation: &'static str, duration: Duration) {
    histogram!("surge_store_query_seconds", "operation" => operation)
        .record(duration.as_secs_f64());
}
