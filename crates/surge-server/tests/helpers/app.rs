//! In-memory application wiring.

use std::sync::Arc;
use std::time::Duration;

use metrics_exporter_prometheus::PrometheusBuilder;
use surge_server::{AppState, create_router_with_state};
use surge_store::{
    CacheLayer, MemoryCache, MemoryStore, RedisCache, RedisCacheConfig, RepositoryConfig,
    UserRepository,
};

use super::client::TestClient;

/// Router backed by in-memory collaborators, plus a handle on the store.
pub struct TestApp {
    pub client: TestClient,
    pub store: Arc<MemoryStore>,
}

/// App con store y cache en memoria.
pub fn app() -> TestApp {
    build(Arc::new(MemoryCache::default()), 1_000)
}

/// App con una carga sintetica de N iteraciones.
pub fn app_with_iterations(iterations: u64) -> TestApp {
    build(Arc::new(MemoryCache::default()), iterations)
}

/// App con el cache dado.
pub fn app_with_cache(cache: Arc<dyn CacheLayer>) -> TestApp {
    build(cache, 1_000)
}

/// Redis cache pointing at a port nobody listens on.
pub fn unreachable_redis() -> Arc<dyn CacheLayer> {
    let config = RedisCacheConfig {
        url: "redis://127.0.0.1:1".to_string(),
        pool_size: 2,
        connect_timeout: Duration::from_millis(100),
    };
    Arc::new(RedisCache::new(&config).unwrap())
}

fn build(cache: Arc<dyn CacheLayer>, iterations: u64) -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let repository = Arc::new(UserRepository::new(
        store.clone(),
        cache,
        RepositoryConfig::default(),
    ));
    let state = AppState::new(repository, iterations, Duration::from_millis(500));

    // Recorder local: no instala un recorder global
    let handle = PrometheusBuilder::new().build_recorder().handle();

    TestApp {
        client: TestClient::new(create_router_with_state(state, handle)),
        store,
    }
}
