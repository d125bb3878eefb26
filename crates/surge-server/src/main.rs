//! Surge server binary.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use surge_server::settings::{CacheBackend, LogFormat, Settings};
use surge_server::{AppState, metrics::init_metrics, run_server_with_state};
use surge_store::{
    CacheLayer, MemoryCache, PgUserStore, RedisCache, UserRepository, UserStore,
};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing(format: LogFormat) {
    let registry = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")));

    match format {
        LogFormat::Pretty => registry.with(fmt::layer()).init(),
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("failed to load configuration")?;

    init_tracing(settings.log.format);
    info!("Starting Surge server v{}", env!("CARGO_PKG_VERSION"));

    let prometheus = init_metrics().context("failed to initialize metrics")?;

    // Database
    let postgres = settings
        .database
        .to_postgres_config()
        .context("invalid database configuration")?;
    let store = PgUserStore::connect_lazy(&postgres);

    match store.ensure_schema().await {
        Ok(()) => info!("Connected to database, users table ready"),
        Err(e) => warn!(error = %e, "Database not ready at startup, readiness will report it"),
    }

    // Cache
    let cache: Arc<dyn CacheLayer> = match settings.cache.backend {
        CacheBackend::Redis => Arc::new(
            RedisCache::new(&settings.cache.to_redis_config())
                .context("failed to configure cache pool")?,
        ),
        CacheBackend::Memory => Arc::new(MemoryCache::new(settings.cache.max_capacity)),
    };

    match tokio::time::timeout(settings.health_timeout(), cache.ping()).await {
        Ok(Ok(())) => info!(cache = cache.name(), "Connected to cache"),
        Ok(Err(e)) => warn!(cache = cache.name(), error = %e, "Cache unreachable, reads will go to the database"),
        Err(_) => warn!(cache = cache.name(), "Cache ping timed out, reads will go to the database"),
    }

    let repository = Arc::new(UserRepository::new(
        Arc::new(store.clone()) as Arc<dyn UserStore>,
        cache,
        settings.repository_config(),
    ));
    let state = AppState::new(
        repository,
        settings.load.iterations,
        settings.health_timeout(),
    );

    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port)
        .parse()
        .context("invalid listen address")?;

    run_server_with_state(addr, state, prometheus).await?;

    store.close().await;
    info!("Shutdown complete");

    Ok(())
}
