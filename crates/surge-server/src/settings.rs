//! Service configuration.
//!
//! Layers, lowest precedence first:
//!
//! 1. Built-in defaults
//! 2. A TOML file: `SURGE_CONFIG` if set (must exist), otherwise `surge.toml` if present
//! 3. Legacy deployment variables: `DB_HOST`, `DB_PORT`, `DB_USER`, `DB_PASSWORD`,
//!    `DB_NAME`, `REDIS_HOST`, `PORT`
//! 4. `SURGE__<SECTION>__<KEY>` variables, e.g. `SURGE__SERVER__PORT=9090`

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use surge_store::{PgConnectOptions, PostgresConfig, RedisCacheConfig, RepositoryConfig};
use thiserror::Error;

const DEFAULT_FILE: &str = "surge.toml";

/// Legacy variable name and the key it feeds.
const LEGACY_VARS: &[(&str, &str)] = &[
    ("DB_HOST", "DATABASE__HOST"),
    ("DB_PORT", "DATABASE__PORT"),
    ("DB_USER", "DATABASE__USER"),
    ("DB_PASSWORD", "DATABASE__PASSWORD"),
    ("DB_NAME", "DATABASE__NAME"),
    ("REDIS_HOST", "CACHE__HOST"),
    ("PORT", "SERVER__PORT"),
];

/// Errores de configuracion.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid configuration: {field} must be greater than zero")]
    NotPositive { field: &'static str },

    #[error("invalid configuration: database.url: {0}")]
    DatabaseUrl(#[source] surge_core::Error),
}

/// Complete service configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub cache: CacheSettings,
    pub load: LoadSettings,
    pub health: HealthSettings,
    pub log: LogSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

/// Postgres connection. `url` wins over the individual parts when set.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    pub url: Option<String>,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
    pub pool_size: u32,
    pub connect_timeout_ms: u64,
    /// Bound on each store query issued by the repository.
    pub timeout_ms: u64,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: None,
            host: "localhost".to_string(),
            port: 5432,
            user: "postgres".to_string(),
            password: "postgres".to_string(),
            name: "userdb".to_string(),
            pool_size: 10,
            connect_timeout_ms: 3_000,
            timeout_ms: 5_000,
        }
    }
}

impl DatabaseSettings {
    /// Pool settings for the store. The parts are passed as discrete fields,
    /// never spliced into a URL, so credentials need no escaping.
    pub fn to_postgres_config(&self) -> Result<PostgresConfig, SettingsError> {
        let mut config = match &self.url {
            Some(url) => PostgresConfig::from_url(url).map_err(SettingsError::DatabaseUrl)?,
            None => PostgresConfig::new(
                PgConnectOptions::new()
                    .host(&self.host)
                    .port(self.port)
                    .username(&self.user)
                    .password(&self.password)
                    .database(&self.name),
            ),
        };

        config.pool_size = self.pool_size;
        config.acquire_timeout = Duration::from_millis(self.connect_timeout_ms);
        Ok(config)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    Redis,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    pub backend: CacheBackend,
    pub url: Option<String>,
    pub host: String,
    pub port: u16,
    pub pool_size: usize,
    /// Bound on each cache operation; exceeding it counts as a miss.
    pub timeout_ms: u64,
    pub ttl_secs: u64,
    /// Entry limit for the `memory` backend.
    pub max_capacity: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            backend: CacheBackend::Redis,
            url: None,
            host: "localhost".to_string(),
            port: 6379,
            pool_size: 16,
            timeout_ms: 250,
            ttl_secs: 300,
            max_capacity: 10_000,
        }
    }
}

impl CacheSettings {
    pub fn url(&self) -> String {
        match &self.url {
            Some(url) => url.clone(),
            None => format!("redis://{}:{}", self.host, self.port),
        }
    }

    pub fn to_redis_config(&self) -> RedisCacheConfig {
        RedisCacheConfig {
            url: self.url(),
            pool_size: self.pool_size,
            connect_timeout: Duration::from_millis(self.timeout_ms),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadSettings {
    pub iterations: u64,
}

impl Default for LoadSettings {
    fn default() -> Self {
        Self {
            iterations: 100_000_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthSettings {
    /// Bound on each dependency ping.
    pub timeout_ms: u64,
}

impl Default for HealthSettings {
    fn default() -> Self {
        Self { timeout_ms: 1_000 }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    pub format: LogFormat,
}

impl Settings {
    /// Loads settings from the process environment and the optional file.
    pub fn load() -> Result<Self, SettingsError> {
        Self::from_vars(std::env::vars().collect())
    }

    /// Loads settings from the given variables instead of the process
    /// environment. The file layer is still read from disk.
    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self, SettingsError> {
        let mut builder = Config::builder();

        match vars.get("SURGE_CONFIG") {
            Some(path) => builder = builder.add_source(File::from(PathBuf::from(path))),
            None => {
                builder = builder.add_source(File::with_name(DEFAULT_FILE).required(false));
            },
        }

        let legacy: HashMap<String, String> = LEGACY_VARS
            .iter()
            .filter_map(|(name, key)| {
                vars.get(*name)
                    .filter(|v| !v.is_empty())
                    .map(|v| (key.to_string(), v.clone()))
            })
            .collect();

        // Values stay strings; numeric fields are converted on deserialize, so
        // a password like `007` keeps its leading zeros.
        builder = builder
            .add_source(Environment::default().separator("__").source(Some(legacy)))
            .add_source(
                Environment::with_prefix("SURGE")
                    .separator("__")
                    .source(Some(vars)),
            );

        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Rejects values that would make the service unusable.
    pub fn validate(&self) -> Result<(), SettingsError> {
        let checks: [(&'static str, bool); 10] = [
            ("server.port", self.server.port == 0),
            ("database.port", self.database.port == 0),
            ("database.pool_size", self.database.pool_size == 0),
            ("database.timeout_ms", self.database.timeout_ms == 0),
            ("cache.pool_size", self.cache.pool_size == 0),
            ("cache.timeout_ms", self.cache.timeout_ms == 0),
            ("cache.ttl_secs", self.cache.ttl_secs == 0),
            ("cache.max_capacity", self.cache.max_capacity == 0),
            ("load.iterations", self.load.iterations == 0),
            ("health.timeout_ms", self.health.timeout_ms == 0),
        ];

        if let Some((field, _)) = checks.into_iter().find(|(_, zero)| *zero) {
            return Err(SettingsError::NotPositive { field });
        }

        self.database.to_postgres_config()?;
        Ok(())
    }

    pub fn repository_config(&self) -> RepositoryConfig {
        RepositoryConfig {
            cache_ttl: Duration::from_secs(self.cache.ttl_secs),
            cache_timeout: Duration::from_millis(self.cache.timeout_ms),
            store_timeout: Duration::from_millis(self.database.timeout_ms),
        }
    }

    pub fn health_timeout(&self) -> Duration {
        Duration::from_millis(self.health.timeout_ms)
    }
}
