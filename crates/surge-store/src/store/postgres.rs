//! Postgres user store.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use surge_core::{Error, NewUser, Result, User, UserId};
use tracing::{debug, info, instrument};

use super::UserStore;
use crate::metrics::record_store_query;

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS users (
        id BIGSERIAL PRIMARY KEY,
        name VARCHAR(100) NOT NULL,
        email VARCHAR(100) NOT NULL UNIQUE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
"#;

// `id` breaks ties between rows inserted in the same transaction.
const SELECT_ALL: &str =
    "SELECT id, name, email, created_at FROM users ORDER BY created_at DESC, id DESC";

const SELECT_ONE: &str = "SELECT id, name, email, created_at FROM users WHERE id = $1";

const INSERT_RETURNING: &str = r#"
    INSERT INTO users (name, email)
    VALUES ($1, $2)
    RETURNING id, name, email, created_at
"#;

/// Connection settings for the Postgres pool.
///
/// Credentials travel as discrete [`PgConnectOptions`] fields, so passwords
/// containing `@`, `/`, `#` or `:` need no escaping.
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    pub options: PgConnectOptions,
    /// Maximum number of pooled connections.
    pub pool_size: u32,
    /// Bound on acquiring a connection from the pool.
    pub acquire_timeout: Duration,
}

impl PostgresConfig {
    pub fn new(options: PgConnectOptions) -> Self {
        Self {
            options,
            pool_size: 10,
            acquire_timeout: Duration::from_secs(3),
        }
    }

    /// Parses a connection URL, e.g. `postgres://app:secret@db:5432/app`.
    pub fn from_url(url: &str) -> Result<Self> {
        let options = url
            .parse::<PgConnectOptions>()
            .map_err(|e| Error::store_unavailable_with_cause("invalid database url", e))?;
        Ok(Self::new(options))
    }

    /// `user@host:port/database`, without the password.
    pub fn target(&self) -> String {
        format!(
            "{}@{}:{}/{}",
            self.options.get_username(),
            self.options.get_host(),
            self.options.get_port(),
            self.options.get_database().unwrap_or_default()
        )
    }
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self::new(
            PgConnectOptions::new()
                .host("127.0.0.1")
                .port(5432)
                .username("postgres"),
        )
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    name: String,
    email: String,
    created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            email: row.email,
            created_at: row.created_at,
        }
    }
}

/// User store backed by Postgres.
///
/// Cloning shares the underlying pool.
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    /// Builds the pool without opening a connection, so the process can start
    /// while the database is still coming up.
    #[instrument(skip(config), fields(target = %config.target()))]
    pub fn connect_lazy(config: &PostgresConfig) -> Self {
        info!(
            pool_size = config.pool_size,
            acquire_timeout_ms = config.acquire_timeout.as_millis() as u64,
            "Creating PostgreSQL connection pool"
        );

        let pool = PgPoolOptions::new()
            .max_connections(config.pool_size)
            .acquire_timeout(config.acquire_timeout)
            .connect_lazy_with(config.options.clone());

        Self { pool }
    }

    /// Wraps an existing pool.
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the `users` table if it does not exist yet.
    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(CREATE_TABLE)
            .execute(&self.pool)
            .await
            .map_err(unavailable)?;

        debug!("users table ready");
        Ok(())
    }

    /// Closes every pooled connection. Pending queries finish first.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn list(&self) -> Result<Vec<User>> {
        let start = Instant::now();
        let rows = sqlx::query_as::<_, UserRow>(SELECT_ALL)
            .fetch_all(&self.pool)
            .await
            .map_err(unavailable)?;
        record_store_query("list", start.elapsed());

        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn find(&self, id: UserId) -> Result<Option<User>> {
        let start = Instant::now();
        let row = sqlx::query_as::<_, UserRow>(SELECT_ONE)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(unavailable)?;
        record_store_query("find", start.elapsed());

        Ok(row.map(User::from))
    }

    async fn insert(&self, new: &NewUser) -> Result<User> {
        let start = Instant::now();
        let row = sqlx::query_as::<_, UserRow>(INSERT_RETURNING)
            .bind(&new.name)
            .bind(&new.email)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(ref db_err) = e
                    && db_err.is_unique_violation()
                {
                    return Error::conflict(
                        "email",
                        format!("email '{}' is already registered", new.email),
                    );
                }
                unavailable(e)
            })?;
        record_store_query("insert", start.elapsed());

        Ok(row.into())
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(unavailable)?;
        Ok(())
    }

    fn name(&self) -> &str {
        "postgres"
    }
}

fn unavailable(err: sqlx::Error) -> Error {
    Error::store_unavailable_with_cause(err.to_string(), err)
}

/// Masks the password in a connection URL for logging.
pub(crate) fn mask_password(url: &str) -> String {
    let scheme_end = url.find("://").map(|p| p + 3).unwrap_or(0);
    let Some(at_pos) = url[scheme_end..].rfind('@').map(|p| p + scheme_end) else {
        return url.to_string();
    };

    match url[scheme_end..at_pos].find(':') {
        Some(colon) => format!("{}:****{}", &url[..scheme_end + colon], &url[at_pos..]),
        None => url.to_string(),
    }
}
