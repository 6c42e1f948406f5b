//! Connection pool setup.

use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;

use crate::error::Result;

#[derive(Debug, Clone)]
pub struct PoolConfig {
    pub url: String,
    pub max_open_conns: u32,
    pub max_idle_conns: u32,
    pub conn_max_lifetime_secs: u64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            url: "sqlite::memory:".to_string(),
            max_open_conns: 10,
            max_idle_conns: 5,
            conn_max_lifetime_secs: 1800,
        }
    }
}

impl PoolConfig {
    /// A single-connection pool against `sqlite::memory:`. Each new
    /// connection to an in-memory SQLite database gets its own, separate
    /// database, so pooling more than one connection here would silently
    /// scatter state across unrelated empty databases - matching the
    /// `max_connections: 1` convention this corpus uses for in-memory pools.
    pub fn sqlite_memory() -> Self {
        Self {
            max_open_conns: 1,
            max_idle_conns: 1,
            ..Self::default()
        }
    }

    pub fn sqlite_file(path: impl Into<String>) -> Self {
        Self {
            url: format!("sqlite://{}?mode=rwc", path.into()),
            ..Self::default()
        }
    }
}

/// Builds the pool with the pragmas baked into `SqliteConnectOptions` rather
/// than run as one-shot queries after connecting: `foreign_keys` is
/// connection-scoped and defaults to OFF, so a one-shot `PRAGMA` only ever
/// reaches the single connection it happened to run on, leaving every other
/// physical connection the pool opens under load without cascade-delete
/// support. Baking it into the options applies it to every connection,
/// including ones opened later to grow the pool.
pub async fn create_pool(config: &PoolConfig) -> Result<SqlitePool> {
    let options: SqliteConnectOptions = config.url.parse()?;
    let options = options
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_open_conns)
        .min_connections(config.max_idle_conns.min(config.max_open_conns))
        .max_lifetime(Duration::from_secs(config.conn_max_lifetime_secs))
        .connect_with(options)
        .await?;

    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn creates_in_memory_pool() {
        let pool = create_pool(&PoolConfig::sqlite_memory()).await.unwrap();
        let row: (i64,) = sqlx::query_as("SELECT 1").fetch_one(&pool).await.unwrap();
        assert_eq!(row.0, 1);
    }
}
