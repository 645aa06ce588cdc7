//! SQLite-backed key-value slots.

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use tracing::{debug, info};

use crate::kv::KvStore;
use crate::PersistError;

/// Open (creating if needed) the database at `url` and apply migrations.
pub async fn init_db(url: &str) -> Result<SqlitePool, PersistError> {
    let opts = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
    // One long-lived connection: keeps `sqlite::memory:` databases alive and
    // serializes writes.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(opts)
        .await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    info!(url, "save database ready");
    Ok(pool)
}

/// Key-value slots stored in the `kv_slots` table.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn connect(url: &str) -> Result<Self, PersistError> {
        Ok(Self::new(init_db(url).await?))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl KvStore for SqliteStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>, PersistError> {
        let value = sqlx::query_scalar::<_, String>("SELECT value FROM kv_slots WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(value)
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), PersistError> {
        sqlx::query(
            "INSERT INTO kv_slots (key, value, updated_at) VALUES (?1, ?2, CURRENT_TIMESTAMP) \
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = CURRENT_TIMESTAMP",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;
        debug!(key, bytes = value.len(), "slot written");
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<(), PersistError> {
        sqlx::query("DELETE FROM kv_slots WHERE key = ?1")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
