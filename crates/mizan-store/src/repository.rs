//! SQLite implementation of the local store port
//!
//! A deliberately small key/value record store. The sync engine and the CLI
//! never see SQL; they read and write JSON strings through the
//! [`ILocalStore`] port, and the two record keys they use are defined next
//! to the port itself.

use chrono::Utc;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use mizan_core::ports::local_store::{ILocalStore, LocalStoreError};

use crate::StoreError;

/// SQLite-backed key/value store
///
/// All operations go through a connection pool; writes upsert on the key.
pub struct SqliteLocalStore {
    pool: SqlitePool,
}

impl SqliteLocalStore {
    /// Creates a new store instance with the given connection pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn get_inner(&self, key: &str) -> Result<Option<String>, StoreError> {
        let row = sqlx::query("SELECT value FROM records WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| r.get::<String, _>("value")))
    }

    async fn set_inner(&self, key: &str, value: &str) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO records (key, value, updated_at) VALUES (?, ?, ?)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value,
                                            updated_at = excluded.updated_at",
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        debug!(key, bytes = value.len(), "Record written");
        Ok(())
    }

    async fn remove_inner(&self, key: &str) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM records WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await?;

        debug!(key, "Record removed");
        Ok(())
    }
}

#[async_trait::async_trait]
impl ILocalStore for SqliteLocalStore {
    async fn get(&self, key: &str) -> Result<Option<String>, LocalStoreError> {
        self.get_inner(key)
            .await
            .map_err(|e| LocalStoreError::Storage(e.to_string()))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), LocalStoreError> {
        self.set_inner(key, value)
            .await
            .map_err(|e| LocalStoreError::Storage(e.to_string()))
    }

    async fn remove(&self, key: &str) -> Result<(), LocalStoreError> {
        self.remove_inner(key)
            .await
            .map_err(|e| LocalStoreError::Storage(e.to_string()))
    }
}
