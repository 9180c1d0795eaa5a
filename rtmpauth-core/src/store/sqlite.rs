//! SQLite-backed publisher store
//!
//! One row per (field group, publisher). Every write is a standalone
//! statement; nothing here opens a transaction.

use async_trait::async_trait;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Row, SqlitePool,
};
use tracing::{debug, info};

use super::{FieldGroup, PublisherStore};
use crate::{Error, Result};

/// SQLite publisher store
#[derive(Clone)]
pub struct SqlitePublisherStore {
    pool: SqlitePool,
}

impl SqlitePublisherStore {
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (creating if missing) the database file and ensure the schema
    pub async fn open(path: &str) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await?;

        let store = Self::new(pool);
        store.ensure_schema().await?;
        info!(path = %path, "Publisher store opened");
        Ok(store)
    }

    /// Private in-memory database, single connection so all queries share it
    pub async fn open_in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;

        let store = Self::new(pool);
        store.ensure_schema().await?;
        Ok(store)
    }

    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS publisher_fields (
                field_group TEXT NOT NULL,
                name        TEXT NOT NULL,
                value       TEXT NOT NULL,
                PRIMARY KEY (field_group, name)
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        debug!("Publisher store schema ensured");
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl PublisherStore for SqlitePublisherStore {
    async fn get_field(&self, group: FieldGroup, name: &str) -> Result<String> {
        let row = sqlx::query(
            r"
            SELECT value
            FROM publisher_fields
            WHERE field_group = ?1 AND name = ?2
            ",
        )
        .bind(group.as_str())
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(row.try_get("value")?),
            None => Ok(String::new()),
        }
    }

    async fn set_field(&self, group: FieldGroup, name: &str, value: &str) -> Result<()> {
        if value.is_empty() {
            sqlx::query(
                r"
                DELETE FROM publisher_fields
                WHERE field_group = ?1 AND name = ?2
                ",
            )
            .bind(group.as_str())
            .bind(name)
            .execute(&self.pool)
            .await?;
        } else {
            sqlx::query(
                r"
                INSERT INTO publisher_fields (field_group, name, value)
                VALUES (?1, ?2, ?3)
                ON CONFLICT (field_group, name) DO UPDATE SET value = excluded.value
                ",
            )
            .bind(group.as_str())
            .bind(name)
            .bind(value)
            .execute(&self.pool)
            .await?;
        }
        Ok(())
    }

    async fn names(&self, group: FieldGroup) -> Result<Vec<String>> {
        let rows = sqlx::query(
            r"
            SELECT name
            FROM publisher_fields
            WHERE field_group = ?1
            ORDER BY name
            ",
        )
        .bind(group.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| row.try_get::<String, _>("name").map_err(Error::from))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Publisher;

    #[tokio::test]
    async fn test_field_roundtrip_and_removal() {
        let store = SqlitePublisherStore::open_in_memory().await.unwrap();

        store.set_field(FieldGroup::Key, "alice", "secret1").await.unwrap();
        assert_eq!(store.get_field(FieldGroup::Key, "alice").await.unwrap(), "secret1");

        store.set_field(FieldGroup::Key, "alice", "secret2").await.unwrap();
        assert_eq!(store.get_field(FieldGroup::Key, "alice").await.unwrap(), "secret2");

        store.set_field(FieldGroup::Key, "alice", "").await.unwrap();
        assert_eq!(store.get_field(FieldGroup::Key, "alice").await.unwrap(), "");
        assert!(matches!(store.get("alice").await, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_get_all_populates_every_group_in_name_order() {
        let store = SqlitePublisherStore::open_in_memory().await.unwrap();
        let mut bob = Publisher::new("bob", "k2").with_external_channel("bob_tv");
        bob.external_live = "live".to_string();
        bob.stream_info = "title: t\ngame: g".to_string();
        store.put(&bob).await.unwrap();
        store.put(&Publisher::new("alice", "k1")).await.unwrap();
        store.stage_notification("alice", "pending").await.unwrap();

        let all = store.get_all().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].name, "alice");
        assert_eq!(all[0].pending_notification, "pending");
        assert_eq!(all[1], bob);
    }

    #[tokio::test]
    async fn test_names_are_case_sensitive() {
        let store = SqlitePublisherStore::open_in_memory().await.unwrap();
        store.put(&Publisher::new("Alice", "upper")).await.unwrap();
        store.put(&Publisher::new("alice", "lower")).await.unwrap();

        assert_eq!(store.get("Alice").await.unwrap().key, "upper");
        assert_eq!(store.get("alice").await.unwrap().key, "lower");
        assert_eq!(store.get_all().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rtmpauth.db");
        let path = path.to_str().unwrap();

        let store = SqlitePublisherStore::open(path).await.unwrap();
        store.put(&Publisher::new("alice", "secret1")).await.unwrap();
        store.set_local_live("alice", "2026-01-01T00:00:00Z").await.unwrap();
        store.close().await;

        let reopened = SqlitePublisherStore::open(path).await.unwrap();
        let alice = reopened.get("alice").await.unwrap();
        assert_eq!(alice.key, "secret1");
        assert!(alice.is_local_live());
    }
}
