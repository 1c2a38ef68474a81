//! MySQL storage implementation
//!
//! Backed by a sqlx connection pool. Each call checks a connection out of the
//! pool for the duration of one statement and hands it back afterwards.

use crate::config::MySqlTarget;
use crate::listing::{AdRecord, StoredListing};
use crate::storage::schema::Dialect;
use crate::storage::traits::{ListingStore, RowId, StorageError, StorageResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions, MySqlRow};
use sqlx::Row;

/// MySQL storage backend
#[derive(Debug, Clone)]
pub struct MySqlStore {
    pool: MySqlPool,
    database: String,
}

impl MySqlStore {
    /// Creates a store whose pool opens connections on first use
    ///
    /// Must be called from within a Tokio runtime. Connection problems surface
    /// on the first query, which is the schema check at the start of a run.
    pub fn connect_lazy(target: &MySqlTarget, max_connections: u32) -> Self {
        let pool = MySqlPoolOptions::new()
            .max_connections(max_connections)
            .connect_lazy_with(connect_options(target));

        Self {
            pool,
            database: target.database.clone(),
        }
    }

    /// Name of the database (schema) this store writes to
    pub fn database(&self) -> &str {
        &self.database
    }
}

/// Builds connection options from validated settings
pub fn connect_options(target: &MySqlTarget) -> MySqlConnectOptions {
    MySqlConnectOptions::new()
        .host(&target.host)
        .username(&target.user)
        .password(&target.password)
        .database(&target.database)
}

fn listing_from_row(row: &MySqlRow) -> StorageResult<StoredListing> {
    let created_at: Option<DateTime<Utc>> = row.try_get("created_at")?;
    let created_at = created_at
        .ok_or_else(|| StorageError::Decode("created_at is NULL".to_string()))?;

    Ok(StoredListing {
        id: i64::from(row.try_get::<i32, _>("id")?),
        record: AdRecord {
            url: row.try_get("url")?,
            thumbnail: row.try_get("thumbnail")?,
            title: row.try_get("title")?,
            price: row.try_get("price")?,
            area: row.try_get("area")?,
            address: row.try_get("address")?,
        },
        created_at,
    })
}

#[async_trait]
impl ListingStore for MySqlStore {
    fn dialect(&self) -> Dialect {
        Dialect::MySql
    }

    async fn table_exists(&self, name: &str) -> StorageResult<bool> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM information_schema.tables WHERE table_schema = ? AND table_name = ?",
        )
        .bind(self.database.as_str())
        .bind(name)
        .fetch_one(&self.pool)
        .await?;

        Ok(count > 0)
    }

    async fn create_table(&self, ddl: &str) -> StorageResult<()> {
        sqlx::query(ddl).execute(&self.pool).await?;
        Ok(())
    }

    async fn exists_by_url(&self, url: &str) -> StorageResult<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM scraped_data WHERE url = ?")
            .bind(url)
            .fetch_one(&self.pool)
            .await?;

        Ok(count > 0)
    }

    async fn insert(&self, record: &AdRecord) -> StorageResult<RowId> {
        let result = sqlx::query(
            "INSERT INTO scraped_data (url, thumbnail, title, price, area, address) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(record.url.as_deref())
        .bind(record.thumbnail.as_deref())
        .bind(record.title.as_deref())
        .bind(record.price.as_deref())
        .bind(record.area.as_deref())
        .bind(record.address.as_deref())
        .execute(&self.pool)
        .await?;

        RowId::try_from(result.last_insert_id()).map_err(|_| {
            StorageError::Decode(format!(
                "insert id {} does not fit in a row id",
                result.last_insert_id()
            ))
        })
    }

    async fn list_listings(&self) -> StorageResult<Vec<StoredListing>> {
        let rows = sqlx::query(
            "SELECT id, url, thumbnail, title, price, area, address, created_at
             FROM scraped_data ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(listing_from_row).collect()
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target() -> MySqlTarget {
        MySqlTarget {
            host: "127.0.0.1".to_string(),
            user: "scout".to_string(),
            password: "secret".to_string(),
            database: "finn".to_string(),
        }
    }

    #[tokio::test]
    async fn test_connect_lazy_does_not_touch_the_network() {
        let store = MySqlStore::connect_lazy(&target(), 4);
        assert_eq!(store.dialect(), Dialect::MySql);
        assert_eq!(store.database(), "finn");
        store.close().await;
    }
}
