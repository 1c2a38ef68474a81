//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the ListingStore
//! trait. Each call opens its own connection on the blocking pool, so calls
//! issued from concurrent tasks never share a connection.

use crate::listing::{AdRecord, StoredListing};
use crate::storage::schema::Dialect;
use crate::storage::traits::{ListingStore, RowId, StorageResult};
use async_trait::async_trait;
use chrono::{NaiveDateTime, TimeZone, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// How long a connection waits on a locked database before giving up
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Format SQLite uses for `CURRENT_TIMESTAMP`
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// SQLite storage backend
#[derive(Debug, Clone)]
pub struct SqliteStore {
    path: PathBuf,
}

impl SqliteStore {
    /// Creates a store for the database file at `path`
    ///
    /// Nothing is opened until the first call; the file is created on demand.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Path of the underlying database file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Runs `op` on a fresh connection and closes it afterwards
    async fn with_connection<T, F>(&self, op: F) -> StorageResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> rusqlite::Result<T> + Send + 'static,
    {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || -> StorageResult<T> {
            let conn = open_connection(&path)?;
            Ok(op(&conn)?)
        })
        .await?
    }
}

/// Opens and configures a connection to the database at `path`
pub fn open_connection(path: &Path) -> Result<Connection, rusqlite::Error> {
    let conn = Connection::open(path)?;
    conn.busy_timeout(BUSY_TIMEOUT)?;

    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
    ",
    )?;

    Ok(conn)
}

#[async_trait]
impl ListingStore for SqliteStore {
    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    async fn table_exists(&self, name: &str) -> StorageResult<bool> {
        let name = name.to_string();
        self.with_connection(move |conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
                params![name],
                |row| row.get(0),
            )?;
            Ok(count > 0)
        })
        .await
    }

    async fn create_table(&self, ddl: &str) -> StorageResult<()> {
        let ddl = ddl.to_string();
        self.with_connection(move |conn| conn.execute_batch(&ddl))
            .await
    }

    async fn exists_by_url(&self, url: &str) -> StorageResult<bool> {
        let url = url.to_string();
        self.with_connection(move |conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM scraped_data WHERE url = ?1",
                params![url],
                |row| row.get(0),
            )?;
            Ok(count > 0)
        })
        .await
    }

    async fn insert(&self, record: &AdRecord) -> StorageResult<RowId> {
        let record = record.clone();
        self.with_connection(move |conn| {
            conn.execute(
                "INSERT INTO scraped_data (url, thumbnail, title, price, area, address)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    record.url,
                    record.thumbnail,
                    record.title,
                    record.price,
                    record.area,
                    record.address
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
    }

    async fn list_listings(&self) -> StorageResult<Vec<StoredListing>> {
        self.with_connection(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, url, thumbnail, title, price, area, address, created_at
                 FROM scraped_data ORDER BY id",
            )?;

            let listings = stmt
                .query_map([], |row| {
                    let created_at: String = row.get(7)?;
                    let created_at = NaiveDateTime::parse_from_str(&created_at, TIMESTAMP_FORMAT)
                        .map_err(|e| {
                            rusqlite::Error::FromSqlConversionFailure(7, Type::Text, Box::new(e))
                        })?;

                    Ok(StoredListing {
                        id: row.get(0)?,
                        record: AdRecord {
                            url: row.get(1)?,
                            thumbnail: row.get(2)?,
                            title: row.get(3)?,
                            price: row.get(4)?,
                            area: row.get(5)?,
                            address: row.get(6)?,
                        },
                        created_at: Utc.from_utc_datetime(&created_at),
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;

            Ok(listings)
        })
        .await
    }
}
