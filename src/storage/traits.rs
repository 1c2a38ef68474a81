//! Storage traits and error types
//!
//! This module defines the trait interface for listing store backends and
//! associated error types.

use crate::listing::{AdRecord, StoredListing};
use crate::storage::schema::Dialect;
use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("MySQL error: {0}")]
    MySql(#[from] sqlx::Error),

    #[error("Storage task failed: {0}")]
    Task(String),

    #[error("Failed to decode row: {0}")]
    Decode(String),
}

impl From<tokio::task::JoinError> for StorageError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Task(err.to_string())
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Store-assigned identity of an inserted listing
pub type RowId = i64;

/// Trait for listing store backends
///
/// Every method acquires its own connection (or pooled connection) and
/// releases it before returning, so one store may be shared across tasks.
/// Scraped values only ever reach the database as bound parameters.
#[async_trait]
pub trait ListingStore: Send + Sync {
    /// SQL dialect spoken by this backend
    fn dialect(&self) -> Dialect;

    /// Checks whether a table with the given name exists
    async fn table_exists(&self, name: &str) -> StorageResult<bool>;

    /// Runs a single DDL statement
    async fn create_table(&self, ddl: &str) -> StorageResult<()>;

    /// Checks whether a listing with this url is already stored
    async fn exists_by_url(&self, url: &str) -> StorageResult<bool>;

    /// Inserts a listing and returns its new id
    async fn insert(&self, record: &AdRecord) -> StorageResult<RowId>;

    /// Returns every stored listing, oldest first
    async fn list_listings(&self) -> StorageResult<Vec<StoredListing>>;

    /// Releases pooled resources once the run is over
    async fn close(&self) {}
}
