//! Storage module for persisting listings
//!
//! This module handles all database operations, including:
//! - Confirming or creating the `scraped_data` table
//! - Existence checks and inserts keyed by listing url
//! - Reading back stored listings
//!
//! Two backends implement [`ListingStore`]: MySQL through a sqlx pool, and
//! SQLite through rusqlite with one connection per call.

mod mysql;
mod schema;
mod sqlite;
mod traits;

pub use mysql::{connect_options, MySqlStore};
pub use schema::{
    ensure_schema, Dialect, COLUMNS, MYSQL_SCHEMA_SQL, SQLITE_SCHEMA_SQL, TABLE_NAME,
};
pub use sqlite::{open_connection, SqliteStore};
pub use traits::{ListingStore, RowId, StorageError, StorageResult};

use crate::config::{StoreConfig, StoreTarget};
use std::sync::Arc;

/// Builds the store described by the configuration
///
/// No connection is opened here; the first call on the returned store does
/// that. Must be called from within a Tokio runtime.
///
/// # Arguments
///
/// * `config` - The validated store configuration
pub fn open_store(config: &StoreConfig) -> Arc<dyn ListingStore> {
    match &config.target {
        StoreTarget::MySql(target) => {
            tracing::debug!(
                "Using MySQL store {}@{}/{}",
                target.user,
                target.host,
                target.database
            );
            Arc::new(MySqlStore::connect_lazy(target, config.max_concurrency))
        }
        StoreTarget::Sqlite { path } => {
            tracing::debug!("Using SQLite store at {}", path.display());
            Arc::new(SqliteStore::new(path))
        }
    }
}
