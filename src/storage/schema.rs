//! Table definition and the schema guard
//!
//! The `scraped_data` table is the only on-disk contract of this crate. Its
//! MySQL definition must stay byte-compatible with existing deployments.

use crate::storage::traits::ListingStore;
use crate::SchemaError;

/// Name of the listings table
pub const TABLE_NAME: &str = "scraped_data";

/// MySQL definition of the listings table
pub const MYSQL_SCHEMA_SQL: &str = r#"CREATE TABLE IF NOT EXISTS scraped_data (
    id INT AUTO_INCREMENT PRIMARY KEY,
    title VARCHAR(355),
    url VARCHAR(255),
    thumbnail VARCHAR(255),
    price VARCHAR(255),
    area VARCHAR(255),
    address VARCHAR(255),
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
)"#;

/// SQLite definition of the listings table
pub const SQLITE_SCHEMA_SQL: &str = r#"CREATE TABLE IF NOT EXISTS scraped_data (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title VARCHAR(355),
    url VARCHAR(255),
    thumbnail VARCHAR(255),
    price VARCHAR(255),
    area VARCHAR(255),
    address VARCHAR(255),
    created_at TEXT DEFAULT CURRENT_TIMESTAMP
)"#;

/// Columns every backend must provide, in declaration order
pub const COLUMNS: [&str; 8] = [
    "id",
    "title",
    "url",
    "thumbnail",
    "price",
    "area",
    "address",
    "created_at",
];

/// SQL dialects understood by the store backends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    MySql,
    Sqlite,
}

impl Dialect {
    /// Returns the create-table statement for this dialect
    pub fn create_table_sql(&self) -> &'static str {
        match self {
            Self::MySql => MYSQL_SCHEMA_SQL,
            Self::Sqlite => SQLITE_SCHEMA_SQL,
        }
    }
}

/// Makes sure the listings table exists before anything is ingested
///
/// Returns whether the table was already there. When it is missing, exactly
/// one create-table statement is issued.
///
/// # Returns
///
/// * `Ok(true)` - The table already existed, no DDL was issued
/// * `Ok(false)` - The table was missing and has been created
/// * `Err(SchemaError)` - Metadata lookup or table creation failed
pub async fn ensure_schema(store: &dyn ListingStore) -> Result<bool, SchemaError> {
    let exists = store
        .table_exists(TABLE_NAME)
        .await
        .map_err(SchemaError::Metadata)?;

    if exists {
        tracing::debug!("Table {} already exists", TABLE_NAME);
        return Ok(true);
    }

    tracing::info!("Table {} does not exist, creating it", TABLE_NAME);
    store
        .create_table(store.dialect().create_table_sql())
        .await
        .map_err(SchemaError::Create)?;

    Ok(false)
}
