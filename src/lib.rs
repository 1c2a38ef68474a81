//! Finn-Scout: a real-estate listings watcher
//!
//! This crate fetches a listings search-results page, extracts ad cards from
//! its markup, de-duplicates them, and stores the listings that have not been
//! seen before in a relational store.

pub mod config;
pub mod listing;
pub mod output;
pub mod scrape;
pub mod storage;

use thiserror::Error;

/// Main error type for Finn-Scout operations
///
/// Only run-level failures end up here. Failures of a single row during
/// reconciliation are reported as [`scrape::RowError`] instead.
#[derive(Debug, Error)]
pub enum ScoutError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("Extraction error: {0}")]
    Extract(#[from] ExtractError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Missing required setting: {0}")]
    Missing(&'static str),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Errors raised while fetching the listings page
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error for {url}: {source}")]
    Transport { url: String, source: reqwest::Error },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Unexpected status {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("Failed to read response body from {url}: {source}")]
    Body { url: String, source: reqwest::Error },
}

/// Errors raised while confirming or creating the listings table
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("failed to query table metadata: {0}")]
    Metadata(#[source] storage::StorageError),

    #[error("failed to create table: {0}")]
    Create(#[source] storage::StorageError),
}

/// Errors raised while building the extractor
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Invalid selector '{selector}': {message}")]
    InvalidSelector { selector: String, message: String },
}

/// Result type alias for Finn-Scout operations
pub type Result<T> = std::result::Result<T, ScoutError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use listing::{AdRecord, StoredListing};
pub use scrape::{dedupe, Extractor, ReconcileReport, Reconciler, RowError};
pub use storage::{ListingStore, StorageError};
