//! Configuration module for Finn-Scout
//!
//! This module loads settings from an optional TOML file and the process
//! environment (`HOST`, `USER`, `PASSWORD`, `DATABASE`, `URL`, `STORE_BACKEND`,
//! `LOG_FILE`), then validates them.
//!
//! # Example
//!
//! ```no_run
//! use finn_scout::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Some(Path::new("finn-scout.toml"))).unwrap();
//! println!("Row operations in flight: {}", config.store.max_concurrency);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, LogConfig, MySqlTarget, RawConfig, RawLogConfig, RawSourceConfig, RawStoreConfig,
    SourceConfig, StoreBackend, StoreConfig, StoreTarget,
};

// Re-export parser functions
pub use parser::{load_config, parse_raw_config, read_raw_config, resolve_config};
