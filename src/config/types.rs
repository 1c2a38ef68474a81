use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Main configuration structure for Finn-Scout
///
/// Built by [`crate::config::load_config`] from the optional TOML file and the
/// process environment. Every value here has already been validated.
#[derive(Debug, Clone)]
pub struct Config {
    pub store: StoreConfig,
    pub source: SourceConfig,
    pub log: LogConfig,
}

/// Relational store configuration
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Which backend to talk to, with its connection parameters
    pub target: StoreTarget,

    /// Maximum number of row operations in flight at once
    pub max_concurrency: u32,
}

/// Connection parameters for a specific backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreTarget {
    MySql(MySqlTarget),
    Sqlite { path: PathBuf },
}

impl StoreTarget {
    pub fn backend(&self) -> StoreBackend {
        match self {
            Self::MySql(_) => StoreBackend::MySql,
            Self::Sqlite { .. } => StoreBackend::Sqlite,
        }
    }
}

/// MySQL server connection parameters
#[derive(Clone, PartialEq, Eq)]
pub struct MySqlTarget {
    pub host: String,
    pub user: String,
    pub password: String,
    pub database: String,
}

// Keeps the password out of logs.
impl fmt::Debug for MySqlTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MySqlTarget")
            .field("host", &self.host)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .finish()
    }
}

/// Supported store backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreBackend {
    #[default]
    MySql,
    Sqlite,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mysql" => Ok(Self::MySql),
            "sqlite" => Ok(Self::Sqlite),
            other => Err(format!("unknown store backend '{}'", other)),
        }
    }
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MySql => f.write_str("mysql"),
            Self::Sqlite => f.write_str("sqlite"),
        }
    }
}

/// Listings page configuration
#[derive(Debug, Clone)]
pub struct SourceConfig {
    /// The search-results page to fetch
    pub url: String,

    /// Whole-request timeout
    pub timeout: Duration,

    /// User-Agent header sent with the request
    pub user_agent: String,
}

/// Operational log configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Path to the append-only operational log
    pub path: PathBuf,
}

/// Raw settings as read from the TOML file, before validation
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RawConfig {
    pub store: RawStoreConfig,
    pub source: RawSourceConfig,
    pub log: RawLogConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct RawStoreConfig {
    pub backend: Option<String>,
    pub host: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub database: Option<String>,
    pub max_concurrency: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct RawSourceConfig {
    pub url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct RawLogConfig {
    pub path: Option<String>,
}
