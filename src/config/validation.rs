use crate::config::types::{
    Config, LogConfig, MySqlTarget, RawConfig, RawLogConfig, RawSourceConfig, RawStoreConfig,
    SourceConfig, StoreBackend, StoreConfig, StoreTarget,
};
use crate::ConfigError;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

pub const DEFAULT_MAX_CONCURRENCY: u32 = 8;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_LOG_PATH: &str = "log.txt";

/// Validates raw settings and turns them into a [`Config`]
pub fn validate(raw: RawConfig) -> Result<Config, ConfigError> {
    Ok(Config {
        store: validate_store_config(raw.store)?,
        source: validate_source_config(raw.source)?,
        log: validate_log_config(raw.log)?,
    })
}

/// Validates store configuration
fn validate_store_config(raw: RawStoreConfig) -> Result<StoreConfig, ConfigError> {
    let backend = match non_empty(raw.backend) {
        Some(name) => name.parse::<StoreBackend>().map_err(ConfigError::Validation)?,
        None => StoreBackend::default(),
    };

    let max_concurrency = raw.max_concurrency.unwrap_or(DEFAULT_MAX_CONCURRENCY);
    if !(1..=64).contains(&max_concurrency) {
        return Err(ConfigError::Validation(format!(
            "max-concurrency must be between 1 and 64, got {}",
            max_concurrency
        )));
    }

    let database = non_empty(raw.database).ok_or(ConfigError::Missing("DATABASE"))?;

    let target = match backend {
        StoreBackend::MySql => StoreTarget::MySql(MySqlTarget {
            host: non_empty(raw.host).ok_or(ConfigError::Missing("HOST"))?,
            user: non_empty(raw.user).ok_or(ConfigError::Missing("USER"))?,
            // An empty password is a valid MySQL credential, an absent one is not.
            password: raw.password.ok_or(ConfigError::Missing("PASSWORD"))?,
            database,
        }),
        StoreBackend::Sqlite => StoreTarget::Sqlite {
            path: PathBuf::from(database),
        },
    };

    Ok(StoreConfig {
        target,
        max_concurrency,
    })
}

/// Validates the listings page settings
fn validate_source_config(raw: RawSourceConfig) -> Result<SourceConfig, ConfigError> {
    let url = non_empty(raw.url).ok_or(ConfigError::Missing("URL"))?;

    let parsed = Url::parse(&url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid URL '{}': {}", url, e)))?;

    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "URL '{}' must use http or https",
            url
        )));
    }

    let timeout_secs = raw.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS);
    if timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "timeout-secs must be at least 1".to_string(),
        ));
    }

    let user_agent = non_empty(raw.user_agent)
        .unwrap_or_else(|| format!("finn-scout/{}", env!("CARGO_PKG_VERSION")));

    Ok(SourceConfig {
        url,
        timeout: Duration::from_secs(timeout_secs),
        user_agent,
    })
}

/// Validates operational log settings
fn validate_log_config(raw: RawLogConfig) -> Result<LogConfig, ConfigError> {
    let path = match raw.path {
        Some(path) if path.trim().is_empty() => {
            return Err(ConfigError::Validation(
                "log path cannot be empty".to_string(),
            ))
        }
        Some(path) => path,
        None => DEFAULT_LOG_PATH.to_string(),
    };

    Ok(LogConfig {
        path: PathBuf::from(path),
    })
}

/// Treats blank values the same as unset ones
fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
