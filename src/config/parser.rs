use crate::config::types::{Config, RawConfig};
use crate::config::validation::validate;
use crate::ConfigError;
use std::path::Path;

/// Environment variables read at startup, with the setting each one fills
pub const ENV_HOST: &str = "HOST";
pub const ENV_USER: &str = "USER";
pub const ENV_PASSWORD: &str = "PASSWORD";
pub const ENV_DATABASE: &str = "DATABASE";
pub const ENV_URL: &str = "URL";
pub const ENV_STORE_BACKEND: &str = "STORE_BACKEND";
pub const ENV_LOG_FILE: &str = "LOG_FILE";

/// Loads the configuration from an optional TOML file and the environment
///
/// Values from the file win; the environment only fills settings the file
/// leaves unset. Call `dotenvy::dotenv()` beforehand to pick up a `.env` file.
///
/// # Arguments
///
/// * `path` - Optional path to a TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to read, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use finn_scout::config::load_config;
///
/// let config = load_config(None).unwrap();
/// println!("Fetching {}", config.source.url);
/// ```
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let raw = match path {
        Some(path) => read_raw_config(path)?,
        None => RawConfig::default(),
    };

    resolve_config(raw, |name| std::env::var(name).ok())
}

/// Reads and parses a TOML configuration file without validating it
pub fn read_raw_config(path: &Path) -> Result<RawConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_raw_config(&content)
}

/// Parses TOML content into raw settings
pub fn parse_raw_config(content: &str) -> Result<RawConfig, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Fills unset settings from `lookup` and validates the result
///
/// `lookup` maps an environment variable name to its value.
pub fn resolve_config<F>(mut raw: RawConfig, lookup: F) -> Result<Config, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    fill(&mut raw.store.host, &lookup, ENV_HOST);
    fill(&mut raw.store.user, &lookup, ENV_USER);
    fill(&mut raw.store.password, &lookup, ENV_PASSWORD);
    fill(&mut raw.store.database, &lookup, ENV_DATABASE);
    fill(&mut raw.store.backend, &lookup, ENV_STORE_BACKEND);
    fill(&mut raw.source.url, &lookup, ENV_URL);
    fill(&mut raw.log.path, &lookup, ENV_LOG_FILE);

    validate(raw)
}

fn fill<F>(slot: &mut Option<String>, lookup: &F, name: &str)
where
    F: Fn(&str) -> Option<String>,
{
    if slot.is_none() {
        *slot = lookup(name);
    }
}
