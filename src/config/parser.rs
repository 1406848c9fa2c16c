use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Overrides `target.root-url`
pub const ENV_TARGET_URL: &str = "TARGET_URL";

/// Overrides `output.database-path`
pub const ENV_DATABASE_PATH: &str = "DB_PATH";

/// Overrides both `output.books-collection` and `output.categories-collection`
pub const ENV_COLLECTION: &str = "DB_COLLECTION_NAME";

/// Loads and parses a configuration file from the given path
///
/// Environment overrides are applied after parsing and before validation, so
/// an overridden value is validated like any other.
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;

    let mut config: Config = toml::from_str(&content)?;

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());

    validate(&config)?;

    Ok(config)
}

/// Applies deployment overrides looked up through `lookup`
///
/// Empty values are ignored so an exported-but-blank variable does not wipe
/// out the file's setting.
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(url) = lookup(ENV_TARGET_URL) {
        tracing::debug!("{} overrides target root URL", ENV_TARGET_URL);
        config.target.root_url = url;
    }

    if let Some(path) = lookup(ENV_DATABASE_PATH) {
        tracing::debug!("{} overrides database path", ENV_DATABASE_PATH);
        config.output.database_path = path;
    }

    if let Some(collection) = lookup(ENV_COLLECTION) {
        tracing::debug!("{} overrides both collections", ENV_COLLECTION);
        config.output.categories_collection = collection.clone();
        config.output.books_collection = collection;
    }
}

/// Computes a SHA-256 hash of the configuration file content
///
/// Logged at startup so runs can be matched to the configuration they used.
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    Ok(hex::encode(result))
}

/// Loads a configuration and returns both the config and its hash
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}
