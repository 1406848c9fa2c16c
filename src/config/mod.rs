//! Configuration module for Folio
//!
//! This module handles loading, parsing, and validating TOML configuration files,
//! with a handful of environment variables able to override deployment-specific
//! values.
//!
//! # Example
//!
//! ```no_run
//! use folio_crawler::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("folio.toml")).unwrap();
//! println!("Crawling {}", config.target.root_url);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, OutputConfig, TargetConfig, UserAgentConfig};

// Re-export parser functions
pub use parser::{
    apply_env_overrides, compute_config_hash, load_config, load_config_with_hash, ENV_COLLECTION,
    ENV_DATABASE_PATH, ENV_TARGET_URL,
};
pub use validation::validate;
pub(crate) use validation::validate_collection_name;
