//! Configuration module for Article-Ripple
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files, with provider credentials overridable from the environment.
//!
//! # Example
//!
//! ```no_run
//! use article_ripple::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("config.toml")).unwrap();
//! println!("Crawler will use max depth: {}", config.crawler.max_depth);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, OutputConfig, ProviderConfig};

// Re-export parser functions
pub use parser::{
    apply_env_overrides, load_config, parse_config, ENV_ACCESS_TOKEN, ENV_BASE_URL,
    ENV_REQUESTS_PER_HOUR, ENV_USER_AGENT,
};
pub use validation::validate;
