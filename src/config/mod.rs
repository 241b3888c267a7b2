//! Configuration module for Sumi-Seek
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every key is optional; omitted keys fall back to the defaults in [`types`].
//!
//! # Example
//!
//! ```no_run
//! use sumi_seek::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("sumi-seek.toml")).unwrap();
//! println!("Fetch workers: {}", config.crawler.fetch_workers);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, IndexBackend, IndexConfig, StopwordsConfig, UserAgentConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::{validate, validate_seed};
