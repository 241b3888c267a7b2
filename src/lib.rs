//! Sumi-Seek: a polite same-host crawler with a TF-IDF search index
//!
//! This crate crawls a site starting from a seed URL, extracts words and links
//! from every page, and builds an inverted index over stemmed terms that can be
//! queried with TF-IDF scoring. Robots.txt disallow rules and crawl delays are
//! honored per host.

pub mod config;
pub mod crawler;
pub mod index;
pub mod robots;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Sumi-Seek operations
#[derive(Debug, Error)]
pub enum SeekError {
    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Invalid seed URL: {0}")]
    InvalidSeed(String),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Reasons the clean stage rejects a link
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UrlError {
    #[error("mailto link: {0}")]
    Mailto(String),

    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Link to {href_host} leaves host {base_host}")]
    CrossHost {
        base_host: String,
        href_host: String,
    },

    #[error("Missing host in URL: {0}")]
    MissingHost(String),
}

/// Result type alias for Sumi-Seek operations
pub type Result<T> = std::result::Result<T, SeekError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{crawl, Coordinator};
pub use index::{open_index, Analyzer, SearchHit, SearchIndex};
pub use state::{CrawlReport, PageState, StopReason};
pub use url::{clean_url, extract_host};
