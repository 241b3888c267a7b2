//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler:
//! - Building the shared HTTP client with the crawler's user agent
//! - GET requests for page bodies (one attempt, no retry)
//! - Error classification
//! - The page-title lookup used when displaying search hits

use crate::config::UserAgentConfig;
use crate::crawler::parser::extract_title;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use thiserror::Error;

/// Why a page could not be retrieved
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request timed out")]
    Timeout,

    #[error("Connection failed: {0}")]
    Connect(String),

    #[error("HTTP {0}")]
    Status(StatusCode),

    #[error("Failed to read body: {0}")]
    Body(String),

    #[error("Request failed: {0}")]
    Request(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else if e.is_connect() {
            Self::Connect(e.to_string())
        } else if e.is_body() || e.is_decode() {
            Self::Body(e.to_string())
        } else {
            Self::Request(e.to_string())
        }
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The user agent configuration
/// * `timeout` - Timeout for a whole request, body included
///
/// # Example
///
/// ```no_run
/// use sumi_seek::config::UserAgentConfig;
/// use sumi_seek::crawler::build_http_client;
/// use std::time::Duration;
///
/// let config = UserAgentConfig::default();
/// let client = build_http_client(&config, Duration::from_secs(30)).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig, timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL and returns the raw body
///
/// Redirects are followed by the client. Any non-2xx final status is a
/// failure; the caller drops the URL without retrying.
pub async fn fetch_page(client: &Client, url: &str) -> Result<Vec<u8>, FetchError> {
    let response = client.get(url).send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status(status));
    }

    let body = response
        .bytes()
        .await
        .map_err(|e| FetchError::Body(e.to_string()))?;
    Ok(body.to_vec())
}

/// Looks up a page's `<title>` for display, falling back to the URL itself
pub async fn page_title(client: &Client, url: &str) -> String {
    match fetch_page(client, url).await {
        Ok(body) => extract_title(&body).unwrap_or_else(|| url.to_string()),
        Err(e) => {
            tracing::debug!("Could not fetch title for {}: {}", url, e);
            url.to_string()
        }
    }
}
