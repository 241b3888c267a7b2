//! Robots.txt handling module
//!
//! This module provides the politeness engine: parsing robots.txt, caching the
//! parsed rules per host, and spacing fetches to each host by its crawl delay.

mod cache;
mod parser;

pub use cache::{HostRules, RobotsCache};
pub use parser::RobotsPolicy;

/// Checks whether a path is blocked by the host's disallow rules
///
/// # Arguments
///
/// * `rules` - The host's cached rules
/// * `path` - The URL path to check
///
/// # Returns
///
/// * `true` - If any disallow pattern matches from the start of the path
/// * `false` - Otherwise
pub fn is_disallowed(rules: &HostRules, path: &str) -> bool {
    rules.is_disallowed(path)
}

/// Blocks until the host's crawl delay has passed since its last fetch
pub async fn wait_for_delay(rules: &HostRules) {
    rules.wait_for_delay().await
}
