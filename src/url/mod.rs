//! URL handling module for Sumi-Seek
//!
//! This module implements the clean stage of the crawl pipeline (resolving an
//! href against its page and keeping the crawl on one host) plus the host
//! helpers used to key per-host politeness state.

mod domain;
mod normalize;

// Re-export main functions
pub use domain::{extract_host, host_key, robots_url};
pub use normalize::{clean_url, normalize_seed};

/// A raw href paired with the URL of the page it was found on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanInput {
    pub base: String,
    pub href: String,
}

impl CleanInput {
    pub fn new(base: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            href: href.into(),
        }
    }

    /// Runs the clean stage on this pair, collapsing rejections to `None`
    pub fn clean(&self) -> Option<String> {
        match clean_url(&self.base, &self.href) {
            Ok(url) => Some(url),
            Err(e) => {
                tracing::trace!("Rejected href {:?} on {}: {}", self.href, self.base, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_input_accepts_relative() {
        let input = CleanInput::new("https://x.org/a/", "../b");
        assert_eq!(input.clean(), Some("https://x.org/b".to_string()));
    }

    #[test]
    fn test_clean_input_collapses_rejections() {
        assert_eq!(CleanInput::new("https://x.org/", "mailto:a@x.org").clean(), None);
        assert_eq!(CleanInput::new("https://x.org/", "https://y.org/").clean(), None);
        assert_eq!(CleanInput::new("::::", "/a").clean(), None);
    }
}
