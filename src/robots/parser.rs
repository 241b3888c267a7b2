//! Robots.txt parser
//!
//! Only the wildcard group (`User-agent: *`) is honored. Within it,
//! `Disallow` patterns are compiled to anchored regexes (`*` matches any
//! sequence, everything else is literal) and `Crawl-delay` overrides the
//! default delay.

use regex::Regex;
use std::time::Duration;

/// Parsed robots.txt rules for one host
#[derive(Debug, Clone)]
pub struct RobotsPolicy {
    /// Disallow patterns, in file order, compiled to match from the start of a path
    disallow: Vec<Regex>,

    /// Minimum spacing between fetches to the host
    crawl_delay: Duration,
}

impl RobotsPolicy {
    /// Creates a permissive policy that allows everything
    ///
    /// This is used when robots.txt cannot be fetched or parsed.
    pub fn allow_all(default_delay: Duration) -> Self {
        Self {
            disallow: Vec::new(),
            crawl_delay: default_delay,
        }
    }

    /// Parses robots.txt content
    ///
    /// # Arguments
    ///
    /// * `content` - The raw robots.txt file content
    /// * `default_delay` - Delay used when the wildcard group sets no `Crawl-delay`
    pub fn from_content(content: &str, default_delay: Duration) -> Self {
        let mut policy = Self::allow_all(default_delay);
        let mut current_agent = String::new();

        for line in content.lines() {
            let line = match line.find('#') {
                Some(i) => &line[..i],
                None => line,
            };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let key = key.trim().to_lowercase();
            let value = value.trim();

            match key.as_str() {
                "user-agent" => current_agent = value.to_lowercase(),
                "disallow" if current_agent == "*" && !value.is_empty() => {
                    match compile_pattern(value) {
                        Ok(re) => policy.disallow.push(re),
                        Err(e) => tracing::debug!("Skipping disallow pattern {:?}: {}", value, e),
                    }
                }
                "crawl-delay" if current_agent == "*" && !value.is_empty() => {
                    match value.parse::<f64>().ok().and_then(|s| Duration::try_from_secs_f64(s).ok()) {
                        Some(delay) => policy.crawl_delay = delay,
                        None => tracing::debug!("Ignoring crawl-delay {:?}", value),
                    }
                }
                _ => {}
            }
        }

        policy
    }

    /// Returns true if any disallow pattern matches from the start of `path`
    pub fn is_disallowed(&self, path: &str) -> bool {
        self.disallow.iter().any(|re| re.is_match(path))
    }

    /// Returns the crawl delay for this host
    pub fn crawl_delay(&self) -> Duration {
        self.crawl_delay
    }

    /// Returns the number of disallow patterns
    pub fn disallow_count(&self) -> usize {
        self.disallow.len()
    }
}

/// Compiles a Disallow value into an anchored regex
///
/// Regex metacharacters are escaped so they match literally; `*` becomes `.*`.
fn compile_pattern(pattern: &str) -> Result<Regex, regex::Error> {
    let escaped = regex::escape(pattern).replace(r"\*", ".*");
    Regex::new(&format!("^{}", escaped))
}
