use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Sumi-Seek
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub index: IndexConfig,
    pub stopwords: StopwordsConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// Absolute URL the crawl starts from; also bounds the crawl to its host
    pub seed: Option<String>,

    /// Number of fetch workers
    pub fetch_workers: usize,

    /// Number of extraction workers
    pub extract_workers: usize,

    /// Number of URL normalization workers
    pub clean_workers: usize,

    /// Capacity of each stage queue
    pub queue_capacity: usize,

    /// Soft cap on the frontier; cleaned links are dropped once it is reached
    pub max_frontier: usize,

    /// Global cap on visited URLs; the crawl drains once it is reached
    pub max_visited: usize,

    /// Interval between progress log lines (milliseconds)
    pub progress_interval_ms: u64,

    /// Grace period without any progress before the crawl gives up (milliseconds)
    pub stall_timeout_ms: u64,

    /// Maximum time spent draining in-flight work (milliseconds)
    pub drain_timeout_ms: u64,

    /// Delay between fetches to the same host when robots.txt sets none (milliseconds)
    pub default_crawl_delay_ms: u64,

    /// Timeout for a single HTTP request (seconds)
    pub request_timeout_secs: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            seed: None,
            fetch_workers: 20,
            extract_workers: 10,
            clean_workers: 30,
            queue_capacity: 1024,
            max_frontier: 10_000,
            max_visited: 5_000,
            progress_interval_ms: 5_000,
            stall_timeout_ms: 30_000,
            drain_timeout_ms: 30_000,
            default_crawl_delay_ms: 100,
            request_timeout_secs: 30,
        }
    }
}

impl CrawlerConfig {
    pub fn progress_interval(&self) -> Duration {
        Duration::from_millis(self.progress_interval_ms)
    }

    pub fn stall_timeout(&self) -> Duration {
        Duration::from_millis(self.stall_timeout_ms)
    }

    pub fn drain_timeout(&self) -> Duration {
        Duration::from_millis(self.drain_timeout_ms)
    }

    pub fn default_crawl_delay(&self) -> Duration {
        Duration::from_millis(self.default_crawl_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct UserAgentConfig {
    /// Name of the crawler
    pub crawler_name: String,

    /// Version of the crawler
    pub crawler_version: String,

    /// URL with information about the crawler
    pub contact_url: String,

    /// Email address for crawler-related contact
    pub contact_email: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "SumiSeek".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: "https://example.com/sumi-seek".to_string(),
            contact_email: "crawler@example.com".to_string(),
        }
    }
}

impl UserAgentConfig {
    /// Formats the header value: `Name/Version (+ContactURL; ContactEmail)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}

/// Which index implementation to build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexBackend {
    /// Volatile in-process maps
    #[default]
    Memory,
    /// Transactional SQLite store
    Sqlite,
}

impl IndexBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::Sqlite => "sqlite",
        }
    }
}

/// Index configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct IndexConfig {
    pub backend: IndexBackend,

    /// Path to the SQLite database file (sqlite backend only)
    pub database_path: String,

    /// Drop and recreate the index tables on open (sqlite backend only)
    pub reset: bool,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            backend: IndexBackend::Memory,
            database_path: "sumi-seek.db".to_string(),
            reset: false,
        }
    }
}

/// Stopword list configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StopwordsConfig {
    /// Path to a bracketed, comma-separated list of quoted words.
    /// The built-in English list is used when unset.
    pub path: Option<String>,
}
