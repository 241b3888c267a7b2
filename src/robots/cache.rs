//! Per-host robots.txt cache and crawl-delay limiter
//!
//! The cache map is guarded by one coarse lock that is only held long enough
//! to look up or insert a host entry. Each entry then serializes its own work:
//! the robots.txt fill happens at most once per host (concurrent callers wait
//! on the same fill), and the crawl-delay clock has its own async lock so that
//! fetches to one host are spaced out while other hosts proceed untouched.

use crate::robots::parser::RobotsPolicy;
use crate::url::{host_key, robots_url};
use parking_lot::Mutex;
use reqwest::Client;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex as AsyncMutex, OnceCell};
use tokio::time::Instant;
use url::Url;

/// Politeness state for one host
#[derive(Debug)]
pub struct HostRules {
    /// `host[:port]` this entry belongs to
    host: String,

    /// Where the rules are fetched from
    robots_url: String,

    /// Parsed rules; filled exactly once
    policy: OnceCell<RobotsPolicy>,

    /// When the last fetch to this host was dispatched
    last_fetch: AsyncMutex<Option<Instant>>,

    /// Delay used until (or instead of) a robots.txt `Crawl-delay`
    default_delay: Duration,
}

impl HostRules {
    fn new(host: String, robots_url: String, default_delay: Duration) -> Self {
        Self {
            host,
            robots_url,
            policy: OnceCell::new(),
            last_fetch: AsyncMutex::new(None),
            default_delay,
        }
    }

    /// Whether robots.txt has been fetched and parsed for this host
    pub fn is_initialized(&self) -> bool {
        self.policy.initialized()
    }

    /// Returns true if any disallow pattern matches from the start of `path`
    pub fn is_disallowed(&self, path: &str) -> bool {
        self.policy
            .get()
            .map(|policy| policy.is_disallowed(path))
            .unwrap_or(false)
    }

    /// The spacing enforced between fetches to this host
    pub fn crawl_delay(&self) -> Duration {
        self.policy
            .get()
            .map(RobotsPolicy::crawl_delay)
            .unwrap_or(self.default_delay)
    }

    /// Sleeps out whatever remains of the crawl delay, then stamps now as the
    /// last fetch time
    ///
    /// The host's clock lock is held across the sleep, so concurrent callers
    /// for the same host queue up and each one is spaced by a full delay.
    pub async fn wait_for_delay(&self) {
        let mut last_fetch = self.last_fetch.lock().await;
        if let Some(previous) = *last_fetch {
            let delay = self.crawl_delay();
            let elapsed = previous.elapsed();
            if elapsed < delay {
                let wait = delay - elapsed;
                tracing::trace!("Waiting {:?} before next fetch from {}", wait, self.host);
                tokio::time::sleep(wait).await;
            }
        }
        *last_fetch = Some(Instant::now());
    }

    async fn ensure_policy(&self, client: &Client, fetches: &AtomicUsize) -> &RobotsPolicy {
        self.policy
            .get_or_init(|| async {
                fetches.fetch_add(1, Ordering::Relaxed);
                fetch_policy(client, &self.robots_url, self.default_delay).await
            })
            .await
    }
}

/// Cache of politeness rules keyed by `host[:port]`
///
/// One cache belongs to one crawl run; entries are never evicted while it lives.
#[derive(Debug)]
pub struct RobotsCache {
    client: Client,
    default_delay: Duration,
    hosts: Mutex<HashMap<String, Arc<HostRules>>>,
    fetches: AtomicUsize,
}

impl RobotsCache {
    /// Creates an empty cache that fetches robots.txt with `client`
    pub fn new(client: Client, default_delay: Duration) -> Self {
        Self {
            client,
            default_delay,
            hosts: Mutex::new(HashMap::new()),
            fetches: AtomicUsize::new(0),
        }
    }

    /// Returns the initialized rules for the URL's host
    ///
    /// The first caller for a host inserts a placeholder entry and fetches
    /// `<scheme>://<host>/robots.txt`; concurrent callers for the same host
    /// wait for that single fetch instead of issuing their own. Returns `None`
    /// only when the URL has no host.
    pub async fn rules_for(&self, url: &Url) -> Option<Arc<HostRules>> {
        let key = host_key(url)?;
        let rules = {
            let mut hosts = self.hosts.lock();
            match hosts.get(&key) {
                Some(rules) => Arc::clone(rules),
                None => {
                    let robots = robots_url(url)?;
                    let rules = Arc::new(HostRules::new(key.clone(), robots, self.default_delay));
                    hosts.insert(key, Arc::clone(&rules));
                    rules
                }
            }
        };

        rules.ensure_policy(&self.client, &self.fetches).await;
        Some(rules)
    }

    /// Number of hosts with an entry in the cache
    pub fn len(&self) -> usize {
        self.hosts.lock().len()
    }

    /// Returns true if no host has been seen yet
    pub fn is_empty(&self) -> bool {
        self.hosts.lock().is_empty()
    }

    /// Number of robots.txt fetches issued so far
    pub fn robots_fetches(&self) -> usize {
        self.fetches.load(Ordering::Relaxed)
    }
}

/// Downloads and parses robots.txt, falling back to allow-all on any failure
async fn fetch_policy(client: &Client, robots_url: &str, default_delay: Duration) -> RobotsPolicy {
    tracing::debug!("Fetching {}", robots_url);

    let response = match client.get(robots_url).send().await {
        Ok(response) => response,
        Err(e) => {
            tracing::debug!("robots.txt unavailable at {}: {}", robots_url, e);
            return RobotsPolicy::allow_all(default_delay);
        }
    };

    if !response.status().is_success() {
        tracing::debug!(
            "robots.txt at {} returned HTTP {}, allowing all",
            robots_url,
            response.status()
        );
        return RobotsPolicy::allow_all(default_delay);
    }

    match response.text().await {
        Ok(body) => {
            let policy = RobotsPolicy::from_content(&body, default_delay);
            tracing::debug!(
                "Parsed {}: {} disallow rules, crawl delay {:?}",
                robots_url,
                policy.disallow_count(),
                policy.crawl_delay()
            );
            policy
        }
        Err(e) => {
            tracing::debug!("Unreadable robots.txt at {}: {}", robots_url, e);
            RobotsPolicy::allow_all(default_delay)
        }
    }
}
