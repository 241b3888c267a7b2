//! Crawler coordinator - main crawl orchestration logic
//!
//! The coordinator is a single task and the only writer of the frontier and
//! the visited set, so neither needs a lock. Each loop iteration handles one
//! event, preferring finished work over new work:
//!
//! 1. progress tick (logging and stall detection)
//! 2. a cleaned link arrives: enqueue it if new and the frontier has room
//! 3. an extraction result arrives: index its words, queue its hrefs for cleaning
//! 4. a clean-queue slot frees up: hand over the next queued href
//! 5. a fetch-queue slot frees up: pop the frontier, check robots, wait out the
//!    host's crawl delay, dispatch
//!
//! Queue slots are reserved inside the same `select!` as the result
//! receivers, so the coordinator never blocks on a full stage queue while the
//! stages are blocked on it.

use crate::config::{Config, CrawlerConfig};
use crate::crawler::fetcher::build_http_client;
use crate::crawler::workers::{ExtractionResult, Pipeline, StageInputs};
use crate::index::{Analyzer, SearchIndex};
use crate::robots::{self, RobotsCache};
use crate::state::{CrawlReport, PageState, StopReason};
use crate::url::{normalize_seed, CleanInput};
use crate::{Result, SeekError};
use reqwest::Client;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::mpsc::Permit;
use tokio::time::{interval_at, sleep_until, Instant};
use url::Url;

/// Main crawler coordinator structure
pub struct Coordinator {
    config: CrawlerConfig,
    client: Client,
    robots: Arc<RobotsCache>,
    index: Arc<dyn SearchIndex>,
    analyzer: Arc<Analyzer>,
}

/// Mutable state of one crawl run
struct CrawlRun {
    frontier: VecDeque<String>,
    /// hrefs waiting for a slot in the clean queue
    backlog: VecDeque<CleanInput>,
    pending_fetches: usize,
    pending_cleans: usize,
    last_progress: Instant,
    report: CrawlReport,
}

impl CrawlRun {
    fn new(seed: &str) -> Self {
        Self {
            frontier: VecDeque::from([seed.to_string()]),
            backlog: VecDeque::new(),
            pending_fetches: 0,
            pending_cleans: 0,
            last_progress: Instant::now(),
            report: CrawlReport::new(seed),
        }
    }

    fn progress(&mut self) {
        self.last_progress = Instant::now();
    }

    fn has_work(&self) -> bool {
        !self.frontier.is_empty()
            || !self.backlog.is_empty()
            || self.pending_fetches > 0
            || self.pending_cleans > 0
    }

    fn set_state(&mut self, url: &str, next: PageState) {
        if let Some(state) = self.report.visited.get_mut(url) {
            if !state.can_transition_to(next) {
                tracing::warn!("Unexpected transition for {}: {} -> {}", url, state, next);
            }
            *state = next;
        }
    }

    fn log_progress(&self) {
        tracing::info!(
            "Progress: frontier={} visited={} pending_fetches={} pending_cleans={}",
            self.frontier.len(),
            self.report.visited.len(),
            self.pending_fetches,
            self.pending_cleans + self.backlog.len()
        );
    }
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - The full configuration (crawler settings and user agent)
    /// * `index` - Index that extracted pages are added to
    /// * `analyzer` - Token pipeline applied to extracted words
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(SeekError)` - Failed to build the HTTP client
    pub fn new(config: &Config, index: Arc<dyn SearchIndex>, analyzer: Arc<Analyzer>) -> Result<Self> {
        let client = build_http_client(&config.user_agent, config.crawler.request_timeout())?;
        let robots = Arc::new(RobotsCache::new(
            client.clone(),
            config.crawler.default_crawl_delay(),
        ));

        Ok(Self {
            config: config.crawler.clone(),
            client,
            robots,
            index,
            analyzer,
        })
    }

    /// The robots.txt cache used by this coordinator's crawls
    pub fn robots(&self) -> &RobotsCache {
        &self.robots
    }

    /// Crawls the seed's host and indexes every reachable page
    ///
    /// Per-URL failures are absorbed; the only error is an unusable seed.
    /// Stalls, the visited cap and drain timeouts end the crawl early and are
    /// recorded in the report.
    pub async fn run(&self, seed: &str) -> Result<CrawlReport> {
        let seed_url = normalize_seed(seed)
            .map_err(|e| SeekError::InvalidSeed(format!("{}: {}", seed, e)))?;
        if !matches!(seed_url.scheme(), "http" | "https") {
            return Err(SeekError::InvalidSeed(format!(
                "{}: scheme must be http or https",
                seed
            )));
        }

        let started = Instant::now();
        let mut run = CrawlRun::new(seed_url.as_str());
        tracing::info!(
            "Starting crawl from {} ({} fetch / {} extract / {} clean workers)",
            seed_url,
            self.config.fetch_workers,
            self.config.extract_workers,
            self.config.clean_workers
        );

        let (inputs, mut pipeline) = Pipeline::start(&self.config, self.client.clone());

        let stop_reason = self.main_loop(&mut run, &inputs, &mut pipeline).await;
        run.report.stop_reason = stop_reason;

        // Closing the inputs lets the pools finish what they hold and exit
        drop(inputs);
        let dropped = run.backlog.len();
        run.backlog.clear();
        run.pending_cleans = run.pending_cleans.saturating_sub(dropped);

        tracing::info!(
            "Main loop done ({:?}). Draining: pending_fetches={} pending_cleans={}",
            stop_reason,
            run.pending_fetches,
            run.pending_cleans
        );
        let timed_out = self.drain(&mut run, &mut pipeline).await;
        run.report.drain_timed_out = timed_out;

        pipeline.shutdown(timed_out).await;

        run.report.elapsed = started.elapsed();
        tracing::info!(
            "Crawl finished: {} visited, {} indexed in {:.1}s",
            run.report.visited.len(),
            run.report.pages_indexed,
            run.report.elapsed.as_secs_f64()
        );
        Ok(run.report)
    }

    async fn main_loop(
        &self,
        run: &mut CrawlRun,
        inputs: &StageInputs,
        pipeline: &mut Pipeline,
    ) -> StopReason {
        let period = self.config.progress_interval();
        let mut ticker = interval_at(Instant::now() + period, period);
        let mut extracted_open = true;
        let mut cleaned_open = true;

        loop {
            if !run.has_work() {
                return StopReason::Exhausted;
            }
            if run.report.visited.len() >= self.config.max_visited {
                tracing::info!("Reached {} visited pages, stopping crawl", self.config.max_visited);
                return StopReason::VisitedCap;
            }

            tokio::select! {
                biased;

                _ = ticker.tick() => {
                    run.log_progress();
                    if run.last_progress.elapsed() >= self.config.stall_timeout() {
                        tracing::warn!(
                            "No progress for {:?}, giving up: pending_fetches={} pending_cleans={}",
                            self.config.stall_timeout(),
                            run.pending_fetches,
                            run.pending_cleans
                        );
                        return StopReason::Stalled;
                    }
                }

                cleaned = pipeline.cleaned_rx.recv(), if cleaned_open => match cleaned {
                    Some(cleaned) => self.on_cleaned(run, cleaned, true),
                    None => cleaned_open = false,
                },

                result = pipeline.extracted_rx.recv(), if extracted_open => match result {
                    Some(result) => self.on_extracted(run, result, true),
                    None => extracted_open = false,
                },

                permit = inputs.clean_tx.reserve(), if !run.backlog.is_empty() => {
                    if let (Ok(permit), Some(input)) = (permit, run.backlog.pop_front()) {
                        tracing::trace!("Cleaning {} from {}", input.href, input.base);
                        permit.send(input);
                        run.progress();
                    }
                }

                permit = inputs.fetch_tx.reserve(), if !run.frontier.is_empty() => {
                    if let Ok(permit) = permit {
                        self.dispatch_next(run, permit).await;
                    }
                }
            }
        }
    }

    /// Pops the frontier and, if the URL is new and allowed, hands it to a
    /// fetch worker once the host's crawl delay has passed
    async fn dispatch_next(&self, run: &mut CrawlRun, permit: Permit<'_, String>) {
        let Some(url) = run.frontier.pop_front() else {
            return;
        };
        run.progress();

        if run.report.visited.contains_key(&url) {
            run.report.duplicates += 1;
            return;
        }
        run.report.visited.insert(url.clone(), PageState::Queued);

        let parsed = match Url::parse(&url) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::debug!("Dropping unparseable {}: {}", url, e);
                run.report.visited.insert(url, PageState::FetchFailed);
                return;
            }
        };

        let Some(rules) = self.robots.rules_for(&parsed).await else {
            tracing::debug!("Dropping {} without host", url);
            run.report.visited.insert(url, PageState::FetchFailed);
            return;
        };

        if robots::is_disallowed(&rules, parsed.path()) {
            tracing::debug!("Disallowed by robots.txt: {}", url);
            run.set_state(&url, PageState::Disallowed);
            return;
        }

        robots::wait_for_delay(&rules).await;

        tracing::debug!("Fetching {}", url);
        run.set_state(&url, PageState::Fetching);
        permit.send(url);
        run.pending_fetches += 1;
        run.progress();
    }

    /// Handles a clean-stage answer; new URLs join the frontier while following
    fn on_cleaned(&self, run: &mut CrawlRun, cleaned: Option<String>, follow: bool) {
        run.pending_cleans = run.pending_cleans.saturating_sub(1);
        run.progress();

        let Some(url) = cleaned else {
            return;
        };
        if !follow || run.report.visited.contains_key(&url) {
            return;
        }
        if run.frontier.len() >= self.config.max_frontier {
            tracing::trace!("Frontier full, dropping {}", url);
            run.report.frontier_drops += 1;
            return;
        }
        run.frontier.push_back(url);
    }

    /// Indexes an extracted page and, while following, queues its hrefs
    fn on_extracted(&self, run: &mut CrawlRun, result: ExtractionResult, follow: bool) {
        run.pending_fetches = run.pending_fetches.saturating_sub(1);
        run.progress();

        let ExtractionResult { url, page } = result;
        let page = match page {
            Ok(page) => page,
            Err(e) => {
                tracing::debug!("Dropping {}: {}", url, e);
                run.set_state(&url, PageState::FetchFailed);
                return;
            }
        };

        let terms = self.analyzer.analyze(&page.words);
        let state = if terms.is_empty() {
            PageState::Extracted
        } else {
            match self.index.add_document(&url, &terms) {
                Ok(()) => {
                    run.report.pages_indexed += 1;
                    PageState::Indexed
                }
                Err(e) => {
                    tracing::warn!("Failed to index {}: {}", url, e);
                    run.report.index_errors += 1;
                    PageState::Extracted
                }
            }
        };
        run.set_state(&url, state);
        tracing::debug!(
            "Extracted {}: {} words, {} terms, {} links",
            url,
            page.words.len(),
            terms.len(),
            page.hrefs.len()
        );

        if follow {
            for href in page.hrefs {
                run.backlog.push_back(CleanInput::new(url.clone(), href));
                run.pending_cleans += 1;
            }
        }
    }

    /// Consumes outstanding results until nothing is in flight or the drain
    /// timeout passes; returns true on timeout
    async fn drain(&self, run: &mut CrawlRun, pipeline: &mut Pipeline) -> bool {
        let deadline = Instant::now() + self.config.drain_timeout();
        let mut extracted_open = true;
        let mut cleaned_open = true;

        while run.pending_fetches > 0 || run.pending_cleans > 0 {
            if !extracted_open && !cleaned_open {
                tracing::warn!(
                    "Workers exited with work outstanding: pending_fetches={} pending_cleans={}",
                    run.pending_fetches,
                    run.pending_cleans
                );
                break;
            }

            tokio::select! {
                cleaned = pipeline.cleaned_rx.recv(), if cleaned_open => match cleaned {
                    Some(cleaned) => self.on_cleaned(run, cleaned, false),
                    None => cleaned_open = false,
                },

                result = pipeline.extracted_rx.recv(), if extracted_open => match result {
                    Some(result) => self.on_extracted(run, result, false),
                    None => extracted_open = false,
                },

                _ = sleep_until(deadline) => {
                    tracing::warn!(
                        "Drain timeout after {:?}. Forcing exit: pending_fetches={} pending_cleans={}",
                        self.config.drain_timeout(),
                        run.pending_fetches,
                        run.pending_cleans
                    );
                    run.pending_fetches = 0;
                    run.pending_cleans = 0;
                    return true;
                }
            }
        }

        run.pending_fetches = 0;
        run.pending_cleans = 0;
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::MemoryIndex;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config() -> Config {
        let mut config = Config::default();
        config.crawler.fetch_workers = 4;
        config.crawler.extract_workers = 2;
        config.crawler.clean_workers = 4;
        config.crawler.queue_capacity = 2;
        config.crawler.default_crawl_delay_ms = 0;
        config.crawler.request_timeout_secs = 5;
        config
    }

    fn coordinator(config: &Config) -> (Coordinator, Arc<MemoryIndex>) {
        let index = Arc::new(MemoryIndex::new());
        let coordinator = Coordinator::new(config, index.clone(), Arc::new(Analyzer::english())).unwrap();
        (coordinator, index)
    }

    fn html(body: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_raw(format!("<html><body>{}</body></html>", body), "text/html")
    }

    async fn mount(server: &MockServer, route: &str, body: &str) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(html(body))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_invalid_seed_is_an_error() {
        let (coordinator, _) = coordinator(&test_config());
        for seed in ["not a url", "mailto:a@x.org", "ftp://x.org/"] {
            let result = coordinator.run(seed).await;
            assert!(matches!(result, Err(SeekError::InvalidSeed(_))), "{}", seed);
        }
    }

    #[tokio::test]
    async fn test_failed_fetch_still_terminates() {
        let server = MockServer::start().await;
        mount(&server, "/", r#"welcome <a href="/missing">gone</a> <a href="/ok">ok</a>"#).await;
        mount(&server, "/ok", "lighthouse keeper").await;

        let (coordinator, index) = coordinator(&test_config());
        let report = coordinator.run(&format!("{}/", server.uri())).await.unwrap();

        assert_eq!(report.stop_reason, StopReason::Exhausted);
        assert!(!report.drain_timed_out);
        assert_eq!(
            report.visited.get(&format!("{}/missing", server.uri())),
            Some(&PageState::FetchFailed)
        );
        assert_eq!(
            report.visited.get(&format!("{}/ok", server.uri())),
            Some(&PageState::Indexed)
        );
        assert_eq!(index.total_docs().unwrap(), 2);
    }

    #[tokio::test]
    async fn test_cycles_are_visited_once() {
        let server = MockServer::start().await;
        mount(&server, "/", r#"<a href="/a">a</a> <a href="/b">b</a> <a href="/">home</a>"#).await;
        mount(&server, "/a", r#"<a href="/b">b</a> <a href="/">home</a> <a href="/a#top">self</a>"#).await;
        mount(&server, "/b", r#"<a href="/a">a</a>"#).await;

        let (coordinator, _) = coordinator(&test_config());
        let report = coordinator.run(&format!("{}/", server.uri())).await.unwrap();

        assert_eq!(report.visited.len(), 3);
        let requests = server.received_requests().await.unwrap();
        let page_requests = requests.iter().filter(|r| r.url.path() != "/robots.txt").count();
        assert_eq!(page_requests, 3);
    }

    #[tokio::test]
    async fn test_visited_cap_stops_dispatch() {
        let server = MockServer::start().await;
        let links: String = (0..20).map(|i| format!(r#"<a href="/p{}">p</a> "#, i)).collect();
        mount(&server, "/", &links).await;
        for i in 0..20 {
            mount(&server, &format!("/p{}", i), "leaf").await;
        }

        let mut config = test_config();
        config.crawler.max_visited = 5;
        let (coordinator, _) = coordinator(&config);
        let report = coordinator.run(&format!("{}/", server.uri())).await.unwrap();

        assert_eq!(report.stop_reason, StopReason::VisitedCap);
        assert_eq!(report.visited.len(), 5);
    }

    #[tokio::test]
    async fn test_full_frontier_drops_cleaned_links() {
        let server = MockServer::start().await;
        let links: String = (0..10).map(|i| format!(r#"<a href="/p{}">p</a> "#, i)).collect();
        mount(&server, "/", &links).await;
        for i in 0..10 {
            mount(&server, &format!("/p{}", i), "leaf").await;
        }

        let mut config = test_config();
        config.crawler.max_frontier = 3;
        config.crawler.fetch_workers = 1;
        // each dispatch waits, so cleaned links pile up against the cap
        config.crawler.default_crawl_delay_ms = 200;
        let (coordinator, _) = coordinator(&config);
        let report = coordinator.run(&format!("{}/", server.uri())).await.unwrap();

        assert_eq!(report.stop_reason, StopReason::Exhausted);
        assert!(report.frontier_drops > 0);
        assert!(report.visited.len() < 11);
        // every cleaned link was either visited or dropped
        assert_eq!(report.visited.len() - 1 + report.frontier_drops, 10);
    }

    #[tokio::test]
    async fn test_in_flight_pages_are_indexed_while_draining() {
        let server = MockServer::start().await;
        let links: String = (0..10).map(|i| format!(r#"<a href="/p{}">p</a> "#, i)).collect();
        mount(&server, "/", &links).await;
        for i in 0..10 {
            Mock::given(method("GET"))
                .and(path(format!("/p{}", i)))
                .respond_with(html("slow leaf").set_delay(Duration::from_millis(300)))
                .mount(&server)
                .await;
        }

        let mut config = test_config();
        config.crawler.max_visited = 4;
        let (coordinator, index) = coordinator(&config);
        let report = coordinator.run(&format!("{}/", server.uri())).await.unwrap();

        assert_eq!(report.stop_reason, StopReason::VisitedCap);
        assert!(!report.drain_timed_out);
        assert_eq!(report.visited.len(), 4);
        assert_eq!(report.pages_indexed, 4);
        assert!(report.visited.values().all(|s| *s == PageState::Indexed));
        assert_eq!(index.total_docs().unwrap(), 4);
    }

    #[tokio::test]
    async fn test_stall_detection() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(html("slow").set_delay(Duration::from_secs(3)))
            .mount(&server)
            .await;

        let mut config = test_config();
        config.crawler.progress_interval_ms = 50;
        config.crawler.stall_timeout_ms = 200;
        config.crawler.drain_timeout_ms = 100;
        let (coordinator, _) = coordinator(&config);
        let report = coordinator.run(&format!("{}/", server.uri())).await.unwrap();

        assert_eq!(report.stop_reason, StopReason::Stalled);
        assert!(report.drain_timed_out);
        assert!(report.elapsed < Duration::from_secs(3));
    }
}
