//! Summary of one crawl run

use crate::state::PageState;
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

/// How the main loop came to stop dispatching new work
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Frontier and in-flight work were exhausted
    Exhausted,

    /// The visited set reached its configured maximum
    VisitedCap,

    /// No state-changing event happened within the stall timeout
    Stalled,
}

/// Outcome of a crawl, returned by the coordinator
#[derive(Debug, Clone)]
pub struct CrawlReport {
    /// The seed the crawl started from
    pub seed: String,

    /// Every URL dispatched for a visit, with its final state
    pub visited: HashMap<String, PageState>,

    /// Number of frontier pops discarded because the URL was already visited
    pub duplicates: usize,

    /// Number of cleaned links dropped because the frontier was full
    pub frontier_drops: usize,

    /// Number of `AddDocument` calls that succeeded
    pub pages_indexed: usize,

    /// Number of index writes that failed and were skipped
    pub index_errors: usize,

    /// Why dispatch stopped
    pub stop_reason: StopReason,

    /// Whether the drain phase gave up with work still in flight
    pub drain_timed_out: bool,

    /// Wall-clock duration of the whole crawl
    pub elapsed: Duration,
}

impl CrawlReport {
    pub fn new(seed: impl Into<String>) -> Self {
        Self {
            seed: seed.into(),
            visited: HashMap::new(),
            duplicates: 0,
            frontier_drops: 0,
            pages_indexed: 0,
            index_errors: 0,
            stop_reason: StopReason::Exhausted,
            drain_timed_out: false,
            elapsed: Duration::ZERO,
        }
    }

    /// Returns true if the URL was dispatched (including disallowed ones)
    pub fn was_visited(&self, url: &str) -> bool {
        self.visited.contains_key(url)
    }

    /// Returns true if the URL was actually requested from its host
    pub fn was_fetched(&self, url: &str) -> bool {
        self.visited
            .get(url)
            .map(PageState::was_fetched)
            .unwrap_or(false)
    }

    /// Count of visited URLs per final state
    pub fn tally(&self) -> BTreeMap<PageState, usize> {
        let mut counts = BTreeMap::new();
        for state in self.visited.values() {
            *counts.entry(*state).or_insert(0) += 1;
        }
        counts
    }

    /// Returns true if the crawl ended early for any reason
    pub fn was_cut_short(&self) -> bool {
        self.stop_reason != StopReason::Exhausted || self.drain_timed_out
    }
}

/// Prints the report to stdout in a formatted manner
pub fn print_report(report: &CrawlReport) {
    println!("=== Crawl Report ===\n");

    println!("Overview:");
    println!("  Seed: {}", report.seed);
    println!("  URLs visited: {}", report.visited.len());
    println!("  Pages indexed: {}", report.pages_indexed);
    if report.index_errors > 0 {
        println!("  Index write errors: {}", report.index_errors);
    }
    println!("  Elapsed: {:.1}s", report.elapsed.as_secs_f64());
    println!();

    println!("URLs by State:");
    for (state, count) in report.tally() {
        println!("  {}: {}", state, count);
    }
    println!();

    println!("Skipped Links:");
    println!("  Already visited: {}", report.duplicates);
    println!("  Frontier full: {}", report.frontier_drops);
    println!();

    match report.stop_reason {
        StopReason::Exhausted => println!("Crawl finished: frontier exhausted"),
        StopReason::VisitedCap => println!("Crawl stopped: visited cap reached"),
        StopReason::Stalled => println!("Crawl stopped: no progress before the stall timeout"),
    }
    if report.drain_timed_out {
        println!("Drain timed out with work still in flight");
    }
}
