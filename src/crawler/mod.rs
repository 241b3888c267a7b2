//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with timeouts and compression
//! - HTML parsing into words and links
//! - Fixed-size worker pools for fetch, extract and clean stages
//! - Overall crawl coordination with robots.txt politeness

mod coordinator;
mod fetcher;
mod parser;
mod workers;

pub use coordinator::Coordinator;
pub use fetcher::{build_http_client, fetch_page, page_title, FetchError};
pub use parser::{extract_page, extract_title, ExtractedPage};
pub use workers::{ExtractionResult, Pipeline, StageInputs};

use crate::config::Config;
use crate::index::{Analyzer, SearchIndex};
use crate::state::CrawlReport;
use crate::{Result, SeekError};
use std::sync::Arc;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Build the HTTP client and robots.txt cache
/// 2. Start the worker pools
/// 3. Crawl outward from `config.crawler.seed`, indexing every page
/// 4. Drain outstanding work and return the run's report
///
/// # Arguments
///
/// * `config` - The full configuration; the seed must be set
/// * `index` - Index that receives extracted pages
/// * `analyzer` - Stopword filter and stemmer applied to page words
///
/// # Returns
///
/// * `Ok(CrawlReport)` - Crawl ran to completion (or stopped on a cap or stall)
/// * `Err(SeekError)` - No usable seed or the HTTP client could not be built
pub async fn crawl(
    config: &Config,
    index: Arc<dyn SearchIndex>,
    analyzer: Arc<Analyzer>,
) -> Result<CrawlReport> {
    let seed = config
        .crawler
        .seed
        .clone()
        .ok_or_else(|| SeekError::InvalidSeed("no seed configured".to_string()))?;

    let coordinator = Coordinator::new(config, index, analyzer)?;
    coordinator.run(&seed).await
}
