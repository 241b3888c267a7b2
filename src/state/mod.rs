//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `PageState`: Tracks where a URL is in the crawl pipeline (queued, fetching, indexed, etc.)
//! - `CrawlReport`: Final per-URL states and run-level outcome of one crawl

mod page_state;
mod report;

// Re-export main types
pub use page_state::PageState;
pub use report::{print_report, CrawlReport, StopReason};
