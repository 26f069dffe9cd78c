//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - The breadth-first frontier and visited set
//! - HTTP fetching over one reusable client
//! - Page classification, fragment extraction and link discovery
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod frontier;
mod processor;

pub use coordinator::{run_crawl, Coordinator, CrawlResult};
pub use fetcher::{build_http_client, FetchError, FetchedPage, Fetcher, DEFAULT_USER_AGENT};
pub use frontier::{EnqueueOutcome, Frontier};
pub use processor::{extract_fragment_text, extract_matching_links, PageProcessor, ProcessedPage};

pub use crate::output::PageRecord;

use crate::config::Config;
use crate::HarvestError;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Validate the configuration
/// 2. Open the output target
/// 3. Build the HTTP client
/// 4. Walk the frontier from the start URL
/// 5. Finalize the output and report why the crawl stopped
///
/// # Returns
///
/// * `Ok(CrawlResult)` - Crawl reached a terminal state
/// * `Err(HarvestError)` - Crawl could not start
pub async fn crawl(config: Config) -> Result<CrawlResult, HarvestError> {
    run_crawl(config).await
}
