//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the crawl loop that drives
//! Frontier -> Fetcher -> PageProcessor -> Sink until the frontier is
//! exhausted, the page budget is reached or the optional deadline passes.
//!
//! The loop is sequential: one URL is fetched, processed and its links
//! enqueued before the next dequeue. Breadth-first order and the visited
//! check therefore need no locking.

use crate::config::{validate, Config, CrawlSettings};
use crate::crawler::fetcher::Fetcher;
use crate::crawler::frontier::Frontier;
use crate::crawler::processor::PageProcessor;
use crate::output::{open_sink, RecordSink};
use crate::state::{CrawlState, StopReason};
use crate::url::{parse_absolute, Scope};
use crate::HarvestError;
use chrono::{DateTime, Utc};
use std::time::Instant;
use url::Url;

/// Aggregate outcome of one crawl run
#[derive(Debug, Clone)]
pub struct CrawlResult {
    /// Records accepted by the sink
    pub records_written: u64,

    /// Pages fetched successfully
    pub pages_visited: u64,

    /// Pages whose fetch failed
    pub fetch_failures: u64,

    /// Why the crawl stopped
    pub stop_reason: StopReason,

    /// Terminal lifecycle state
    pub state: CrawlState,

    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl CrawlResult {
    /// Wall-clock duration of the run
    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

/// What a single loop iteration did
enum Visit {
    Processed,
    FetchFailed,
    DeadlineReached,
    Aborted(String),
}

/// Main crawler coordinator structure
pub struct Coordinator {
    settings: CrawlSettings,
    root: Url,
    frontier: Frontier,
    fetcher: Fetcher,
    processor: PageProcessor,
    sink: Box<dyn RecordSink>,
    state: CrawlState,
    pages_visited: u64,
    fetch_failures: u64,
}

impl Coordinator {
    /// Creates a new coordinator, opening the configured output
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(HarvestError)` - Invalid configuration or the output target could not be opened
    pub fn new(config: Config) -> Result<Self, HarvestError> {
        validate(&config)?;
        let sink = open_sink(&config.output)?;
        Self::build(config, sink)
    }

    /// Creates a coordinator that writes to a caller-provided sink
    pub fn with_sink(config: Config, sink: Box<dyn RecordSink>) -> Result<Self, HarvestError> {
        validate(&config)?;
        Self::build(config, sink)
    }

    /// Assembles the coordinator from an already validated config
    fn build(config: Config, sink: Box<dyn RecordSink>) -> Result<Self, HarvestError> {
        let root = parse_absolute(&config.crawl.start_url)?;
        let scope = Scope::new(config.crawl.scope_prefix())?;
        let fetcher = Fetcher::new(&config.crawl, config.auth.as_ref())?;
        let processor = PageProcessor::new(&config.crawl)?;

        Ok(Self {
            frontier: Frontier::new(root.clone(), scope),
            settings: config.crawl,
            root,
            fetcher,
            processor,
            sink,
            state: CrawlState::Idle,
            pages_visited: 0,
            fetch_failures: 0,
        })
    }

    pub fn state(&self) -> CrawlState {
        self.state
    }

    /// Runs the main crawl loop
    ///
    /// Per-page fetch failures are logged and skipped. Only a failure to
    /// write output ends the run early, as `StopReason::Aborted`.
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlResult)` - The run reached a terminal state
    /// * `Err(HarvestError)` - The coordinator was already run
    pub async fn run(&mut self) -> Result<CrawlResult, HarvestError> {
        self.state = self.state.transition(CrawlState::Running)?;

        let started_at = Utc::now();
        let start_time = Instant::now();
        let deadline = self.settings.max_runtime().map(|limit| start_time + limit);
        let max_pages = self.settings.max_pages;

        tracing::info!(
            "Starting crawl at {} (scope: {}, budget: {} pages)",
            self.root,
            self.frontier.scope().prefix(),
            max_pages
        );

        self.frontier.enqueue(self.root.as_str());

        let mut stop_reason = loop {
            if deadline.is_some_and(|d| Instant::now() >= d) {
                tracing::warn!("Maximum runtime reached, stopping crawl");
                break StopReason::DeadlineReached;
            }

            let url = match self.frontier.dequeue() {
                Some(url) => url,
                None => {
                    tracing::info!("Frontier is empty, crawl complete");
                    break StopReason::FrontierExhausted;
                }
            };

            if self.frontier.is_visited(&url) {
                tracing::trace!("Skipping already visited {}", url);
                continue;
            }

            match self.visit(&url, deadline).await {
                Visit::Processed => {}
                Visit::FetchFailed => continue,
                Visit::DeadlineReached => {
                    tracing::warn!("Maximum runtime reached while fetching {}, stopping crawl", url);
                    break StopReason::DeadlineReached;
                }
                Visit::Aborted(cause) => break StopReason::Aborted(cause),
            }

            // Progress reporting every 10 pages
            if self.pages_visited % 10 == 0 {
                let rate = self.pages_visited as f64 / start_time.elapsed().as_secs_f64();
                tracing::info!(
                    "Progress: {} pages visited, {} records, {} in frontier, {:.2} pages/sec",
                    self.pages_visited,
                    self.sink.record_count(),
                    self.frontier.len(),
                    rate
                );
            }

            if self.sink.record_count() >= max_pages {
                tracing::info!("Page budget of {} reached", max_pages);
                break StopReason::BudgetReached;
            }
        };

        if let Err(e) = self.sink.finalize() {
            tracing::error!("Failed to finalize output: {}", e);
            if !matches!(stop_reason, StopReason::Aborted(_)) {
                stop_reason = StopReason::Aborted(e.to_string());
            }
        }

        self.state = self.state.transition(stop_reason.terminal_state())?;

        let result = CrawlResult {
            records_written: self.sink.record_count(),
            pages_visited: self.pages_visited,
            fetch_failures: self.fetch_failures,
            stop_reason,
            state: self.state,
            started_at,
            finished_at: Utc::now(),
        };

        tracing::info!(
            "Crawl {}: {} records written, {} pages visited, {} fetch failures ({}) in {:?}",
            result.state,
            result.records_written,
            result.pages_visited,
            result.fetch_failures,
            result.stop_reason,
            start_time.elapsed()
        );

        Ok(result)
    }

    /// Fetches and processes a single URL
    ///
    /// A failed fetch still marks the URL visited so it is never retried in
    /// this run, and its links are never enqueued. A page whose redirects end
    /// outside the scope counts as a failed fetch. The fetch itself is cut
    /// short when `deadline` passes.
    async fn visit(&mut self, url: &Url, deadline: Option<Instant>) -> Visit {
        tracing::debug!("Crawling {}", url);

        let fetched = match deadline {
            Some(d) => {
                match tokio::time::timeout_at(d.into(), self.fetcher.fetch(url)).await {
                    Ok(fetched) => fetched,
                    Err(_) => return Visit::DeadlineReached,
                }
            }
            None => self.fetcher.fetch(url).await,
        };

        let page = match fetched {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!("Fetch failed: {}", e);
                self.frontier.mark_visited(url);
                self.fetch_failures += 1;
                return Visit::FetchFailed;
            }
        };

        self.frontier.mark_visited(url);

        if !self.frontier.scope().contains(&page.final_url) {
            tracing::warn!(
                "{} redirected out of scope to {}, skipping",
                url,
                page.final_url
            );
            self.fetch_failures += 1;
            return Visit::FetchFailed;
        }

        self.pages_visited += 1;

        let processed = self.processor.process(url, &page.final_url, &page.body);

        if let Some(record) = &processed.record {
            if let Err(e) = self.sink.append(record) {
                tracing::error!("Failed to write record for {}: {}", url, e);
                return Visit::Aborted(e.to_string());
            }
            tracing::debug!("Extracted {} chars from {}", record.extracted_text.len(), url);
        }

        let mut queued = 0;
        for link in &processed.links {
            if self.frontier.enqueue(link.as_str()).is_queued() {
                queued += 1;
            }
        }
        tracing::trace!(
            "{}: {} matching links, {} newly queued",
            url,
            processed.links.len(),
            queued
        );

        Visit::Processed
    }
}

/// Runs a complete crawl operation
///
/// # Example
///
/// ```no_run
/// use review_harvest::config::load_config;
/// use review_harvest::crawler::run_crawl;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("harvest.toml"))?;
/// let result = run_crawl(config).await?;
/// println!("{} records ({})", result.records_written, result.stop_reason);
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: Config) -> Result<CrawlResult, HarvestError> {
    let mut coordinator = Coordinator::new(config)?;
    coordinator.run().await
}
