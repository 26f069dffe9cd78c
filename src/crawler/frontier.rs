//! Breadth-first frontier for the crawl
//!
//! This module owns the queue of URLs awaiting a visit together with the
//! visited set. It handles:
//! - Normalizing raw hrefs against the crawl root before any dedup check
//! - Dropping URLs outside the crawl scope
//! - Rejecting URLs that were already visited or are already queued
//! - FIFO dequeue so pages are visited in discovery order

use crate::url::{normalize_url, Scope};
use std::collections::{HashSet, VecDeque};
use url::Url;

/// What happened to a URL offered to the frontier
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnqueueOutcome {
    /// Appended to the tail of the queue
    Queued(Url),

    /// The href could not be turned into an absolute HTTP(S) URL
    Invalid,

    /// Normalized URL does not start with the scope prefix
    OutOfScope,

    /// Already fetched (or attempted) in this run
    AlreadyVisited,

    /// Already waiting in the queue
    AlreadyQueued,
}

impl EnqueueOutcome {
    pub fn is_queued(&self) -> bool {
        matches!(self, Self::Queued(_))
    }
}

/// FIFO work queue plus visited set for a single crawl run
///
/// Enqueue is strict: a URL is only queued if it is in scope, has not been
/// visited and is not already pending, so the queue never holds duplicates.
/// The visited set only grows.
#[derive(Debug)]
pub struct Frontier {
    root: Url,
    scope: Scope,
    queue: VecDeque<Url>,
    pending: HashSet<String>,
    visited: HashSet<String>,
}

impl Frontier {
    /// Creates an empty frontier
    ///
    /// # Arguments
    ///
    /// * `root` - Base for resolving root-relative hrefs
    /// * `scope` - Prefix every queued URL must start with
    pub fn new(root: Url, scope: Scope) -> Self {
        Self {
            root,
            scope,
            queue: VecDeque::new(),
            pending: HashSet::new(),
            visited: HashSet::new(),
        }
    }

    /// Normalizes `raw` and appends it to the queue if it is admissible
    pub fn enqueue(&mut self, raw: &str) -> EnqueueOutcome {
        let url = match normalize_url(raw, &self.root) {
            Ok(url) => url,
            Err(e) => {
                tracing::trace!("Dropping href {:?}: {}", raw, e);
                return EnqueueOutcome::Invalid;
            }
        };

        if !self.scope.contains(&url) {
            tracing::trace!("Dropping out-of-scope URL {}", url);
            return EnqueueOutcome::OutOfScope;
        }

        if self.visited.contains(url.as_str()) {
            return EnqueueOutcome::AlreadyVisited;
        }

        if !self.pending.insert(url.as_str().to_string()) {
            return EnqueueOutcome::AlreadyQueued;
        }

        self.queue.push_back(url.clone());
        EnqueueOutcome::Queued(url)
    }

    /// Removes and returns the oldest queued URL
    pub fn dequeue(&mut self) -> Option<Url> {
        let url = self.queue.pop_front()?;
        self.pending.remove(url.as_str());
        Some(url)
    }

    /// Records that `url` has been fetched or attempted
    ///
    /// Returns false if it was already marked.
    pub fn mark_visited(&mut self, url: &Url) -> bool {
        self.visited.insert(url.as_str().to_string())
    }

    pub fn is_visited(&self, url: &Url) -> bool {
        self.visited.contains(url.as_str())
    }

    /// Number of URLs waiting in the queue
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }
}
