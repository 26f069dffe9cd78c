//! State module for tracking crawl progress
//!
//! - `CrawlState`: the lifecycle of a single crawl run
//! - `StopReason`: why a run reached its terminal state

mod crawl_state;

pub use crawl_state::{CrawlState, StopReason};
