//! End-of-crawl reporting
//!
//! Renders a `CrawlResult` for the command line.

use crate::crawler::CrawlResult;

/// Formats a crawl result as a human readable report
pub fn format_result(result: &CrawlResult) -> String {
    let mut out = String::new();

    out.push_str("=== Crawl Result ===\n\n");
    out.push_str(&format!("Status: {}\n", result.state));
    out.push_str(&format!("Stop reason: {}\n", result.stop_reason));
    out.push_str(&format!("Records written: {}\n", result.records_written));
    out.push_str(&format!("Pages visited: {}\n", result.pages_visited));
    out.push_str(&format!("Fetch failures: {}\n", result.fetch_failures));
    out.push_str(&format!(
        "Started: {}\n",
        result.started_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    out.push_str(&format!(
        "Duration: {}s\n",
        result.duration().num_seconds()
    ));

    out
}

/// Prints a crawl result to stdout
pub fn print_result(result: &CrawlResult) {
    print!("{}", format_result(result));
}
