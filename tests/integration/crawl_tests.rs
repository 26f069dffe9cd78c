//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end, writing to temporary output files.

use review_harvest::config::{AuthCookie, Config, CrawlSettings, OutputConfig, OutputFormat};
use review_harvest::crawler::{crawl, Coordinator};
use review_harvest::state::{CrawlState, StopReason};
use review_harvest::{HarvestError, PageRecord};
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration rooted at the mock server
fn create_test_config(base_url: &str, max_pages: u64, output: &Path) -> Config {
    Config {
        crawl: CrawlSettings {
            start_url: format!("{}/", base_url),
            link_pattern: "*/reviews/*".to_string(),
            content_selector: ".body".to_string(),
            max_pages,
            content_path: Some("/reviews".to_string()),
            allowed_prefix: None,
            request_timeout_secs: Some(5),
            max_runtime_secs: None,
            user_agent: Some("TestBot/1.0".to_string()),
        },
        output: OutputConfig {
            path: output.to_string_lossy().into_owned(),
            format: OutputFormat::JsonLines,
        },
        auth: None,
    }
}

/// Mounts an HTML page that must be requested exactly `times` times
async fn mount_page(server: &MockServer, page_path: &str, body: &str, times: u64) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .expect(times)
        .mount(server)
        .await;
}

/// Reads newline-delimited records back from disk
fn read_json_lines(path: &Path) -> Vec<PageRecord> {
    std::fs::read_to_string(path)
        .expect("Failed to read output")
        .lines()
        .map(|line| serde_json::from_str(line).expect("Invalid JSON line"))
        .collect()
}

#[tokio::test]
async fn test_budget_reached_scenario() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("reviews.jsonl");

    // Root links to two review pages and one unrelated page
    mount_page(
        &mock_server,
        "/",
        r#"<html><body>
            <a href="/reviews/1">Review 1</a>
            <a href="/other/2">Other</a>
            <a href="/reviews/3">Review 3</a>
        </body></html>"#,
        1,
    )
    .await;
    mount_page(
        &mock_server,
        "/reviews/1",
        r#"<html><body><div class="body">Great record</div></body></html>"#,
        1,
    )
    .await;
    mount_page(
        &mock_server,
        "/reviews/3",
        r#"<html><body><div class="body">Weak record</div><a href="/reviews/5">Next</a></body></html>"#,
        1,
    )
    .await;
    // Neither the off-pattern page nor anything past the budget is fetched
    mount_page(&mock_server, "/other/2", "", 0).await;
    mount_page(&mock_server, "/reviews/5", "", 0).await;

    let config = create_test_config(&mock_server.uri(), 2, &output);
    let result = crawl(config).await.expect("Crawl failed to start");

    assert_eq!(result.stop_reason, StopReason::BudgetReached);
    assert_eq!(result.state, CrawlState::Completed);
    assert_eq!(result.records_written, 2);

    let records = read_json_lines(&output);
    assert_eq!(
        records,
        vec![
            PageRecord {
                url: format!("{}/reviews/1", mock_server.uri()),
                extracted_text: "Great record".to_string(),
            },
            PageRecord {
                url: format!("{}/reviews/3", mock_server.uri()),
                extracted_text: "Weak record".to_string(),
            },
        ]
    );

    // Output keeps the legacy field names
    let first_line = std::fs::read_to_string(&output).unwrap();
    let value: serde_json::Value =
        serde_json::from_str(first_line.lines().next().unwrap()).unwrap();
    assert!(value.get("html").is_some());
    assert!(value.get("url").is_some());
}

#[tokio::test]
async fn test_no_duplicate_fetches_or_records() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("reviews.jsonl");

    // Every review page links to every other one, plus itself
    let links = r#"<a href="/reviews/1">1</a><a href="/reviews/2">2</a><a href="/reviews/2#comments">2c</a>"#;
    mount_page(&mock_server, "/", links, 1).await;
    mount_page(
        &mock_server,
        "/reviews/1",
        &format!(r#"<div class="body">one</div>{}"#, links),
        1,
    )
    .await;
    mount_page(
        &mock_server,
        "/reviews/2",
        &format!(r#"<div class="body">two</div>{}<a href="/">home</a>"#, links),
        1,
    )
    .await;

    let config = create_test_config(&mock_server.uri(), 100, &output);
    let result = crawl(config).await.unwrap();

    assert_eq!(result.stop_reason, StopReason::FrontierExhausted);
    assert_eq!(result.pages_visited, 3);

    let records = read_json_lines(&output);
    let unique: HashSet<&str> = records.iter().map(|r| r.url.as_str()).collect();
    assert_eq!(records.len(), 2);
    assert_eq!(unique.len(), records.len());
}

#[tokio::test]
async fn test_fetch_failure_isolation() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("reviews.jsonl");

    mount_page(
        &mock_server,
        "/",
        r#"<a href="/reviews/a">A</a><a href="/reviews/b">B</a><a href="/reviews/c">C</a>"#,
        1,
    )
    .await;
    mount_page(&mock_server, "/reviews/a", r#"<div class="body">a</div>"#, 1).await;
    Mock::given(method("GET"))
        .and(path("/reviews/b"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;
    // C links back to B; the failed page is never retried
    mount_page(
        &mock_server,
        "/reviews/c",
        r#"<div class="body">c</div><a href="/reviews/b">B again</a>"#,
        1,
    )
    .await;

    let config = create_test_config(&mock_server.uri(), 10, &output);
    let result = crawl(config).await.unwrap();

    assert_eq!(result.stop_reason, StopReason::FrontierExhausted);
    assert_eq!(result.state, CrawlState::Completed);
    assert_eq!(result.fetch_failures, 1);
    assert_eq!(result.records_written, 2);

    let texts: Vec<String> = read_json_lines(&output)
        .into_iter()
        .map(|r| r.extracted_text)
        .collect();
    assert_eq!(texts, vec!["a", "c"]);
}

#[tokio::test]
async fn test_failed_page_links_not_followed() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("reviews.jsonl");

    mount_page(&mock_server, "/", r#"<a href="/reviews/gone">Gone</a>"#, 1).await;
    Mock::given(method("GET"))
        .and(path("/reviews/gone"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_string(r#"<a href="/reviews/hidden">Hidden</a>"#),
        )
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/reviews/hidden", "", 0).await;

    let config = create_test_config(&mock_server.uri(), 10, &output);
    let result = crawl(config).await.unwrap();

    assert_eq!(result.fetch_failures, 1);
    assert_eq!(result.records_written, 0);
    assert_eq!(result.stop_reason, StopReason::FrontierExhausted);
}

#[tokio::test]
async fn test_missing_selector_yields_empty_record() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("reviews.jsonl");

    mount_page(&mock_server, "/", r#"<a href="/reviews/1">1</a>"#, 1).await;
    mount_page(
        &mock_server,
        "/reviews/1",
        r#"<html><body><p>No review body on this page</p></body></html>"#,
        1,
    )
    .await;

    let config = create_test_config(&mock_server.uri(), 10, &output);
    let result = crawl(config).await.unwrap();

    assert_eq!(result.records_written, 1);
    let records = read_json_lines(&output);
    assert_eq!(records[0].extracted_text, "");
}

#[tokio::test]
async fn test_scope_enforced() {
    let mock_server = MockServer::start().await;
    let other_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("reviews.jsonl");

    // The pattern matches the foreign link, but it is outside the scope
    mount_page(
        &mock_server,
        "/",
        &format!(
            r#"<a href="{}/reviews/9">Foreign</a><a href="/reviews/1">Local</a>"#,
            other_server.uri()
        ),
        1,
    )
    .await;
    mount_page(&mock_server, "/reviews/1", r#"<div class="body">local</div>"#, 1).await;
    mount_page(&other_server, "/reviews/9", "", 0).await;

    let config = create_test_config(&mock_server.uri(), 10, &output);
    let result = crawl(config).await.unwrap();

    assert_eq!(result.records_written, 1);
    for record in read_json_lines(&output) {
        assert!(record.url.starts_with(&mock_server.uri()));
    }
}

#[tokio::test]
async fn test_allowed_prefix_restricts_paths() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("reviews.jsonl");

    mount_page(
        &mock_server,
        "/publication/57/",
        r#"<a href="/publication/57/reviews/1">In</a><a href="/publication/99/reviews/2">Out</a>"#,
        1,
    )
    .await;
    mount_page(
        &mock_server,
        "/publication/57/reviews/1",
        r#"<div class="body">in scope</div>"#,
        1,
    )
    .await;
    mount_page(&mock_server, "/publication/99/reviews/2", "", 0).await;

    let mut config = create_test_config(&mock_server.uri(), 10, &output);
    config.crawl.start_url = format!("{}/publication/57/", mock_server.uri());
    config.crawl.allowed_prefix = Some(format!("{}/publication/57", mock_server.uri()));

    let result = crawl(config).await.unwrap();
    assert_eq!(result.records_written, 1);
}

#[tokio::test]
async fn test_redirect_final_url_is_link_base() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("reviews.jsonl");

    mount_page(&mock_server, "/", r#"<a href="/reviews/old/">Old</a>"#, 1).await;
    Mock::given(method("GET"))
        .and(path("/reviews/old/"))
        .respond_with(
            ResponseTemplate::new(301)
                .insert_header("location", format!("{}/reviews/new/", mock_server.uri()).as_str()),
        )
        .expect(1)
        .mount(&mock_server)
        .await;
    // The relative href resolves against /reviews/new/, not /reviews/old/
    mount_page(
        &mock_server,
        "/reviews/new/",
        r#"<div class="body">moved</div><a href="page/2">Next</a>"#,
        1,
    )
    .await;
    mount_page(
        &mock_server,
        "/reviews/new/page/2",
        r#"<div class="body">second</div>"#,
        1,
    )
    .await;
    mount_page(&mock_server, "/reviews/old/page/2", "", 0).await;

    let mut config = create_test_config(&mock_server.uri(), 10, &output);
    // Patterns see the raw href, so the relative "page/2" needs a catch-all
    config.crawl.link_pattern = "*".to_string();

    let result = crawl(config).await.unwrap();

    let records = read_json_lines(&output);
    // Records are keyed by the requested URL
    assert_eq!(records[0].url, format!("{}/reviews/old/", mock_server.uri()));
    assert_eq!(records[0].extracted_text, "moved");
    assert_eq!(records[1].extracted_text, "second");
    assert_eq!(result.records_written, 2);
}

#[tokio::test]
async fn test_auth_cookie_sent() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("reviews.jsonl");

    // Pages only answer when the cookie is present
    Mock::given(method("GET"))
        .and(path("/"))
        .and(header("cookie", "session=letmein"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(r#"<a href="/reviews/1">1</a>"#),
        )
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/reviews/1"))
        .and(header("cookie", "session=letmein"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(r#"<div class="body">members only</div>"#),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(&mock_server.uri(), 10, &output);
    config.auth = Some(AuthCookie {
        cookie_name: "session".to_string(),
        cookie_value: Some("letmein".to_string()),
        cookie_value_env: None,
        domain: None,
    });

    let result = crawl(config).await.unwrap();

    assert_eq!(result.fetch_failures, 0);
    assert_eq!(result.records_written, 1);
    assert_eq!(read_json_lines(&output)[0].extracted_text, "members only");
}

#[tokio::test]
async fn test_auth_cookie_with_domain_sent() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("reviews.jsonl");

    Mock::given(method("GET"))
        .and(path("/"))
        .and(header("cookie", "session=scoped"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(r#"<a href="/reviews/1">1</a>"#),
        )
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/reviews/1"))
        .and(header("cookie", "session=scoped"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(r#"<div class="body">domain cookie</div>"#),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(&mock_server.uri(), 10, &output);
    config.auth = Some(AuthCookie {
        cookie_name: "session".to_string(),
        cookie_value: Some("scoped".to_string()),
        cookie_value_env: None,
        domain: Some("127.0.0.1".to_string()),
    });

    let result = crawl(config).await.unwrap();

    assert_eq!(result.fetch_failures, 0);
    assert_eq!(result.records_written, 1);
    assert_eq!(read_json_lines(&output)[0].extracted_text, "domain cookie");
}

#[tokio::test]
async fn test_redirect_out_of_scope_is_skipped() {
    let mock_server = MockServer::start().await;
    let other_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("reviews.jsonl");

    mount_page(
        &mock_server,
        "/",
        r#"<a href="/reviews/1">Leaves</a><a href="/reviews/2">Stays</a>"#,
        1,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/reviews/1"))
        .respond_with(
            ResponseTemplate::new(302)
                .insert_header("location", format!("{}/reviews/x", other_server.uri()).as_str()),
        )
        .expect(1)
        .mount(&mock_server)
        .await;
    // Links on the foreign page are not followed either
    mount_page(
        &other_server,
        "/reviews/x",
        r#"<div class="body">foreign</div><a href="/reviews/y">y</a>"#,
        1,
    )
    .await;
    mount_page(&other_server, "/reviews/y", "", 0).await;
    mount_page(&mock_server, "/reviews/2", r#"<div class="body">local</div>"#, 1).await;

    let config = create_test_config(&mock_server.uri(), 10, &output);
    let result = crawl(config).await.unwrap();

    assert_eq!(result.fetch_failures, 1);
    assert_eq!(result.records_written, 1);

    let records = read_json_lines(&output);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].url, format!("{}/reviews/2", mock_server.uri()));
    assert_eq!(records[0].extracted_text, "local");
}

#[tokio::test]
async fn test_json_array_output() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("nested").join("reviews.json");

    mount_page(
        &mock_server,
        "/",
        r#"<a href="/reviews/1">1</a><a href="/reviews/2">2</a>"#,
        1,
    )
    .await;
    mount_page(&mock_server, "/reviews/1", r#"<div class="body">one</div>"#, 1).await;
    mount_page(&mock_server, "/reviews/2", r#"<div class="body">two</div>"#, 1).await;

    let mut config = create_test_config(&mock_server.uri(), 10, &output);
    config.output.format = OutputFormat::JsonArray;

    let result = crawl(config).await.unwrap();
    assert_eq!(result.records_written, 2);

    let records: Vec<PageRecord> =
        serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[1].extracted_text, "two");
}

#[tokio::test]
async fn test_request_timeout_is_a_fetch_failure() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("reviews.jsonl");

    mount_page(
        &mock_server,
        "/",
        r#"<a href="/reviews/slow">Slow</a><a href="/reviews/fast">Fast</a>"#,
        1,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/reviews/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"<div class="body">late</div>"#)
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/reviews/fast", r#"<div class="body">fast</div>"#, 1).await;

    let mut config = create_test_config(&mock_server.uri(), 10, &output);
    config.crawl.request_timeout_secs = Some(1);

    let result = crawl(config).await.unwrap();

    assert_eq!(result.fetch_failures, 1);
    assert_eq!(result.records_written, 1);
    assert_eq!(read_json_lines(&output)[0].extracted_text, "fast");
}

#[tokio::test]
async fn test_max_runtime_stops_crawl() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("reviews.jsonl");

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"<a href="/reviews/1">1</a>"#)
                .set_delay(Duration::from_millis(1500)),
        )
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/reviews/1", "", 0).await;

    let mut config = create_test_config(&mock_server.uri(), 10, &output);
    config.crawl.max_runtime_secs = Some(1);

    let result = crawl(config).await.unwrap();

    assert_eq!(result.stop_reason, StopReason::DeadlineReached);
    assert_eq!(result.state, CrawlState::Completed);
    assert_eq!(result.records_written, 0);
}

#[tokio::test]
async fn test_unwritable_output_fails_before_crawl() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(&mock_server, "/", "", 0).await;

    // The output path is an existing directory
    let config = create_test_config(&mock_server.uri(), 10, dir.path());
    let result = Coordinator::new(config);

    assert!(matches!(result, Err(HarvestError::Output(_))));
}

#[tokio::test]
async fn test_invalid_config_fails_before_crawl() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("reviews.jsonl");

    let mut config = create_test_config("https://example.test", 10, &output);
    config.crawl.max_pages = 0;

    assert!(matches!(crawl(config).await, Err(HarvestError::Config(_))));
    // Nothing was created for a crawl that never started
    assert!(!output.exists());
}
