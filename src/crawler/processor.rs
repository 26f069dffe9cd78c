//! Page processor for classifying pages and extracting content and links
//!
//! This module handles parsing fetched HTML to:
//! - Decide whether a page is a content page
//! - Extract the text of the first node matching the content selector
//! - Collect outbound links whose raw `href` matches the link pattern
//!
//! Parsing is best effort. Malformed markup and missing elements degrade to
//! empty text or no links; nothing here fails.

use crate::config::CrawlSettings;
use crate::output::PageRecord;
use crate::url::{matches_glob, normalize_url, parse_absolute};
use crate::{ConfigError, UrlError};
use scraper::{Html, Selector};
use url::Url;

/// Elements whose `href` is considered for link discovery
const LINK_SELECTOR: &str = "a[href]";

/// Result of processing one fetched page
#[derive(Debug, Clone, Default)]
pub struct ProcessedPage {
    /// Present when the page is a content page
    pub record: Option<PageRecord>,

    /// Absolute URLs of matching links, in document order
    pub links: Vec<Url>,
}

/// Classifies pages and extracts records and links
#[derive(Debug)]
pub struct PageProcessor {
    root: Url,
    content_selector: Selector,
    link_selector: Selector,
    link_pattern: String,
    content_path: Option<String>,
}

impl PageProcessor {
    /// Builds a processor, compiling both selectors once
    pub fn new(settings: &CrawlSettings) -> Result<Self, ConfigError> {
        let root = parse_absolute(&settings.start_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid start-url: {}", e)))?;

        let content_selector = Selector::parse(&settings.content_selector).map_err(|e| {
            ConfigError::InvalidSelector {
                selector: settings.content_selector.clone(),
                message: format!("{:?}", e),
            }
        })?;

        let link_selector =
            Selector::parse(LINK_SELECTOR).map_err(|e| ConfigError::InvalidSelector {
                selector: LINK_SELECTOR.to_string(),
                message: format!("{:?}", e),
            })?;

        Ok(Self {
            root,
            content_selector,
            link_selector,
            link_pattern: settings.link_pattern.clone(),
            content_path: settings.content_path.clone(),
        })
    }

    /// Returns true if `url` should produce a record
    ///
    /// A content page contains the configured content path (any page when
    /// none is configured) and is not the crawl root itself.
    pub fn is_content_page(&self, url: &Url) -> bool {
        if url == &self.root {
            return false;
        }

        match &self.content_path {
            Some(path) => url.as_str().contains(path.as_str()),
            None => true,
        }
    }

    /// Classifies the page and extracts its record and links
    ///
    /// # Arguments
    ///
    /// * `url` - The URL the page was requested under (used for classification and the record)
    /// * `final_url` - The URL after redirects (base for resolving hrefs)
    /// * `html` - The response body
    pub fn process(&self, url: &Url, final_url: &Url, html: &str) -> ProcessedPage {
        let document = Html::parse_document(html);

        let record = if self.is_content_page(url) {
            Some(PageRecord {
                url: url.to_string(),
                extracted_text: extract_fragment_text(&document, &self.content_selector),
            })
        } else {
            None
        };

        let links = extract_matching_links(
            &document,
            &self.link_selector,
            &self.link_pattern,
            final_url,
        );

        ProcessedPage { record, links }
    }
}

/// Returns the text of the first node matching `selector`, or an empty string
pub fn extract_fragment_text(document: &Html, selector: &Selector) -> String {
    document
        .select(selector)
        .next()
        .map(|element| element.text().collect::<String>())
        .unwrap_or_default()
}

/// Collects links whose raw `href` matches `pattern`, resolved against `base`
///
/// `anchors` selects the candidate elements, normally `a[href]`. The glob is
/// tested on the attribute value exactly as written in the page, before any
/// URL joining.
pub fn extract_matching_links(
    document: &Html,
    anchors: &Selector,
    pattern: &str,
    base: &Url,
) -> Vec<Url> {
    let mut links = Vec::new();

    for element in document.select(anchors) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };

        if !matches_glob(pattern, href) {
            continue;
        }

        match resolve_href(href, base) {
            Ok(url) => links.push(url),
            Err(e) => tracing::trace!("Skipping href {:?}: {}", href, e),
        }
    }

    links
}

fn resolve_href(href: &str, base: &Url) -> Result<Url, UrlError> {
    normalize_url(href, base)
}
