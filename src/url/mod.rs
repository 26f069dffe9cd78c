//! URL handling module for Review-Harvest
//!
//! This module provides href normalization, glob matching on raw hrefs,
//! and prefix scoping of the crawl.

mod matcher;
mod normalize;

use crate::UrlError;
use url::Url;

// Re-export main functions
pub use matcher::matches_glob;
pub use normalize::{normalize_url, parse_absolute};

/// Restricts a crawl to URLs under a fixed prefix
///
/// The prefix is compared against the serialized form of already-normalized
/// URLs, so `https://Example.test` and `https://example.test/` are the same
/// scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
    prefix: String,
}

impl Scope {
    /// Builds a scope from an absolute URL prefix
    ///
    /// # Examples
    ///
    /// ```
    /// use review_harvest::url::Scope;
    /// use url::Url;
    ///
    /// let scope = Scope::new("https://example.test/").unwrap();
    /// assert!(scope.contains(&Url::parse("https://example.test/reviews/1").unwrap()));
    /// assert!(!scope.contains(&Url::parse("https://other.test/").unwrap()));
    /// ```
    pub fn new(prefix: &str) -> Result<Self, UrlError> {
        let url = parse_absolute(prefix)?;

        Ok(Self {
            prefix: url.to_string(),
        })
    }

    /// Returns true if the URL falls under this scope
    pub fn contains(&self, url: &Url) -> bool {
        url.as_str().starts_with(&self.prefix)
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}
