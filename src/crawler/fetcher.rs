//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building one reusable HTTP client per crawl run
//! - Pre-seeding the cookie jar with the auth cookie
//! - Following redirects and reporting the final URL
//! - Classifying failures into `FetchError`

use crate::config::{AuthCookie, CrawlSettings};
use crate::{ConfigError, HarvestError};
use reqwest::cookie::Jar;
use reqwest::{redirect::Policy, Client};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Default User-Agent when the configuration does not set one
pub const DEFAULT_USER_AGENT: &str = concat!("review-harvest/", env!("CARGO_PKG_VERSION"));

/// Maximum redirect hops followed for a single request
const MAX_REDIRECTS: usize = 10;

/// Bound on establishing a TCP/TLS connection, independent of `request-timeout-secs`
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// A successfully fetched page
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// URL after following redirects; base for resolving relative hrefs
    pub final_url: Url,

    /// HTTP status code
    pub status: u16,

    /// Response body decoded as text
    pub body: String,
}

/// Failure to fetch a single URL
///
/// Always recoverable at the crawl level: the URL contributes neither a
/// record nor links.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Network error for {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to read body of {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl FetchError {
    /// HTTP status code, when the server answered
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn url(&self) -> &str {
        match self {
            Self::Status { url, .. }
            | Self::Timeout { url }
            | Self::Network { url, .. }
            | Self::Body { url, .. } => url,
        }
    }

    fn from_reqwest(url: &Url, error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout {
                url: url.to_string(),
            }
        } else {
            Self::Network {
                url: url.to_string(),
                source: error,
            }
        }
    }
}

/// Builds the cookie jar holding the optional auth cookie
///
/// The cookie is scoped to `auth.domain` when set, otherwise to the host of
/// the start URL.
fn build_cookie_jar(start_url: &Url, auth: &AuthCookie) -> Result<Jar, ConfigError> {
    let value = auth.resolve_value()?;
    let jar = Jar::default();

    let (cookie, cookie_url) = match &auth.domain {
        Some(domain) => {
            let url = Url::parse(&format!("{}://{}/", start_url.scheme(), domain))
                .map_err(|e| ConfigError::InvalidUrl(format!("Invalid cookie domain '{}': {}", domain, e)))?;
            (
                format!("{}={}; Domain={}; Path=/", auth.cookie_name, value, domain),
                url,
            )
        }
        None => (
            format!("{}={}; Path=/", auth.cookie_name, value),
            start_url.clone(),
        ),
    };

    jar.add_cookie_str(&cookie, &cookie_url);
    Ok(jar)
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `settings` - Crawl settings (user agent, timeout)
/// * `auth` - Optional cookie attached to every request
///
/// # Returns
///
/// * `Ok(Client)` - Client reused for every request of the run
/// * `Err(HarvestError)` - Cookie could not be resolved or client failed to build
pub fn build_http_client(
    settings: &CrawlSettings,
    auth: Option<&AuthCookie>,
) -> Result<Client, HarvestError> {
    let user_agent = settings
        .user_agent
        .clone()
        .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());

    let mut builder = Client::builder()
        .user_agent(user_agent)
        .redirect(Policy::limited(MAX_REDIRECTS))
        .connect_timeout(CONNECT_TIMEOUT)
        .gzip(true)
        .brotli(true);

    if let Some(timeout) = settings.request_timeout() {
        builder = builder.timeout(timeout);
    }

    if let Some(auth) = auth {
        let start_url = Url::parse(&settings.start_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid start-url: {}", e)))?;
        let jar = build_cookie_jar(&start_url, auth)?;
        builder = builder.cookie_provider(Arc::new(jar));
        tracing::debug!("Auth cookie '{}' attached to client", auth.cookie_name);
    }

    Ok(builder.build()?)
}

/// Performs GET requests over one persistent client
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    /// Builds the fetcher for a crawl run
    pub fn new(settings: &CrawlSettings, auth: Option<&AuthCookie>) -> Result<Self, HarvestError> {
        Ok(Self {
            client: build_http_client(settings, auth)?,
        })
    }

    /// Fetches a URL, following redirects
    ///
    /// # Returns
    ///
    /// * `Ok(FetchedPage)` - 2xx response with its body and final URL
    /// * `Err(FetchError)` - Network failure, timeout, or non-2xx status
    pub async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        let status = response.status();
        let final_url = response.url().clone();

        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        if &final_url != url {
            tracing::debug!("{} redirected to {}", url, final_url);
        }

        let body = response.text().await.map_err(|e| FetchError::Body {
            url: url.to_string(),
            source: e,
        })?;

        Ok(FetchedPage {
            final_url,
            status: status.as_u16(),
            body,
        })
    }
}
