use crate::ConfigError;
use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Review-Harvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawl: CrawlSettings,
    pub output: OutputConfig,
    #[serde(default)]
    pub auth: Option<AuthCookie>,
}

/// Crawl behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CrawlSettings {
    /// Absolute URL the crawl starts from
    pub start_url: String,

    /// fnmatch-style glob tested against raw `href` values
    pub link_pattern: String,

    /// CSS selector for the fragment extracted from content pages
    pub content_selector: String,

    /// Maximum number of records to write
    pub max_pages: u64,

    /// Path fragment a URL must contain to count as a content page
    #[serde(default)]
    pub content_path: Option<String>,

    /// URL prefix every fetched page must start with (defaults to `start_url`)
    #[serde(default)]
    pub allowed_prefix: Option<String>,

    /// Per-request timeout in seconds
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,

    /// Wall-clock limit for the whole crawl in seconds
    #[serde(default)]
    pub max_runtime_secs: Option<u64>,

    /// User-Agent header sent with every request
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl CrawlSettings {
    /// Returns the scoping prefix, falling back to the start URL
    pub fn scope_prefix(&self) -> &str {
        self.allowed_prefix.as_deref().unwrap_or(&self.start_url)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    pub fn max_runtime(&self) -> Option<Duration> {
        self.max_runtime_secs.map(Duration::from_secs)
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Destination file for extracted records
    pub path: String,

    /// How records are laid out in the destination file
    #[serde(default)]
    pub format: OutputFormat,
}

/// Persistence mode for extracted records
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    /// One JSON object per line, appended as each record is produced
    #[default]
    JsonLines,

    /// A single JSON array written once when the crawl ends
    JsonArray,
}

/// Cookie attached to every request for sites that require a login
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AuthCookie {
    pub cookie_name: String,

    /// Literal cookie value
    #[serde(default)]
    pub cookie_value: Option<String>,

    /// Name of an environment variable holding the cookie value
    #[serde(default)]
    pub cookie_value_env: Option<String>,

    /// Host the cookie is scoped to (defaults to the start URL's host)
    #[serde(default)]
    pub domain: Option<String>,
}

impl AuthCookie {
    /// Resolves the cookie value, reading the environment when configured to
    pub fn resolve_value(&self) -> Result<String, ConfigError> {
        if let Some(value) = &self.cookie_value {
            return Ok(value.clone());
        }

        match &self.cookie_value_env {
            Some(var) => std::env::var(var).map_err(|_| ConfigError::MissingEnv(var.clone())),
            None => Err(ConfigError::Validation(format!(
                "auth cookie '{}' has neither cookie-value nor cookie-value-env",
                self.cookie_name
            ))),
        }
    }
}
