use crate::config::types::{AuthCookie, Config, CrawlSettings, OutputConfig};
use crate::url::{parse_absolute, Scope};
use crate::ConfigError;
use scraper::Selector;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawl_settings(&config.crawl)?;
    validate_output_config(&config.output)?;
    if let Some(auth) = &config.auth {
        validate_auth(auth)?;
    }
    Ok(())
}

/// Validates crawl settings
fn validate_crawl_settings(settings: &CrawlSettings) -> Result<(), ConfigError> {
    if settings.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max-pages must be >= 1, got {}",
            settings.max_pages
        )));
    }

    validate_absolute_url("start-url", &settings.start_url)?;
    if let Some(prefix) = &settings.allowed_prefix {
        validate_absolute_url("allowed-prefix", prefix)?;
        validate_start_in_scope(&settings.start_url, prefix)?;
    }

    if settings.link_pattern.is_empty() {
        return Err(ConfigError::Validation(
            "link-pattern cannot be empty".to_string(),
        ));
    }

    validate_selector(&settings.content_selector)?;

    if settings.request_timeout_secs == Some(0) {
        return Err(ConfigError::Validation(
            "request-timeout-secs must be > 0".to_string(),
        ));
    }

    if settings.max_runtime_secs == Some(0) {
        return Err(ConfigError::Validation(
            "max-runtime-secs must be > 0".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.path.is_empty() {
        return Err(ConfigError::Validation(
            "output path cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Validates the optional auth cookie
fn validate_auth(auth: &AuthCookie) -> Result<(), ConfigError> {
    if auth.cookie_name.is_empty() {
        return Err(ConfigError::Validation(
            "cookie-name cannot be empty".to_string(),
        ));
    }

    if auth.cookie_value.is_none() && auth.cookie_value_env.is_none() {
        return Err(ConfigError::Validation(format!(
            "auth cookie '{}' needs cookie-value or cookie-value-env",
            auth.cookie_name
        )));
    }

    Ok(())
}

/// Checks that a URL is absolute and uses HTTP(S)
fn validate_absolute_url(field: &str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", field, value, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "{} '{}' must use http or https",
            field, value
        )));
    }

    Ok(())
}

/// Checks that the start URL itself lies under the allowed prefix
fn validate_start_in_scope(start_url: &str, prefix: &str) -> Result<(), ConfigError> {
    let scope = Scope::new(prefix).map_err(|e| ConfigError::InvalidUrl(e.to_string()))?;
    let start = parse_absolute(start_url).map_err(|e| ConfigError::InvalidUrl(e.to_string()))?;

    if !scope.contains(&start) {
        return Err(ConfigError::Validation(format!(
            "start-url '{}' is outside allowed-prefix '{}'",
            start_url,
            scope.prefix()
        )));
    }

    Ok(())
}

/// Checks that the content selector is valid CSS
fn validate_selector(selector: &str) -> Result<(), ConfigError> {
    Selector::parse(selector)
        .map(|_| ())
        .map_err(|e| ConfigError::InvalidSelector {
            selector: selector.to_string(),
            message: format!("{:?}", e),
        })
}
