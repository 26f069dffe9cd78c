use crate::UrlError;
use url::Url;

/// Normalizes a scraped or configured URL into an absolute URL
///
/// # Normalization Steps
///
/// 1. Reject empty input
/// 2. Resolve against `root` (absolute inputs pass through unchanged,
///    root-relative and path-relative inputs are joined)
/// 3. Reject anything that is not HTTP or HTTPS after resolution
///    (`mailto:`, `javascript:`, `tel:`, `data:`...)
/// 4. Remove the fragment
///
/// # Examples
///
/// ```
/// use review_harvest::url::normalize_url;
/// use url::Url;
///
/// let root = Url::parse("https://example.test/").unwrap();
/// let url = normalize_url("/reviews/1#comments", &root).unwrap();
/// assert_eq!(url.as_str(), "https://example.test/reviews/1");
/// ```
pub fn normalize_url(raw: &str, root: &Url) -> Result<Url, UrlError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(UrlError::Empty);
    }

    let mut url = root
        .join(raw)
        .map_err(|e| UrlError::Parse(format!("{}: {}", raw, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    url.set_fragment(None);

    Ok(url)
}

/// Parses an absolute HTTP(S) URL from configuration, dropping any fragment
pub fn parse_absolute(raw: &str) -> Result<Url, UrlError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(UrlError::Empty);
    }

    let mut url = Url::parse(raw).map_err(|e| UrlError::Parse(format!("{}: {}", raw, e)))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }
    url.set_fragment(None);

    Ok(url)
}
