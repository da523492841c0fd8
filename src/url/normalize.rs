use crate::UrlError;
use url::Url;

/// Normalizes a URL for visited-set bookkeeping
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed
/// 2. Reject anything but HTTP and HTTPS
/// 3. Lowercase the host (done by the parser for special schemes)
/// 4. Empty path becomes `/`
/// 5. Remove fragment (everything after #)
///
/// Path and query string are kept verbatim: a cache keys on them, so two URLs
/// that differ there are two different pages to warm.
///
/// # Examples
///
/// ```
/// use cache_warmer::url::normalize_url;
///
/// let url = normalize_url("https://EXAMPLE.COM/Page?b=2&a=1#top").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/Page?b=2&a=1");
/// ```
pub fn normalize_url(url_str: &str) -> Result<Url, UrlError> {
    let url = Url::parse(url_str).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingDomain);
    }

    Ok(normalize_parsed(url))
}

/// Normalization for an already parsed URL
pub fn normalize_parsed(mut url: Url) -> Url {
    url.set_fragment(None);
    if url.path().is_empty() {
        url.set_path("/");
    }
    url
}

/// The key a URL is recorded under in the visited set
pub fn visit_key(url: &Url) -> String {
    normalize_parsed(url.clone()).into()
}
