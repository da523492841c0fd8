//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the HTTP client (user agent, timeout, redirect policy)
//! - GET requests carrying the rewritten headers
//! - Reading bodies up to the configured size limit
//! - Charset detection and decoding of HTML bodies
//! - Error classification
//!
//! There is no retry: every failure becomes a [`FetchResult::Failure`] and
//! the crawl moves on.

use crate::config::CrawlerConfig;
use crate::crawler::RequestContext;
use crate::state::PageState;
use crate::url::ConnectTarget;
use encoding_rs::{Encoding, UTF_8};
use reqwest::header::{CONTENT_TYPE, LOCATION};
use reqwest::{redirect::Policy, Client, Response};
use std::time::Duration;
use url::Url;

/// Maximum redirect hops followed for one request
const MAX_REDIRECTS: usize = 10;

/// Bytes scanned for a `<meta>` charset declaration
const META_SNIFF_LEN: usize = 1024;

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult {
    /// Successfully fetched the page (2xx)
    Success {
        /// Final URL after redirects
        final_url: Url,
        /// HTTP status code
        status_code: u16,
        /// Content-Type header value
        content_type: Option<String>,
        /// Decoded body, present only for HTML responses
        body: Option<String>,
    },

    /// Redirect away from the connect target, not followed
    ///
    /// The caller decides whether `location` is crawled, so that it is
    /// rewritten onto the connect target like any other URL.
    Redirect {
        status_code: u16,
        /// Absolute redirect target
        location: Url,
    },

    /// Anything else: non-2xx status, timeout, connection or read error
    Failure {
        /// The page state this failure maps to
        state: PageState,
        /// Error description
        error: String,
    },
}

/// Builds an HTTP client with proper configuration
///
/// The redirect policy follows at most ten hops, and only while they stay on
/// the connect target (same scheme, host and port). Any other redirect is
/// stopped and surfaces as [`FetchResult::Redirect`].
///
/// # Example
///
/// ```
/// use cache_warmer::config::CrawlerConfig;
/// use cache_warmer::crawler::build_http_client;
/// use cache_warmer::url::{ConnectTarget, CrawlTarget};
///
/// let crawl = CrawlTarget::parse("https://example.com/").unwrap();
/// let connect = ConnectTarget::from_crawl_target(&crawl);
///
/// let client = build_http_client(&CrawlerConfig::default(), connect).unwrap();
/// ```
pub fn build_http_client(
    config: &CrawlerConfig,
    connect: ConnectTarget,
) -> Result<Client, reqwest::Error> {
    let redirect = Policy::custom(move |attempt| {
        if attempt.previous().len() > MAX_REDIRECTS {
            attempt.error("too many redirects")
        } else if connect.matches(attempt.url()) {
            attempt.follow()
        } else {
            attempt.stop()
        }
    });

    Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(Duration::from_secs(config.request_timeout))
        .connect_timeout(Duration::from_secs(config.request_timeout.min(10)))
        .redirect(redirect)
        .danger_accept_invalid_certs(config.accept_invalid_certs)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches one rewritten request
///
/// # Outcome Mapping
///
/// | Condition | Result |
/// |-----------|--------|
/// | HTTP 2xx | Success (body decoded if HTML) |
/// | 3xx off the connect target | Redirect |
/// | Other HTTP status | Failure → HttpError |
/// | Timeout | Failure → TimedOut |
/// | Connection refused, DNS, TLS | Failure → Unreachable |
/// | Body read error, redirect error | Failure → Failed |
///
/// The body is read in full up to `max_body_size` bytes (0 for no limit),
/// even when it is not HTML, so that caches which only store complete
/// responses see one. A longer body is cut at the limit and only the part
/// read is decoded.
pub async fn fetch_url(
    client: &Client,
    request: &RequestContext,
    max_body_size: usize,
) -> FetchResult {
    let mut response = match client
        .get(request.url.clone())
        .headers(request.headers.clone())
        .send()
        .await
    {
        Ok(response) => response,
        Err(e) => return classify_error(&e),
    };

    let status = response.status();
    let final_url = response.url().clone();

    if status.is_redirection() {
        if let Some(location) = redirect_location(&response) {
            return FetchResult::Redirect {
                status_code: status.as_u16(),
                location,
            };
        }
    }

    if !status.is_success() {
        return FetchResult::Failure {
            state: PageState::HttpError,
            error: format!("HTTP {}", status),
        };
    }

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let (bytes, cut) = match read_body(&mut response, max_body_size).await {
        Ok(read) => read,
        Err(e) => return classify_error(&e),
    };
    if cut {
        tracing::debug!("Body of {} cut at {} bytes", final_url, max_body_size);
    }

    let body = content_type
        .as_deref()
        .filter(|ct| is_html(ct))
        .map(|ct| decode_body(&bytes, Some(ct)));

    FetchResult::Success {
        final_url,
        status_code: status.as_u16(),
        content_type,
        body,
    }
}

/// Resolves the `Location` header against the URL that answered
fn redirect_location(response: &Response) -> Option<Url> {
    let location = response.headers().get(LOCATION)?.to_str().ok()?;
    response.url().join(location).ok()
}

/// Reads the body chunk by chunk, stopping once `limit` bytes are in
///
/// The flag is true when the body was longer than `limit` and got cut.
async fn read_body(
    response: &mut Response,
    limit: usize,
) -> Result<(Vec<u8>, bool), reqwest::Error> {
    let mut body = Vec::new();

    while let Some(chunk) = response.chunk().await? {
        if limit > 0 && body.len() + chunk.len() > limit {
            let take = limit - body.len();
            body.extend_from_slice(&chunk[..take]);
            return Ok((body, true));
        }
        body.extend_from_slice(&chunk);
    }

    Ok((body, false))
}

fn classify_error(e: &reqwest::Error) -> FetchResult {
    if e.is_timeout() {
        FetchResult::Failure {
            state: PageState::TimedOut,
            error: "Request timeout".to_string(),
        }
    } else if e.is_connect() {
        FetchResult::Failure {
            state: PageState::Unreachable,
            error: format!("Connection failed: {}", e),
        }
    } else {
        FetchResult::Failure {
            state: PageState::Failed,
            error: e.to_string(),
        }
    }
}

/// Returns true if a Content-Type denotes an HTML document
pub fn is_html(content_type: &str) -> bool {
    let mime = content_type.split(';').next().unwrap_or_default().trim();
    mime.eq_ignore_ascii_case("text/html") || mime.eq_ignore_ascii_case("application/xhtml+xml")
}

/// Decodes a response body to text
///
/// The encoding is taken from, in order: the `charset` parameter of the
/// Content-Type header, a `<meta>` declaration in the first kilobyte, a byte
/// order mark, and finally UTF-8. Undecodable sequences become U+FFFD.
pub fn decode_body(bytes: &[u8], content_type: Option<&str>) -> String {
    let encoding = content_type
        .and_then(charset_from_content_type)
        .or_else(|| sniff_meta_charset(bytes))
        .unwrap_or(UTF_8);

    // `decode` lets a BOM override the chosen encoding.
    let (text, _, _) = encoding.decode(bytes);
    text.into_owned()
}

fn charset_from_content_type(content_type: &str) -> Option<&'static Encoding> {
    content_type
        .split(';')
        .skip(1)
        .filter_map(|param| param.split_once('='))
        .find(|(key, _)| key.trim().eq_ignore_ascii_case("charset"))
        .and_then(|(_, value)| Encoding::for_label(value.trim().trim_matches('"').as_bytes()))
}

/// Looks for `charset=` inside a `<meta` tag near the start of the document
fn sniff_meta_charset(bytes: &[u8]) -> Option<&'static Encoding> {
    let head = &bytes[..bytes.len().min(META_SNIFF_LEN)];
    let head = String::from_utf8_lossy(head).to_ascii_lowercase();

    let mut rest = head.as_str();
    while let Some(start) = rest.find("<meta") {
        let tag = &rest[start..];
        let tag = &tag[..tag.find('>').unwrap_or(tag.len())];

        if let Some(pos) = tag.find("charset=") {
            let label: String = tag[pos + "charset=".len()..]
                .trim_start_matches(|c| c == '"' || c == '\'')
                .chars()
                .take_while(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':' | '.'))
                .collect();
            if let Some(encoding) = Encoding::for_label(label.as_bytes()) {
                return Some(encoding);
            }
        }

        rest = &rest[start + "<meta".len()..];
    }

    None
}
