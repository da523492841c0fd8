use crate::url::{ConnectTarget, CrawlTarget};
use serde::Deserialize;

/// Main configuration structure for cache-warmer
///
/// This is the raw, user-facing shape: it is read from an optional TOML file,
/// overridden by command-line flags, then resolved into [`CrawlSettings`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Start URL (the public site)
    #[serde(default)]
    pub url: String,

    /// Address requests are sent to instead of the start URL's host
    #[serde(default)]
    pub address: Option<String>,

    /// Cookies in `key:value` form
    #[serde(default)]
    pub cookies: Vec<String>,

    /// Extra headers in `key:value` form
    #[serde(default)]
    pub headers: Vec<String>,

    /// Drop every discovered link that carries query parameters
    #[serde(default, rename = "filter-query-strings")]
    pub filter_query_strings: bool,

    #[serde(default)]
    pub crawler: CrawlerConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CrawlerConfig {
    /// Maximum link depth from the start URL (start URL is depth 0)
    #[serde(rename = "max-depth", default = "default_max_depth")]
    pub max_depth: u32,

    /// Maximum number of requests issued over the whole crawl
    #[serde(rename = "max-requests", default = "default_max_requests")]
    pub max_requests: u32,

    /// Base delay between requests to the same domain (milliseconds)
    #[serde(default = "default_delay")]
    pub delay: u64,

    /// Upper bound of the random extra delay (milliseconds); defaults to `delay`
    #[serde(rename = "random-delay", default)]
    pub random_delay: Option<u64>,

    /// Maximum concurrent requests per domain
    #[serde(default = "default_parallelism")]
    pub parallelism: u32,

    /// Per-request timeout (seconds)
    #[serde(rename = "request-timeout", default = "default_request_timeout")]
    pub request_timeout: u64,

    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// Skip TLS certificate verification (warming by IP address)
    #[serde(rename = "accept-invalid-certs", default)]
    pub accept_invalid_certs: bool,

    /// Bytes of a response body read at most; 0 reads bodies in full
    #[serde(rename = "max-body-size", default = "default_max_body_size")]
    pub max_body_size: usize,
}

impl CrawlerConfig {
    /// The random delay bound actually applied
    pub fn effective_random_delay(&self) -> u64 {
        self.random_delay.unwrap_or(self.delay)
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            max_requests: default_max_requests(),
            delay: default_delay(),
            random_delay: None,
            parallelism: default_parallelism(),
            request_timeout: default_request_timeout(),
            user_agent: default_user_agent(),
            accept_invalid_certs: false,
            max_body_size: default_max_body_size(),
        }
    }
}

fn default_max_depth() -> u32 {
    3
}

fn default_max_requests() -> u32 {
    100
}

fn default_delay() -> u64 {
    5000
}

fn default_parallelism() -> u32 {
    1
}

fn default_request_timeout() -> u64 {
    60
}

fn default_max_body_size() -> usize {
    10 * 1024 * 1024
}

fn default_user_agent() -> String {
    format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}

/// Fully resolved crawl configuration
///
/// Built once by [`crate::config::build_settings`] and never mutated; the
/// engine receives it by value at construction time.
#[derive(Debug, Clone)]
pub struct CrawlSettings {
    pub crawl_target: CrawlTarget,
    pub connect_target: ConnectTarget,
    /// Parsed `(name, value)` header pairs, in configuration order
    pub headers: Vec<(String, String)>,
    /// Parsed `(name, value)` cookie pairs, in configuration order
    pub cookies: Vec<(String, String)>,
    pub filter_query_strings: bool,
    pub crawler: CrawlerConfig,
}
