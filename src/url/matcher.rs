use crate::url::AllowedDomains;
use regex::Regex;
use std::fmt;
use url::Url;

/// Pattern matching any `key=value` query parameter
const QUERY_STRING_PATTERN: &str = r"[?&]([^&=]+)=([^&=]+)";

/// Rejects URLs that carry query parameters
///
/// The policy is deliberately coarse: any `key=value` pair in the query string
/// rejects the URL, whatever the key. This keeps session IDs and tracking
/// parameters from multiplying the number of pages to warm.
#[derive(Debug, Clone)]
pub struct QueryStringFilter {
    pattern: Regex,
}

impl QueryStringFilter {
    pub fn new() -> Self {
        Self {
            pattern: Regex::new(QUERY_STRING_PATTERN).expect("query string pattern is valid"),
        }
    }

    /// Returns true if the URL must be dropped
    pub fn is_filtered(&self, url: &str) -> bool {
        self.pattern.is_match(url)
    }
}

impl Default for QueryStringFilter {
    fn default() -> Self {
        Self::new()
    }
}

/// Why a discovered link was not accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RejectReason {
    /// Empty or fragment-only href
    Empty,
    /// The href could not be resolved against the page URL
    Unresolvable,
    /// Resolved to something other than http(s)
    UnsupportedScheme,
    /// Host outside the allowed domain set
    ForeignDomain,
    /// Query string present while filtering is enabled
    QueryString,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Empty => "empty",
            Self::Unresolvable => "unresolvable",
            Self::UnsupportedScheme => "unsupported scheme",
            Self::ForeignDomain => "foreign domain",
            Self::QueryString => "query string",
        };
        f.write_str(label)
    }
}

/// Outcome of evaluating a discovered link
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkVerdict {
    Accept(Url),
    Reject(RejectReason),
}

/// Decides which discovered links belong to the crawl
///
/// Evaluation is a pure function of the href, the page's base URL and the
/// matcher configuration.
#[derive(Debug, Clone)]
pub struct LinkMatcher {
    allowed: AllowedDomains,
    query_filter: Option<QueryStringFilter>,
}

impl LinkMatcher {
    pub fn new(allowed: AllowedDomains, filter_query_strings: bool) -> Self {
        Self {
            allowed,
            query_filter: filter_query_strings.then(QueryStringFilter::new),
        }
    }

    /// Resolves `href` against `base` and accepts or rejects it
    ///
    /// # Examples
    ///
    /// ```
    /// use cache_warmer::url::{AllowedDomains, ConnectTarget, CrawlTarget, LinkMatcher, LinkVerdict};
    /// use url::Url;
    ///
    /// let crawl = CrawlTarget::parse("https://site.example/").unwrap();
    /// let connect = ConnectTarget::from_crawl_target(&crawl);
    /// let matcher = LinkMatcher::new(AllowedDomains::new(&crawl, &connect), true);
    /// let base = Url::parse("https://site.example/dir/").unwrap();
    ///
    /// assert!(matches!(matcher.evaluate("page", &base), LinkVerdict::Accept(_)));
    /// assert!(matches!(matcher.evaluate("/x?y=1", &base), LinkVerdict::Reject(_)));
    /// ```
    pub fn evaluate(&self, href: &str, base: &Url) -> LinkVerdict {
        let href = href.trim();
        if href.is_empty() || href.starts_with('#') {
            return LinkVerdict::Reject(RejectReason::Empty);
        }

        let resolved = match base.join(href) {
            Ok(url) => url,
            Err(_) => return LinkVerdict::Reject(RejectReason::Unresolvable),
        };

        if resolved.scheme() != "http" && resolved.scheme() != "https" {
            return LinkVerdict::Reject(RejectReason::UnsupportedScheme);
        }

        if !self.allowed.allows(&resolved) {
            return LinkVerdict::Reject(RejectReason::ForeignDomain);
        }

        if let Some(filter) = &self.query_filter {
            if filter.is_filtered(resolved.as_str()) {
                return LinkVerdict::Reject(RejectReason::QueryString);
            }
        }

        LinkVerdict::Accept(resolved)
    }
}
