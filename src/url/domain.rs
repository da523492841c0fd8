use crate::url::{ConnectTarget, CrawlTarget};
use url::Url;

/// Host names a crawl is allowed to traverse
///
/// Always exactly the crawl target's host and the connect target's host.
/// Matching is on host name only; ports are not compared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowedDomains {
    crawl_host: String,
    connect_host: String,
}

impl AllowedDomains {
    pub fn new(crawl: &CrawlTarget, connect: &ConnectTarget) -> Self {
        Self {
            crawl_host: crawl.host().to_lowercase(),
            connect_host: connect.host().to_lowercase(),
        }
    }

    /// Returns true if `host` is one of the two allowed host names
    pub fn contains(&self, host: &str) -> bool {
        host.eq_ignore_ascii_case(&self.crawl_host) || host.eq_ignore_ascii_case(&self.connect_host)
    }

    /// Returns true if the URL's host is allowed
    pub fn allows(&self, url: &Url) -> bool {
        url.host_str().map_or(false, |host| self.contains(host))
    }
}
