//! Request rewriting
//!
//! Discovered links point at the public host. Every outbound request is
//! re-addressed to the connect target while the public host travels in the
//! `host` header, so the backend routes and keys its cache as if it had been
//! reached through its public name.

use crate::config::CrawlSettings;
use crate::url::{AllowedDomains, ConnectTarget, CrawlTarget};
use crate::{ConfigError, UrlError};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, COOKIE, HOST};
use url::Url;

/// One outbound request, ready for the fetcher
///
/// Built fresh per request from crawl-wide settings and never mutated.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// URL on the connect target
    pub url: Url,

    /// Headers sent with the request, including `host` and `cookie`
    pub headers: HeaderMap,
}

impl RequestContext {
    /// `host[:port]` the request is sent to, used as the politeness key
    pub fn domain(&self) -> String {
        let host = self.url.host_str().unwrap_or_default();
        match self.url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        }
    }
}

/// Maps public URLs to outbound requests and back
#[derive(Debug, Clone)]
pub struct RequestRewriter {
    crawl: CrawlTarget,
    connect: ConnectTarget,
    allowed: AllowedDomains,
    headers: HeaderMap,
}

impl RequestRewriter {
    /// Builds the rewriter and the crawl-wide header map
    ///
    /// Header order of precedence: the synthetic `host` header first, then
    /// user headers (which may override it), then one `cookie` header joining
    /// every configured cookie. Invalid header names or values are
    /// configuration errors.
    pub fn new(settings: &CrawlSettings) -> Result<Self, ConfigError> {
        let mut headers = HeaderMap::new();

        let host = settings.crawl_target.authority();
        headers.insert(HOST, header_value("host", &host)?);

        for (name, value) in &settings.headers {
            let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                ConfigError::InvalidHeader {
                    name: name.clone(),
                    message: e.to_string(),
                }
            })?;
            headers.insert(header_name, header_value(name, value)?);
        }

        if !settings.cookies.is_empty() {
            let cookie = settings
                .cookies
                .iter()
                .map(|(name, value)| format!("{}={}", name, value))
                .collect::<Vec<_>>()
                .join("; ");
            headers.insert(COOKIE, header_value("cookie", &cookie)?);
        }

        Ok(Self {
            crawl: settings.crawl_target.clone(),
            connect: settings.connect_target.clone(),
            allowed: AllowedDomains::new(&settings.crawl_target, &settings.connect_target),
            headers,
        })
    }

    /// Produces the outbound request for a public URL
    ///
    /// Scheme, host and port are unconditionally replaced by the connect
    /// target's; path and query are preserved; the fragment is dropped.
    ///
    /// # Example
    ///
    /// ```
    /// use cache_warmer::config::{build_settings, Config};
    /// use cache_warmer::crawler::RequestRewriter;
    /// use url::Url;
    ///
    /// let config = Config {
    ///     url: "https://public.example/".to_string(),
    ///     address: Some("http://localhost:8080".to_string()),
    ///     ..Config::default()
    /// };
    /// let rewriter = RequestRewriter::new(&build_settings(&config).unwrap()).unwrap();
    ///
    /// let request = rewriter.rewrite(&Url::parse("https://public.example/page").unwrap()).unwrap();
    /// assert_eq!(request.url.as_str(), "http://localhost:8080/page");
    /// assert_eq!(request.headers["host"], "public.example");
    /// ```
    pub fn rewrite(&self, url: &Url) -> Result<RequestContext, UrlError> {
        let mut outbound = url.clone();
        outbound.set_fragment(None);

        outbound
            .set_scheme(self.connect.scheme())
            .map_err(|_| UrlError::InvalidScheme(self.connect.scheme().to_string()))?;
        outbound
            .set_host(Some(self.connect.host()))
            .map_err(|e| UrlError::Malformed(format!("Failed to set host: {}", e)))?;
        outbound
            .set_port(self.connect.port())
            .map_err(|_| UrlError::Malformed("Failed to set port".to_string()))?;

        Ok(RequestContext {
            url: outbound,
            headers: self.headers.clone(),
        })
    }

    /// Re-expresses a URL on either allowed host against the crawl target
    ///
    /// [`rewrite`](Self::rewrite) replaces scheme, host and port unconditionally,
    /// so two allowed URLs with the same path and query are the same outbound
    /// request. Folding them onto the crawl target's scheme, host and port here
    /// gives them one visited key. URLs on other hosts are returned unchanged.
    pub fn to_public(&self, url: &Url) -> Url {
        if !self.allowed.allows(url) {
            return url.clone();
        }

        let mut public = url.clone();
        if public.set_scheme(self.crawl.scheme()).is_err()
            || public.set_host(Some(self.crawl.host())).is_err()
            || public.set_port(self.crawl.port()).is_err()
        {
            return url.clone();
        }
        public
    }
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue, ConfigError> {
    HeaderValue::from_str(value).map_err(|e| ConfigError::InvalidHeader {
        name: name.to_string(),
        message: e.to_string(),
    })
}
