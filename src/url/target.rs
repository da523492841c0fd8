use crate::url::normalize_url;
use crate::UrlError;
use url::Url;

/// The public site being warmed
///
/// Parsed once from user input and immutable for the rest of the crawl.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlTarget {
    url: Url,
}

impl CrawlTarget {
    /// Parses the start URL of a crawl
    ///
    /// Only `http` and `https` URLs with a host are accepted. The fragment is
    /// dropped, as it is for every other URL the crawl visits.
    ///
    /// # Examples
    ///
    /// ```
    /// use cache_warmer::url::CrawlTarget;
    ///
    /// let target = CrawlTarget::parse("https://Public.Example/start").unwrap();
    /// assert_eq!(target.host(), "public.example");
    /// assert_eq!(target.authority(), "public.example");
    /// assert_eq!(target.url().path(), "/start");
    /// ```
    pub fn parse(input: &str) -> Result<Self, UrlError> {
        let url = normalize_url(input.trim())?;
        if url.host_str().map_or(true, str::is_empty) {
            return Err(UrlError::MissingDomain);
        }
        Ok(Self { url })
    }

    /// The start URL as given by the user
    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn scheme(&self) -> &str {
        self.url.scheme()
    }

    /// Lowercase host name, without port
    pub fn host(&self) -> &str {
        // Presence checked in `parse`; `url` already lowercases domains.
        self.url.host_str().unwrap_or_default()
    }

    /// Explicit port, if the start URL carried a non-default one
    pub fn port(&self) -> Option<u16> {
        self.url.port()
    }

    /// `host[:port]`, the value sent in the synthetic `host` header
    pub fn authority(&self) -> String {
        authority(self.host(), self.port())
    }
}

/// The network endpoint requests are actually sent to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectTarget {
    scheme: String,
    host: String,
    port: Option<u16>,
}

impl ConnectTarget {
    /// Builds the default connect target as a value copy of the crawl target
    ///
    /// Used when no explicit address is configured; the two targets never share
    /// state.
    pub fn from_crawl_target(target: &CrawlTarget) -> Self {
        Self {
            scheme: target.scheme().to_string(),
            host: target.host().to_string(),
            port: target.port(),
        }
    }

    /// Parses a connect address
    ///
    /// Accepts a full URL (`http://localhost:8080`) or a bare `host[:port]`,
    /// in which case the crawl target's scheme is used. Any path on the address
    /// is ignored: only scheme, host and port are taken.
    ///
    /// # Examples
    ///
    /// ```
    /// use cache_warmer::url::{ConnectTarget, CrawlTarget};
    ///
    /// let crawl = CrawlTarget::parse("https://public.example/").unwrap();
    ///
    /// let connect = ConnectTarget::parse("http://localhost:8080", &crawl).unwrap();
    /// assert_eq!(connect.scheme(), "http");
    /// assert_eq!(connect.authority(), "localhost:8080");
    ///
    /// let bare = ConnectTarget::parse("10.0.0.5", &crawl).unwrap();
    /// assert_eq!(bare.scheme(), "https");
    /// assert_eq!(bare.host(), "10.0.0.5");
    /// ```
    pub fn parse(input: &str, crawl: &CrawlTarget) -> Result<Self, UrlError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(UrlError::Parse("empty connect address".to_string()));
        }

        let url = if input.contains("://") {
            Url::parse(input)
        } else {
            Url::parse(&format!("{}://{}", crawl.scheme(), input))
        }
        .map_err(|e| UrlError::Parse(e.to_string()))?;

        check_scheme(url.scheme())?;

        let host = url
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or(UrlError::MissingDomain)?
            .to_lowercase();

        Ok(Self {
            scheme: url.scheme().to_string(),
            host,
            port: url.port(),
        })
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> Option<u16> {
        self.port
    }

    /// `host[:port]` of the outbound endpoint
    pub fn authority(&self) -> String {
        authority(&self.host, self.port)
    }

    /// Returns true if the URL points at this endpoint (scheme, host and port)
    pub fn matches(&self, url: &Url) -> bool {
        url.scheme() == self.scheme
            && url
                .host_str()
                .map_or(false, |host| host.eq_ignore_ascii_case(&self.host))
            && url.port() == self.port
    }
}

fn check_scheme(scheme: &str) -> Result<(), UrlError> {
    if scheme != "http" && scheme != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            scheme
        )));
    }
    Ok(())
}

fn authority(host: &str, port: Option<u16>) -> String {
    match port {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    }
}
