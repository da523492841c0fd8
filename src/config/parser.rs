use crate::config::types::{Config, CrawlSettings};
use crate::config::validation::validate;
use crate::url::{ConnectTarget, CrawlTarget};
use crate::ConfigError;
use std::path::Path;

/// What a list of `key:value` entries describes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairKind {
    Header,
    Cookie,
}

/// Loads and parses a configuration file from the given path
///
/// The file is only parsed here; validation happens once command-line flags
/// have been applied, in [`build_settings`].
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use cache_warmer::config::load_config;
///
/// let config = load_config(Path::new("warmer.toml")).unwrap();
/// println!("Max depth: {}", config.crawler.max_depth);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    Ok(config)
}

/// Splits `key:value` entries on the first colon
///
/// Keys and values are trimmed. An entry without a colon, or with an empty
/// key, is a configuration error naming the entry.
///
/// # Example
///
/// ```
/// use cache_warmer::config::{parse_pairs, PairKind};
///
/// let pairs = parse_pairs(&["X-Cool:blop".to_string()], PairKind::Header).unwrap();
/// assert_eq!(pairs, vec![("X-Cool".to_string(), "blop".to_string())]);
///
/// assert!(parse_pairs(&["badcookie".to_string()], PairKind::Cookie).is_err());
/// ```
pub fn parse_pairs(entries: &[String], kind: PairKind) -> Result<Vec<(String, String)>, ConfigError> {
    entries
        .iter()
        .map(|entry| {
            let malformed = || match kind {
                PairKind::Header => ConfigError::MalformedHeader(entry.clone()),
                PairKind::Cookie => ConfigError::MalformedCookie(entry.clone()),
            };

            let (key, value) = entry.split_once(':').ok_or_else(malformed)?;
            let key = key.trim();
            if key.is_empty() {
                return Err(malformed());
            }

            Ok((key.to_string(), value.trim().to_string()))
        })
        .collect()
}

/// Resolves a raw configuration into immutable crawl settings
///
/// Validates the configuration, parses the start URL and connect address, and
/// parses headers and cookies. Any failure here aborts the crawl before a
/// single request is issued.
///
/// When no address is configured the connect target is built as a value copy
/// of the crawl target's scheme, host and port.
pub fn build_settings(config: &Config) -> Result<CrawlSettings, ConfigError> {
    validate(config)?;

    let crawl_target = CrawlTarget::parse(&config.url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid url '{}': {}", config.url, e)))?;

    let connect_target = match config.address.as_deref().map(str::trim) {
        Some(address) if !address.is_empty() => ConnectTarget::parse(address, &crawl_target)
            .map_err(|e| {
                ConfigError::InvalidUrl(format!("Invalid address '{}': {}", address, e))
            })?,
        _ => ConnectTarget::from_crawl_target(&crawl_target),
    };

    let headers = parse_pairs(&config.headers, PairKind::Header)?;
    let cookies = parse_pairs(&config.cookies, PairKind::Cookie)?;

    Ok(CrawlSettings {
        crawl_target,
        connect_target,
        headers,
        cookies,
        filter_query_strings: config.filter_query_strings,
        crawler: config.crawler.clone(),
    })
}
