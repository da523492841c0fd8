//! cache-warmer: a polite cache-warming crawler
//!
//! This crate walks a website's same-site link graph and requests every page it
//! finds so that a cache sitting in front of the origin is populated before real
//! traffic arrives. Requests can be sent to a different connect address while the
//! public host name is preserved in the `host` header.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for cache-warmer operations
#[derive(Debug, Error)]
pub enum WarmerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

/// Configuration-specific errors
///
/// Every variant is fatal: it is reported before any request is issued.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("problem with header '{0}': header malformed, expected key:value")]
    MalformedHeader(String),

    #[error("problem with cookie '{0}': cookie malformed, expected key:value")]
    MalformedCookie(String),

    #[error("Invalid header '{name}': {message}")]
    InvalidHeader { name: String, message: String },
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,

    #[error("Malformed URL: {0}")]
    Malformed(String),
}

/// Result type alias for cache-warmer operations
pub type Result<T> = std::result::Result<T, WarmerError>;

// Re-export commonly used types
pub use crate::config::{Config, CrawlSettings};
pub use crate::crawler::{run_crawl, Coordinator};
pub use crate::output::CrawlStatistics;
pub use crate::state::PageState;
pub use crate::url::{normalize_url, ConnectTarget, CrawlTarget};
