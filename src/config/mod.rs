//! Configuration module for cache-warmer
//!
//! This module handles loading the optional TOML configuration file, parsing
//! `key:value` header and cookie entries, validating limits, and resolving
//! everything into immutable [`CrawlSettings`].
//!
//! # Example
//!
//! ```
//! use cache_warmer::config::{build_settings, Config};
//!
//! let config = Config {
//!     url: "https://example.com/".to_string(),
//!     headers: vec!["X-Cool:blop".to_string()],
//!     ..Config::default()
//! };
//! let settings = build_settings(&config).unwrap();
//! assert_eq!(settings.connect_target.host(), "example.com");
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlSettings, CrawlerConfig};

// Re-export parser functions
pub use parser::{build_settings, load_config, parse_pairs, PairKind};
pub use validation::validate;
