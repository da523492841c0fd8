//! URL handling module for cache-warmer
//!
//! This module provides the crawl and connect targets, the allowed domain set,
//! link matching with the optional query-string filter, and URL normalization
//! for the visited set.

mod domain;
mod matcher;
mod normalize;
mod target;

// Re-export main types and functions
pub use domain::AllowedDomains;
pub use matcher::{LinkMatcher, LinkVerdict, QueryStringFilter, RejectReason};
pub use normalize::{normalize_parsed, normalize_url, visit_key};
pub use target::{ConnectTarget, CrawlTarget};
