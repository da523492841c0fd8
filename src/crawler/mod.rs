//! Crawler module for cache warming
//!
//! This module contains the core crawling logic, including:
//! - Request rewriting onto the connect target
//! - HTTP fetching and body decoding
//! - HTML parsing and link extraction
//! - Frontier scheduling and politeness limits
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod parser;
mod rewriter;
mod scheduler;

pub use coordinator::{run_crawl, Coordinator, PageOutcome, PageReport};
pub use fetcher::{build_http_client, decode_body, fetch_url, is_html, FetchResult};
pub use parser::{parse_html, ParsedPage};
pub use rewriter::{RequestContext, RequestRewriter};
pub use scheduler::{Enqueue, QueuedUrl, Scheduler};
