//! State management module
//!
//! This module tracks crawl-wide bookkeeping (visited set, request budget),
//! per-domain politeness state, and the outcome of each page request.

mod crawl_state;
mod domain_state;
mod page_state;

pub use crawl_state::CrawlState;
pub use domain_state::{DomainPermit, DomainState};
pub use page_state::PageState;
