//! Crawl statistics
//!
//! This module collects what happened during a crawl and renders it for the
//! command-line summary.

use crate::state::PageState;
use crate::url::RejectReason;
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// Why the crawl ended
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StopReason {
    /// No URL left to fetch
    #[default]
    FrontierExhausted,
    /// The request budget ran out; the remaining frontier was discarded
    BudgetExhausted,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FrontierExhausted => f.write_str("frontier exhausted"),
            Self::BudgetExhausted => f.write_str("request budget reached"),
        }
    }
}

/// Crawl statistics summary
#[derive(Debug, Clone, Default)]
pub struct CrawlStatistics {
    /// Requests dispatched (never more than the configured maximum)
    pub requests_issued: u32,

    /// Pages fetched with a 2xx status
    pub pages_warmed: u64,

    /// Failed fetches by state
    pub failures: BTreeMap<PageState, u64>,

    /// Redirects off the connect target, offered back to the frontier
    pub redirects: u64,

    /// Hrefs found on fetched pages
    pub links_found: u64,

    /// Links added to the frontier
    pub links_queued: u64,

    /// Links rejected by the matcher, by reason
    pub links_rejected: BTreeMap<RejectReason, u64>,

    /// Accepted links that had already been visited
    pub duplicate_links: u64,

    /// Accepted links beyond the maximum depth
    pub depth_exceeded: u64,

    /// Frontier entries dropped when the budget ran out
    pub frontier_discarded: u64,

    pub stop_reason: StopReason,

    pub elapsed: Duration,
}

impl CrawlStatistics {
    /// Records a failed fetch
    pub fn record_failure(&mut self, state: PageState) {
        *self.failures.entry(state).or_insert(0) += 1;
    }

    /// Records a rejected link
    pub fn record_rejection(&mut self, reason: RejectReason) {
        *self.links_rejected.entry(reason).or_insert(0) += 1;
    }

    /// Total number of failed fetches
    pub fn pages_failed(&self) -> u64 {
        self.failures.values().sum()
    }

    /// Total number of rejected links
    pub fn total_rejected(&self) -> u64 {
        self.links_rejected.values().sum()
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!("  Stopped: {}", stats.stop_reason);
    println!("  Elapsed: {:.1}s", stats.elapsed.as_secs_f64());
    println!("  Requests issued: {}", stats.requests_issued);
    println!("  Pages warmed: {}", stats.pages_warmed);
    println!("  Pages failed: {}", stats.pages_failed());
    println!("  Redirects off the connect target: {}", stats.redirects);
    println!();

    if !stats.failures.is_empty() {
        println!("Failures:");
        for (state, count) in &stats.failures {
            println!("  {}: {}", state, count);
        }
        println!();
    }

    println!("Links:");
    println!("  Found: {}", stats.links_found);
    println!("  Queued: {}", stats.links_queued);
    println!("  Already visited: {}", stats.duplicate_links);
    println!("  Beyond max depth: {}", stats.depth_exceeded);
    println!("  Rejected: {}", stats.total_rejected());
    for (reason, count) in &stats.links_rejected {
        println!("    {}: {}", reason, count);
    }

    if stats.frontier_discarded > 0 {
        println!();
        println!(
            "Discarded {} queued URLs when the request budget ran out",
            stats.frontier_discarded
        );
    }
}
