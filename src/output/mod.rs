//! Output module for crawl summaries
//!
//! The crawl produces no files; the only output besides the log stream is the
//! statistics summary printed when a command-line run finishes.

pub mod stats;

pub use stats::{print_statistics, CrawlStatistics, StopReason};
