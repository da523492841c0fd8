//! Scheduler for managing the crawl frontier and politeness limits
//!
//! This module handles:
//! - The FIFO frontier of `(url, depth)` pairs
//! - The visited set, so no URL is queued or fetched twice
//! - The crawl-wide request budget
//! - The maximum traversal depth
//! - Per-domain politeness gates (concurrency ceiling plus delay with jitter)

use crate::config::CrawlerConfig;
use crate::state::{CrawlState, DomainState};
use crate::url::visit_key;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use url::Url;

/// A URL queued for fetching
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedUrl {
    /// The public URL to fetch
    pub url: Url,

    /// Link distance from the start URL (start URL is 0)
    pub depth: u32,
}

/// What happened to a URL offered to the frontier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Enqueue {
    /// Added to the frontier and marked visited
    Queued,
    /// Already queued or fetched during this crawl
    AlreadyVisited,
    /// Deeper than the configured maximum depth
    DepthExceeded,
}

/// Scheduler owns the frontier, the visited set and the request budget
///
/// It is owned by the crawl engine alone; workers never see it. The
/// check-and-mark and check-and-count sequences are therefore atomic by
/// `&mut self` exclusivity.
pub struct Scheduler {
    /// Frontier queue of URLs to fetch, in discovery order
    frontier: VecDeque<QueuedUrl>,

    /// Visited set and request budget
    state: CrawlState,

    /// Per-domain politeness gates, keyed by outbound `host[:port]`
    domain_states: HashMap<String, Arc<DomainState>>,

    /// Crawler configuration
    config: CrawlerConfig,
}

impl Scheduler {
    /// Creates a new scheduler with an empty frontier
    pub fn new(config: CrawlerConfig) -> Self {
        Self {
            frontier: VecDeque::new(),
            state: CrawlState::new(config.max_requests),
            domain_states: HashMap::new(),
            config,
        }
    }

    /// Offers a URL to the frontier
    ///
    /// URLs deeper than `max_depth` are never queued. Otherwise the URL is
    /// marked visited and queued, unless it was already visited.
    pub fn enqueue(&mut self, url: Url, depth: u32) -> Enqueue {
        if depth > self.config.max_depth {
            return Enqueue::DepthExceeded;
        }

        if !self.state.mark_visited(&visit_key(&url)) {
            return Enqueue::AlreadyVisited;
        }

        self.frontier.push_back(QueuedUrl { url, depth });
        Enqueue::Queued
    }

    /// Records a URL as visited without queueing it
    ///
    /// Used for redirect targets, which were fetched under another URL.
    pub fn mark_visited(&mut self, url: &Url) -> bool {
        self.state.mark_visited(&visit_key(url))
    }

    /// Pops the next URL to fetch, in discovery order
    pub fn next_url(&mut self) -> Option<QueuedUrl> {
        self.frontier.pop_front()
    }

    /// Reserves one request from the crawl budget
    pub fn try_issue_request(&mut self) -> bool {
        self.state.try_issue_request()
    }

    /// Drops every queued URL, returning how many were dropped
    pub fn discard_frontier(&mut self) -> usize {
        let dropped = self.frontier.len();
        self.frontier.clear();
        dropped
    }

    /// Returns the politeness gate for an outbound domain
    pub fn domain_state(&mut self, domain: &str) -> Arc<DomainState> {
        let config = &self.config;
        self.domain_states
            .entry(domain.to_string())
            .or_insert_with(|| Arc::new(DomainState::new(config)))
            .clone()
    }

    /// Returns the number of URLs in the frontier
    pub fn frontier_size(&self) -> usize {
        self.frontier.len()
    }

    pub fn requests_issued(&self) -> u32 {
        self.state.requests_issued()
    }

    pub fn visited_count(&self) -> usize {
        self.state.visited_count()
    }
}
