use std::collections::HashSet;

/// Crawl-wide bookkeeping: the visited set and the request budget
///
/// Lives for exactly one crawl. Both read-modify-write sequences
/// (check-and-mark-visited, check-and-count-request) are single `&mut self`
/// calls, so whoever owns the state performs them atomically.
#[derive(Debug, Clone)]
pub struct CrawlState {
    /// Normalized URLs already fetched or enqueued
    visited: HashSet<String>,

    /// Requests issued so far
    requests_issued: u32,

    /// Hard ceiling on requests issued
    max_requests: u32,
}

impl CrawlState {
    pub fn new(max_requests: u32) -> Self {
        Self {
            visited: HashSet::new(),
            requests_issued: 0,
            max_requests,
        }
    }

    /// Marks a URL key as visited
    ///
    /// Returns true if the key was not yet visited. A false return means the
    /// caller must not fetch or enqueue the URL.
    pub fn mark_visited(&mut self, key: &str) -> bool {
        if self.visited.contains(key) {
            return false;
        }
        self.visited.insert(key.to_string())
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    /// Reserves one request from the budget
    ///
    /// Returns false once `max_requests` have been issued; the counter never
    /// goes past the maximum.
    pub fn try_issue_request(&mut self) -> bool {
        if self.budget_exhausted() {
            return false;
        }
        self.requests_issued += 1;
        true
    }

    pub fn budget_exhausted(&self) -> bool {
        self.requests_issued >= self.max_requests
    }

    pub fn requests_issued(&self) -> u32 {
        self.requests_issued
    }
}
