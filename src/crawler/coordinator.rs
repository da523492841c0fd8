//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the crawl loop that coordinates:
//! - Seeding the frontier with the start URL
//! - Dispatching rewritten requests to workers under the politeness limits
//! - Turning fetched pages into discovered links
//! - Stopping on frontier exhaustion or on the request budget
//!
//! The coordinator owns all crawl state. Workers receive values (a request and
//! a domain gate) and return values (a [`PageReport`]); nothing is shared
//! through callbacks.

use crate::config::{build_settings, Config, CrawlSettings};
use crate::crawler::parser::{parse_html, ParsedPage};
use crate::crawler::scheduler::{Enqueue, QueuedUrl, Scheduler};
use crate::crawler::{build_http_client, fetch_url, FetchResult, RequestContext, RequestRewriter};
use crate::output::{CrawlStatistics, StopReason};
use crate::state::{DomainState, PageState};
use crate::url::{AllowedDomains, LinkMatcher, LinkVerdict};
use crate::Result;
use reqwest::Client;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinSet;
use url::Url;

/// What a worker reports back for one page
#[derive(Debug)]
pub struct PageReport {
    /// The frontier entry that was fetched
    pub queued: QueuedUrl,

    /// The outbound URL the request was sent to
    pub request_url: Url,

    pub outcome: PageOutcome,
}

/// How a page fetch ended, as seen by the engine
#[derive(Debug)]
pub enum PageOutcome {
    /// 2xx response; `page` is set for HTML bodies only
    Warmed {
        final_url: Url,
        status_code: u16,
        content_type: Option<String>,
        page: Option<ParsedPage>,
    },

    /// Redirect off the connect target, to be crawled as a URL of its own
    Redirected { status_code: u16, location: Url },

    Failed { state: PageState, error: String },
}

/// Main crawler coordinator structure
pub struct Coordinator {
    settings: CrawlSettings,
    scheduler: Scheduler,
    matcher: LinkMatcher,
    rewriter: RequestRewriter,
    client: Client,
    stats: CrawlStatistics,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// Builds the request rewriter (header and cookie validation), the link
    /// matcher and the HTTP client. Errors here are configuration-level and
    /// happen before any request is issued.
    pub fn new(settings: CrawlSettings) -> Result<Self> {
        let rewriter = RequestRewriter::new(&settings)?;

        let allowed = AllowedDomains::new(&settings.crawl_target, &settings.connect_target);
        let matcher = LinkMatcher::new(allowed, settings.filter_query_strings);
        let client = build_http_client(&settings.crawler, settings.connect_target.clone())?;

        let scheduler = Scheduler::new(settings.crawler.clone());

        Ok(Self {
            settings,
            scheduler,
            matcher,
            rewriter,
            client,
            stats: CrawlStatistics::default(),
        })
    }

    /// Runs the main crawl loop
    ///
    /// 1. Enqueues the start URL at depth 0
    /// 2. Keeps up to `parallelism` workers busy, each dispatch consuming one
    ///    unit of the request budget
    /// 3. Feeds links from successful HTML pages back into the frontier
    /// 4. Ends when the frontier is empty and no worker is in flight
    ///
    /// Individual fetch failures are logged and never end the crawl.
    pub async fn run(mut self) -> Result<CrawlStatistics> {
        let start_time = Instant::now();
        let seed = self.settings.crawl_target.url().clone();

        tracing::info!(
            "Starting crawl of {} via {}",
            seed,
            self.settings.connect_target.authority()
        );

        // The start URL is explicit user input: no query-string filter here.
        self.scheduler.enqueue(seed, 0);

        let parallelism = self.settings.crawler.parallelism.max(1) as usize;
        let max_body_size = self.settings.crawler.max_body_size;
        let mut workers = JoinSet::new();

        loop {
            while workers.len() < parallelism {
                let Some(queued) = self.scheduler.next_url() else {
                    break;
                };

                let request = match self.rewriter.rewrite(&queued.url) {
                    Ok(request) => request,
                    Err(e) => {
                        tracing::error!("Get error on {}: {}", queued.url, e);
                        self.stats.record_failure(PageState::Failed);
                        continue;
                    }
                };

                if !self.scheduler.try_issue_request() {
                    self.stop_on_budget();
                    break;
                }

                tracing::info!("Visiting {}", request.url);
                let gate = self.scheduler.domain_state(&request.domain());
                workers.spawn(warm_page(
                    self.client.clone(),
                    gate,
                    request,
                    queued,
                    max_body_size,
                ));
            }

            match workers.join_next().await {
                None => break,
                Some(Ok(report)) => self.handle_report(report),
                Some(Err(e)) => tracing::error!("Worker task failed: {}", e),
            }

            let done = self.stats.pages_warmed + self.stats.pages_failed();
            if done > 0 && done % 10 == 0 {
                tracing::info!(
                    "Progress: {} requests issued, {} in frontier, {} URLs seen",
                    self.scheduler.requests_issued(),
                    self.scheduler.frontier_size(),
                    self.scheduler.visited_count()
                );
            }
        }

        self.stats.requests_issued = self.scheduler.requests_issued();
        self.stats.elapsed = start_time.elapsed();

        tracing::info!(
            "Crawl completed ({}): {} requests, {} warmed, {} failed in {:?}",
            self.stats.stop_reason,
            self.stats.requests_issued,
            self.stats.pages_warmed,
            self.stats.pages_failed(),
            self.stats.elapsed
        );

        Ok(self.stats)
    }

    /// Ends dispatching: the budget is spent, the rest of the frontier goes
    ///
    /// The entry that was just popped counts as discarded too.
    fn stop_on_budget(&mut self) {
        let discarded = self.scheduler.discard_frontier() as u64 + 1;
        self.stats.frontier_discarded += discarded;

        if self.stats.stop_reason != StopReason::BudgetExhausted {
            self.stats.stop_reason = StopReason::BudgetExhausted;
            tracing::info!(
                "Request budget of {} reached, discarding {} queued URLs",
                self.settings.crawler.max_requests,
                discarded
            );
        } else {
            tracing::debug!("Discarding {} more queued URLs", discarded);
        }
    }

    /// Processes one worker report
    ///
    /// Failures are logged and counted. Successful HTML pages have every href
    /// evaluated and, when accepted, queued one level deeper. A redirect
    /// target is queued at the same depth as the page that redirected.
    fn handle_report(&mut self, report: PageReport) {
        let PageReport {
            queued,
            request_url,
            outcome,
        } = report;

        let (final_url, status_code, content_type, page) = match outcome {
            PageOutcome::Failed { state, error } => {
                tracing::error!("Get error on {}: {}", request_url, error);
                self.stats.record_failure(state);
                return;
            }
            PageOutcome::Redirected {
                status_code,
                location,
            } => {
                tracing::debug!("{} redirected ({}) to {}", request_url, status_code, location);
                self.follow_redirect(location, queued.depth);
                return;
            }
            PageOutcome::Warmed {
                final_url,
                status_code,
                content_type,
                page,
            } => (final_url, status_code, content_type, page),
        };

        self.stats.pages_warmed += 1;

        // Page identity lives in public space; a redirect target was fetched too.
        let final_public = self.rewriter.to_public(&final_url);
        if final_public != queued.url {
            self.scheduler.mark_visited(&final_public);
        }

        let Some(page) = page else {
            tracing::debug!(
                "Warmed {} ({}), not HTML: {}",
                request_url,
                status_code,
                content_type.as_deref().unwrap_or("no content type")
            );
            return;
        };

        tracing::debug!(
            "Warmed {} ({}) {:?}: {} links",
            request_url,
            status_code,
            page.title.as_deref().unwrap_or_default(),
            page.links.len()
        );

        let base = page
            .base_href
            .as_deref()
            .and_then(|href| final_public.join(href).ok())
            .unwrap_or(final_public);

        let depth = queued.depth + 1;
        for href in &page.links {
            self.discover(href, &base, depth);
        }
    }

    /// Runs one discovered href through the matcher and into the frontier
    fn discover(&mut self, href: &str, base: &Url, depth: u32) {
        self.stats.links_found += 1;

        let url = match self.matcher.evaluate(href, base) {
            LinkVerdict::Accept(url) => self.rewriter.to_public(&url),
            LinkVerdict::Reject(reason) => {
                tracing::trace!("Rejected link {:?} on {}: {}", href, base, reason);
                self.stats.record_rejection(reason);
                return;
            }
        };

        self.offer(url, depth);
    }

    /// Sends a redirect target through the matcher and into the frontier
    ///
    /// The target is rewritten onto the connect target when it is fetched,
    /// like any discovered link.
    fn follow_redirect(&mut self, location: Url, depth: u32) {
        self.stats.redirects += 1;

        match self.matcher.evaluate(location.as_str(), &location) {
            LinkVerdict::Accept(url) => {
                let url = self.rewriter.to_public(&url);
                self.offer(url, depth);
            }
            LinkVerdict::Reject(reason) => {
                tracing::debug!("Not following redirect to {}: {}", location, reason);
                self.stats.record_rejection(reason);
            }
        }
    }

    fn offer(&mut self, url: Url, depth: u32) {
        match self.scheduler.enqueue(url, depth) {
            Enqueue::Queued => self.stats.links_queued += 1,
            Enqueue::AlreadyVisited => self.stats.duplicate_links += 1,
            Enqueue::DepthExceeded => self.stats.depth_exceeded += 1,
        }
    }
}

/// Fetches one page under its domain's politeness gate
///
/// The slot is held through the fetch and the cool-down that follows it; the
/// cool-down runs in its own task so the report is returned as soon as the
/// fetch ends. HTML is parsed here, synchronously, so the parsed tree never
/// crosses an await.
async fn warm_page(
    client: Client,
    gate: Arc<DomainState>,
    request: RequestContext,
    queued: QueuedUrl,
    max_body_size: usize,
) -> PageReport {
    if gate.available_slots() == 0 {
        tracing::trace!("Waiting for a free slot on {}", request.domain());
    }
    let permit = gate.acquire().await;

    let outcome = match fetch_url(&client, &request, max_body_size).await {
        FetchResult::Success {
            final_url,
            status_code,
            content_type,
            body,
        } => PageOutcome::Warmed {
            final_url,
            status_code,
            content_type,
            page: body.as_deref().map(parse_html),
        },
        FetchResult::Redirect {
            status_code,
            location,
        } => PageOutcome::Redirected {
            status_code,
            location,
        },
        FetchResult::Failure { state, error } => PageOutcome::Failed { state, error },
    };

    if let Some(permit) = permit {
        tokio::spawn(permit.release());
    }

    PageReport {
        queued,
        request_url: request.url,
        outcome,
    }
}

/// Runs a complete crawl from a raw configuration
///
/// # Example
///
/// ```no_run
/// use cache_warmer::config::Config;
/// use cache_warmer::crawler::run_crawl;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = Config {
///     url: "https://example.com/".to_string(),
///     address: Some("http://localhost:8080".to_string()),
///     ..Config::default()
/// };
/// let stats = run_crawl(config).await?;
/// println!("{} pages warmed", stats.pages_warmed);
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: Config) -> Result<CrawlStatistics> {
    let settings = build_settings(&config)?;
    Coordinator::new(settings)?.run().await
}
