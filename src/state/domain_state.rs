use crate::config::CrawlerConfig;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Politeness gate for one outbound domain
///
/// This structure enforces, for a single domain:
/// - At most `parallelism` requests in flight
/// - A cool-down of `delay` plus a random extra in `[0, random_delay]` after
///   each request, during which the request's slot stays taken
///
/// With the default parallelism of 1 this serializes requests and spaces them
/// by at least `delay`.
#[derive(Debug)]
pub struct DomainState {
    /// Slots for in-flight requests
    permits: Arc<Semaphore>,

    /// Base delay between requests
    delay: Duration,

    /// Upper bound of the random extra delay
    random_delay: Duration,
}

/// A held request slot
///
/// Dropping it frees the slot immediately; [`DomainPermit::release`] frees it
/// after the cool-down instead.
#[derive(Debug)]
pub struct DomainPermit {
    _permit: OwnedSemaphorePermit,
    cool_down: Duration,
}

impl DomainPermit {
    /// Waits out the cool-down, then frees the slot
    pub async fn release(self) {
        if !self.cool_down.is_zero() {
            tokio::time::sleep(self.cool_down).await;
        }
    }
}

impl DomainState {
    /// Creates a new DomainState from the crawler configuration
    pub fn new(config: &CrawlerConfig) -> Self {
        Self::with_limits(
            config.parallelism as usize,
            Duration::from_millis(config.delay),
            Duration::from_millis(config.effective_random_delay()),
        )
    }

    pub fn with_limits(parallelism: usize, delay: Duration, random_delay: Duration) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(parallelism.max(1))),
            delay,
            random_delay,
        }
    }

    /// Waits for a free request slot
    ///
    /// The cool-down for this request is drawn here. Returns None only if the
    /// semaphore has been closed.
    pub async fn acquire(&self) -> Option<DomainPermit> {
        let permit = self.permits.clone().acquire_owned().await.ok()?;

        Some(DomainPermit {
            _permit: permit,
            cool_down: self.next_cool_down(),
        })
    }

    /// Draws `delay + uniform[0, random_delay]`
    pub fn next_cool_down(&self) -> Duration {
        let max_extra = self.random_delay.as_millis() as u64;
        let extra = if max_extra == 0 {
            0
        } else {
            rand::thread_rng().gen_range(0..=max_extra)
        };
        self.delay + Duration::from_millis(extra)
    }

    /// Returns the number of request slots currently free
    pub fn available_slots(&self) -> usize {
        self.permits.available_permits()
    }
}
