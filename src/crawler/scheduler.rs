//! Pacing of the sequential crawl
//!
//! This module handles:
//! - The injectable [`Clock`] every pause goes through
//! - The fixed inter-request delays between listing pages and articles
//!
//! There is no jitter and no adaptive back-off: each delay is awaited in full
//! before the next request is issued, and only one request is ever in flight.

use crate::config::CrawlerConfig;
use std::time::Duration;

/// Source of suspension for all pauses in the crawl
///
/// Production uses [`TokioClock`]; tests substitute a clock that records the
/// requested durations and returns immediately.
#[allow(async_fn_in_trait)]
pub trait Clock {
    /// Suspends the calling flow for `duration`
    async fn sleep(&self, duration: Duration);
}

/// Clock backed by the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

impl Clock for TokioClock {
    async fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
    }
}

/// Politeness delays between consecutive requests to the same site
#[derive(Debug, Clone)]
pub struct RateLimiter<C: Clock> {
    clock: C,
    page_delay: Duration,
    article_delay: Duration,
}

impl<C: Clock> RateLimiter<C> {
    /// Creates a rate limiter with explicit delays
    pub fn new(clock: C, page_delay: Duration, article_delay: Duration) -> Self {
        Self {
            clock,
            page_delay,
            article_delay,
        }
    }

    /// Creates a rate limiter from the crawler configuration
    pub fn from_config(clock: C, config: &CrawlerConfig) -> Self {
        Self::new(clock, config.page_delay(), config.article_delay())
    }

    /// Waits for exactly `duration`
    pub async fn wait(&self, duration: Duration) {
        self.clock.sleep(duration).await;
    }

    /// Waits the delay between two listing page fetches
    pub async fn wait_page(&self) {
        tracing::debug!("Waiting {:?} before the next listing page", self.page_delay);
        self.wait(self.page_delay).await;
    }

    /// Waits the delay between two article fetches
    pub async fn wait_article(&self) {
        tracing::debug!("Waiting {:?} before the next article", self.article_delay);
        self.wait(self.article_delay).await;
    }

    pub fn page_delay(&self) -> Duration {
        self.page_delay
    }

    pub fn article_delay(&self) -> Duration {
        self.article_delay
    }
}
