//! Page fetcher
//!
//! This module wraps navigation through a [`PageSession`]:
//! - Building the HTTP client used by the plain HTTP engine
//! - Loading a URL with the configured navigation timeout
//! - Scroll stabilization of lazily loaded listing pages
//!
//! Nothing here retries. A failed navigation is reported to the caller,
//! which decides whether it ends a pagination pass or skips one article.

use crate::config::{BrowserConfig, CrawlerConfig};
use crate::crawler::scheduler::Clock;
use crate::crawler::session::PageSession;
use crate::NavigationError;
use reqwest::Client;
use std::time::Duration;

/// Builds the HTTP client used by the plain HTTP session
///
/// # Arguments
///
/// * `config` - Browser configuration carrying the user agent
/// * `timeout` - Per-request timeout
///
/// # Example
///
/// ```no_run
/// use muni_news_crawler::config::BrowserConfig;
/// use muni_news_crawler::crawler::build_http_client;
/// use std::time::Duration;
///
/// let client = build_http_client(&BrowserConfig::default(), Duration::from_secs(40)).unwrap();
/// ```
pub fn build_http_client(config: &BrowserConfig, timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Scroll stabilization parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollSettings {
    /// Pause after each scroll before re-measuring
    pub settle: Duration,

    /// Maximum number of scroll rounds per page
    pub max_iterations: u32,
}

impl ScrollSettings {
    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self {
            settle: config.scroll_settle(),
            max_iterations: config.max_scroll_iterations.max(1),
        }
    }
}

/// How a scroll stabilization pass ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollOutcome {
    /// Height stopped increasing after this many rounds
    Stable { rounds: u32 },

    /// Height was still growing when the round limit was hit
    LimitReached { rounds: u32 },

    /// The session has no viewport to scroll
    Unsupported,
}

/// Loads pages through a session, applying timeouts and scroll settling
pub struct PageFetcher<S: PageSession, C: Clock> {
    session: S,
    clock: C,
    timeout: Duration,
    scroll: ScrollSettings,
    navigations: u64,
}

impl<S: PageSession, C: Clock> PageFetcher<S, C> {
    pub fn new(session: S, clock: C, timeout: Duration, scroll: ScrollSettings) -> Self {
        Self {
            session,
            clock,
            timeout,
            scroll,
            navigations: 0,
        }
    }

    pub fn from_config(session: S, clock: C, config: &CrawlerConfig) -> Self {
        Self::new(
            session,
            clock,
            config.navigation_timeout(),
            ScrollSettings::from_config(config),
        )
    }

    /// Navigates to `url` within the navigation timeout
    pub async fn navigate(&mut self, url: &str) -> Result<(), NavigationError> {
        self.navigations += 1;
        tracing::debug!("Navigating to {}", url);
        self.session.goto(url, self.timeout).await
    }

    /// Markup of the currently loaded document
    pub async fn content(&mut self) -> Result<String, NavigationError> {
        self.session.content().await
    }

    /// Loads an article page and returns its markup
    pub async fn load(&mut self, url: &str) -> Result<String, NavigationError> {
        self.navigate(url).await?;
        self.content().await
    }

    /// Scrolls to the bottom repeatedly until the document stops growing
    ///
    /// Each round records the height, scrolls, waits the settle interval and
    /// measures again. The pass ends when the height no longer increases or
    /// after `max_iterations` rounds, whichever comes first.
    pub async fn stabilize_scroll(&mut self) -> Result<ScrollOutcome, NavigationError> {
        if !self.session.can_scroll() {
            return Ok(ScrollOutcome::Unsupported);
        }

        for round in 1..=self.scroll.max_iterations {
            let previous = self.session.scroll_height().await?;
            self.session.scroll_to_bottom().await?;
            self.clock.sleep(self.scroll.settle).await;
            let current = self.session.scroll_height().await?;

            tracing::trace!("Scroll round {}: height {} -> {}", round, previous, current);
            if current <= previous {
                return Ok(ScrollOutcome::Stable { rounds: round });
            }
        }

        tracing::warn!(
            "Page {} still growing after {} scroll rounds, extracting what is loaded",
            self.session.current_url().unwrap_or("<unknown>"),
            self.scroll.max_iterations
        );
        Ok(ScrollOutcome::LimitReached {
            rounds: self.scroll.max_iterations,
        })
    }

    /// URL of the loaded document
    pub fn current_url(&self) -> Option<&str> {
        self.session.current_url()
    }

    /// Number of navigations attempted so far
    pub fn navigations(&self) -> u64 {
        self.navigations
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    /// Gives the session back so the caller can close it
    pub fn into_session(self) -> S {
        self.session
    }
}
