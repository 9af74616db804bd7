//! Crawler coordinator - top-level run over every configured site
//!
//! Sites are crawled one after another. Each site gets its own session,
//! opened before the site starts and closed when it ends, whether the site
//! succeeded or not. A failing site is logged and the run moves on; only
//! errors raised before the site loop starts are fatal.

use crate::config::{BrowserEngine, Config, SiteConfig};
use crate::crawler::browser::ChromeLauncher;
use crate::crawler::fetcher::PageFetcher;
use crate::crawler::parser::ExtractionSelectors;
use crate::crawler::scheduler::{Clock, RateLimiter, TokioClock};
use crate::crawler::session::{HttpSessionFactory, PageSession, SessionFactory};
use crate::crawler::site::SiteCrawler;
use crate::output::{MultiFormatWriter, RunSummary, SiteOutcome, SiteStatistics};
use crate::{CrawlError, Result};

/// Date format of the per-run date stamp
const DATE_STAMP_FORMAT: &str = "%Y-%m-%d";

/// Main crawler coordinator structure
pub struct Coordinator<F: SessionFactory, C: Clock + Clone> {
    config: Config,
    selectors: ExtractionSelectors,
    factory: F,
    clock: C,
    date_stamp: String,
}

impl<F: SessionFactory, C: Clock + Clone> Coordinator<F, C> {
    /// Creates a coordinator stamped with today's UTC date
    ///
    /// # Arguments
    ///
    /// * `config` - The validated crawler configuration
    /// * `factory` - Opens one page session per site
    /// * `clock` - Clock for every delay of the run
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(CrawlError)` - A configured selector failed to compile
    pub fn new(config: Config, factory: F, clock: C) -> Result<Self> {
        let selectors = ExtractionSelectors::compile(&config.selectors)?;
        let date_stamp = chrono::Utc::now().format(DATE_STAMP_FORMAT).to_string();

        Ok(Self {
            config,
            selectors,
            factory,
            clock,
            date_stamp,
        })
    }

    /// Replaces the run date stamp
    pub fn with_date_stamp(mut self, date_stamp: &str) -> Self {
        self.date_stamp = date_stamp.to_string();
        self
    }

    pub fn date_stamp(&self) -> &str {
        &self.date_stamp
    }

    /// Crawls every configured site in order
    ///
    /// Per-site failures are recorded in the summary and never abort the run.
    pub async fn run(&self) -> RunSummary {
        tracing::info!(
            "Starting crawl of {} sites, date stamp {}",
            self.config.sites.len(),
            self.date_stamp
        );
        let start_time = std::time::Instant::now();
        let mut summary = RunSummary::new(&self.date_stamp);

        for site in &self.config.sites {
            tracing::info!(site = %site.name, "Crawling site {}", site.origin());

            match self.crawl_site(site).await {
                Ok(stats) => {
                    tracing::info!(site = %site.name, "Site finished: {}", stats);
                    summary.record(&site.name, SiteOutcome::Completed(stats));
                }
                Err(e) => {
                    let error = CrawlError::site(&site.name, e);
                    tracing::error!(site = %site.name, "{}", error);
                    summary.record(
                        &site.name,
                        SiteOutcome::Failed {
                            error: error.to_string(),
                        },
                    );
                }
            }
        }

        tracing::info!(
            "Crawl completed: {} sites ok, {} failed in {:?}",
            summary.sites_completed(),
            summary.sites_failed(),
            start_time.elapsed()
        );
        summary
    }

    /// Crawls one site through a fresh session and closes it afterwards
    pub async fn crawl_site(&self, site: &SiteConfig) -> Result<SiteStatistics> {
        let session = self.factory.open().await?;

        let fetcher = PageFetcher::from_config(session, self.clock.clone(), &self.config.crawler);
        let limiter = RateLimiter::from_config(self.clock.clone(), &self.config.crawler);
        let writer = MultiFormatWriter::new(&self.config.output.root, site, &self.date_stamp);
        let mut crawler = SiteCrawler::new(
            fetcher,
            limiter,
            &self.selectors,
            &self.config.output,
            writer,
        );

        let mut stats = SiteStatistics::default();
        let result = crawler.crawl(site, &mut stats).await;

        close_quietly(crawler.into_session(), &site.name).await;

        result.map(|index| {
            tracing::debug!(site = %site.name, "{} articles indexed", index.len());
            stats
        })
    }
}

/// Runs the main crawl operation
///
/// Creates the output root, picks the session engine from the configuration
/// and crawls every site. Errors returned from here are fatal for the
/// process; per-site failures are only reported in the summary.
///
/// # Example
///
/// ```no_run
/// use muni_news_crawler::config::default_config;
/// use muni_news_crawler::crawler::run_crawl;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let summary = run_crawl(default_config()?).await?;
/// println!("{} sites failed", summary.sites_failed());
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: Config) -> Result<RunSummary> {
    tokio::fs::create_dir_all(&config.output.root).await?;
    tracing::info!("Writing output under {}", config.output.root.display());

    match config.browser.engine {
        BrowserEngine::Chrome => {
            let factory = ChromeLauncher::new(config.browser.clone());
            Ok(Coordinator::new(config, factory, TokioClock)?.run().await)
        }
        BrowserEngine::Http => {
            let factory =
                HttpSessionFactory::new(&config.browser, config.crawler.navigation_timeout())?;
            Ok(Coordinator::new(config, factory, TokioClock)?.run().await)
        }
    }
}

/// Closes a session, logging instead of failing
async fn close_quietly<S: PageSession>(session: S, site: &str) {
    if let Err(e) = session.close().await {
        tracing::warn!(site = %site, "Failed to close session: {}", e);
    }
}
