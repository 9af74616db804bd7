//! Crawler module for listing discovery and article extraction
//!
//! This module contains the core crawling logic, including:
//! - Page sessions (headless Chromium or plain HTTP) and the page fetcher
//! - Listing pagination with scroll stabilization
//! - Article extraction through ordered selector fallbacks
//! - Fixed politeness delays through an injectable clock
//! - Per-site crawling and overall run coordination

mod browser;
mod coordinator;
mod fetcher;
mod pagination;
mod parser;
mod scheduler;
mod session;
mod site;

pub use browser::{ChromeLauncher, ChromeSession};
pub use coordinator::{run_crawl, Coordinator};
pub use fetcher::{build_http_client, PageFetcher, ScrollOutcome, ScrollSettings};
pub use pagination::{Discovery, PaginationDiscoverer, StopReason};
pub use parser::{
    parse_article, parse_listing_links, ArticleLink, ExtractedArticle, ExtractionSelectors,
};
pub use scheduler::{Clock, RateLimiter, TokioClock};
pub use session::{HttpSession, HttpSessionFactory, PageSession, SessionFactory};
pub use site::SiteCrawler;

use crate::config::Config;
use crate::output::RunSummary;
use crate::Result;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. For every configured
/// site it will:
/// 1. Open a page session
/// 2. Walk each language's listing pages until one is empty
/// 3. Extract and persist every discovered article
/// 4. Write the language and site indexes
/// 5. Close the session
///
/// # Arguments
///
/// * `config` - The validated crawler configuration
///
/// # Returns
///
/// * `Ok(RunSummary)` - Every site was attempted; see the summary for failures
/// * `Err(CrawlError)` - The run could not start
pub async fn crawl(config: Config) -> Result<RunSummary> {
    run_crawl(config).await
}
