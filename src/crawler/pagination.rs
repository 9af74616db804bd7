//! Listing pagination
//!
//! Walks `?page=0`, `?page=1`, ... of one language's news listing until a
//! page yields no article links or fails to load. Links are accumulated in
//! page order without deduplication.

use crate::config::{LanguageConfig, SiteConfig};
use crate::crawler::fetcher::PageFetcher;
use crate::crawler::parser::{parse_listing_links, ArticleLink};
use crate::crawler::scheduler::{Clock, RateLimiter};
use crate::crawler::session::PageSession;
use crate::NavigationError;
use scraper::Selector;
use url::Url;

/// Why a pagination pass ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// A listing page contained no article links
    EmptyPage { page: u32 },

    /// A listing page could not be loaded
    NavigationFailed { page: u32, error: NavigationError },
}

/// Result of a pagination pass
#[derive(Debug, Clone)]
pub struct Discovery {
    /// Every link found, in page then document order
    pub links: Vec<ArticleLink>,

    /// Listing pages requested, including the one that ended the pass
    pub pages_requested: u32,

    pub stop: StopReason,
}

/// Steps of a pagination pass
#[derive(Debug)]
enum PaginationState {
    Fetching { page: u32 },
    Stabilizing { page: u32, url: Url },
    Extracting { page: u32, url: Url },
    Continue { page: u32 },
    Stop(StopReason),
}

/// Discovers the article links of one language of one site
pub struct PaginationDiscoverer<'a> {
    site: &'a SiteConfig,
    language: &'a LanguageConfig,
    link_selector: &'a Selector,
}

impl<'a> PaginationDiscoverer<'a> {
    pub fn new(site: &'a SiteConfig, language: &'a LanguageConfig, link_selector: &'a Selector) -> Self {
        Self {
            site,
            language,
            link_selector,
        }
    }

    /// Runs the pass from page 0
    ///
    /// Navigation errors end the pass early; links gathered from earlier
    /// pages are kept and nothing is retried.
    pub async fn discover<S, C>(
        &self,
        fetcher: &mut PageFetcher<S, C>,
        limiter: &RateLimiter<C>,
    ) -> Discovery
    where
        S: PageSession,
        C: Clock,
    {
        let mut links: Vec<ArticleLink> = Vec::new();
        let mut pages_requested = 0;
        let mut state = PaginationState::Fetching { page: 0 };

        loop {
            state = match state {
                PaginationState::Fetching { page } => {
                    let listing_url = self.site.listing_url(self.language, page);
                    tracing::info!(
                        site = %self.site.name,
                        language = %self.language.code,
                        page,
                        "Loading listing page {}",
                        listing_url
                    );
                    pages_requested += 1;

                    match self.navigate(fetcher, &listing_url).await {
                        Ok(url) => PaginationState::Stabilizing { page, url },
                        Err(error) => PaginationState::Stop(StopReason::NavigationFailed {
                            page,
                            error,
                        }),
                    }
                }

                PaginationState::Stabilizing { page, url } => {
                    match fetcher.stabilize_scroll().await {
                        Ok(_) => PaginationState::Extracting { page, url },
                        Err(error) => PaginationState::Stop(StopReason::NavigationFailed {
                            page,
                            error,
                        }),
                    }
                }

                PaginationState::Extracting { page, url } => match fetcher.content().await {
                    Err(error) => PaginationState::Stop(StopReason::NavigationFailed { page, error }),
                    Ok(html) => {
                        let base = fetcher
                            .current_url()
                            .and_then(|current| Url::parse(current).ok())
                            .unwrap_or(url);
                        let page_links = parse_listing_links(&html, &base, self.link_selector);

                        tracing::info!(
                            site = %self.site.name,
                            language = %self.language.code,
                            page,
                            "Found {} article links",
                            page_links.len()
                        );

                        if page_links.is_empty() {
                            PaginationState::Stop(StopReason::EmptyPage { page })
                        } else {
                            links.extend(page_links);
                            PaginationState::Continue { page }
                        }
                    }
                },

                PaginationState::Continue { page } => {
                    limiter.wait_page().await;
                    PaginationState::Fetching { page: page + 1 }
                }

                PaginationState::Stop(stop) => {
                    match &stop {
                        StopReason::EmptyPage { page } => tracing::info!(
                            site = %self.site.name,
                            language = %self.language.code,
                            "No more articles after page {}, pagination finished",
                            page
                        ),
                        StopReason::NavigationFailed { page, error } => tracing::error!(
                            site = %self.site.name,
                            language = %self.language.code,
                            page,
                            "Listing page failed, pagination stopped early: {}",
                            error
                        ),
                    }

                    return Discovery {
                        links,
                        pages_requested,
                        stop,
                    };
                }
            };
        }
    }

    async fn navigate<S, C>(
        &self,
        fetcher: &mut PageFetcher<S, C>,
        listing_url: &str,
    ) -> Result<Url, NavigationError>
    where
        S: PageSession,
        C: Clock,
    {
        let url = Url::parse(listing_url).map_err(|e| NavigationError::Transport {
            url: listing_url.to_string(),
            message: e.to_string(),
        })?;
        fetcher.navigate(listing_url).await?;
        Ok(url)
    }
}
