//! Crawl of a single site
//!
//! For each language: discover links through pagination, then load, extract
//! and persist every article in order. Article-level failures are logged and
//! skipped; the language and site passes always run to the end.

use crate::config::{LanguageConfig, OutputConfig, SiteConfig};
use crate::crawler::fetcher::PageFetcher;
use crate::crawler::pagination::{PaginationDiscoverer, StopReason};
use crate::crawler::parser::{parse_article, ArticleLink, ExtractionSelectors};
use crate::crawler::scheduler::{Clock, RateLimiter};
use crate::crawler::session::PageSession;
use crate::output::{ArticleDocument, ArticleRecord, CrawlIndex, MultiFormatWriter, SiteStatistics};
use crate::slug::slug;
use crate::{CrawlError, Result};

/// Crawls the languages of one site through a single session
pub struct SiteCrawler<'a, S: PageSession, C: Clock> {
    fetcher: PageFetcher<S, C>,
    limiter: RateLimiter<C>,
    selectors: &'a ExtractionSelectors,
    output: &'a OutputConfig,
    writer: MultiFormatWriter,
}

impl<'a, S: PageSession, C: Clock> SiteCrawler<'a, S, C> {
    pub fn new(
        fetcher: PageFetcher<S, C>,
        limiter: RateLimiter<C>,
        selectors: &'a ExtractionSelectors,
        output: &'a OutputConfig,
        writer: MultiFormatWriter,
    ) -> Self {
        Self {
            fetcher,
            limiter,
            selectors,
            output,
            writer,
        }
    }

    /// Crawls every language of the site and writes the site index
    ///
    /// Only failures to write an index escape; everything below article
    /// level is recovered here.
    pub async fn crawl(
        &mut self,
        site: &SiteConfig,
        stats: &mut SiteStatistics,
    ) -> Result<CrawlIndex> {
        let mut index = CrawlIndex::new();

        for language in &site.languages {
            tracing::info!(
                site = %site.name,
                language = %language.code,
                "Crawling {} news",
                language.display_name
            );
            index = self.crawl_language(site, language, index, stats).await?;
            self.writer.write_language_index(&index, language).await?;
        }

        self.writer.write_site_index(&index).await?;
        Ok(index)
    }

    /// Runs one language pass, threading the site index through
    pub async fn crawl_language(
        &mut self,
        site: &SiteConfig,
        language: &LanguageConfig,
        mut index: CrawlIndex,
        stats: &mut SiteStatistics,
    ) -> Result<CrawlIndex> {
        let discovery = PaginationDiscoverer::new(site, language, &self.selectors.listing_link)
            .discover(&mut self.fetcher, &self.limiter)
            .await;

        stats.listing_pages += u64::from(discovery.pages_requested);
        stats.links_discovered += discovery.links.len() as u64;
        if matches!(discovery.stop, StopReason::NavigationFailed { .. }) {
            stats.languages_cut_short += 1;
        }

        for (i, link) in discovery.links.iter().enumerate() {
            let position = i + 1;
            if position > 1 {
                self.limiter.wait_article().await;
            }

            match self.crawl_article(language, link, position).await {
                Ok(Some((key, record))) => {
                    index.insert(key, record);
                    stats.articles_written += 1;
                }
                Ok(None) => stats.articles_skipped += 1,
                Err(e) => {
                    tracing::error!(
                        site = %site.name,
                        language = %language.code,
                        url = %link.url,
                        position,
                        "Article failed: {}",
                        e
                    );
                    stats.articles_failed += 1;
                }
            }
        }

        Ok(index)
    }

    /// Loads, extracts and persists one article
    ///
    /// Returns `None` when the page lacks a title or body paragraphs.
    async fn crawl_article(
        &mut self,
        language: &LanguageConfig,
        link: &ArticleLink,
        position: usize,
    ) -> Result<Option<(String, ArticleRecord)>> {
        tracing::info!(
            language = %language.code,
            position,
            "Loading article {}",
            link.url
        );
        let html = self.fetcher.load(&link.url).await?;

        let Some(article) = parse_article(&html, self.selectors) else {
            let skipped = CrawlError::Extraction {
                url: link.url.clone(),
            };
            tracing::warn!(language = %language.code, position, "Skipping article: {}", skipped);
            return Ok(None);
        };

        let document = ArticleDocument::from_extracted(article, &link.url, self.output);
        let article_slug = slug(&link.title, position);
        let record = self.writer.persist(&document, language, &article_slug).await?;
        let key = CrawlIndex::composite_key(&language.code, self.writer.date_stamp(), &article_slug);

        tracing::info!(language = %language.code, position, "Saved {}", key);
        Ok(Some((key, record)))
    }

    /// Gives the session back so the caller can close it
    pub fn into_session(self) -> S {
        self.fetcher.into_session()
    }
}
