//! Output module for persisted articles and crawl reports
//!
//! This module handles:
//! - Writing each article as HTML, plain text and Markdown
//! - The per-language and per-site JSON indexes
//! - Crawl statistics and the end-of-run summary

mod index;
mod markdown;
pub mod stats;
mod writer;

pub use index::{ArticleRecord, CrawlIndex};
pub use markdown::html_to_markdown;
pub use stats::{print_summary, RunSummary, SiteOutcome, SiteStatistics};
pub use writer::{ArticleDocument, MultiFormatWriter};
