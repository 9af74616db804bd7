//! Muni-News-Crawler: a polite municipal news archiver
//!
//! This crate crawls the paginated news listings of a fixed set of municipal
//! websites, one language at a time, and stores every article as a raw HTML
//! snapshot, plain text and Markdown, together with per-language and
//! per-site JSON indexes.

pub mod config;
pub mod crawler;
pub mod output;
pub mod slug;

use thiserror::Error;

/// Main error type for crawl operations
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Navigation error: {0}")]
    Navigation(#[from] NavigationError),

    #[error("Article at {url} is missing a title or body paragraphs")]
    Extraction { url: String },

    #[error("Site {site} failed: {source}")]
    Site {
        site: String,
        #[source]
        source: Box<CrawlError>,
    },

    #[error("Browser error: {0}")]
    Browser(String),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CrawlError {
    /// Wraps an error raised while processing one site
    pub fn site(site: &str, source: CrawlError) -> Self {
        Self::Site {
            site: site.to_string(),
            source: Box::new(source),
        }
    }
}

/// Failure to load a URL into the page session
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NavigationError {
    #[error("Timed out after {timeout_ms}ms loading {url}")]
    Timeout { url: String, timeout_ms: u64 },

    #[error("Transport failure loading {url}: {message}")]
    Transport { url: String, message: String },

    #[error("HTTP {status} loading {url}")]
    Status { url: String, status: u16 },

    #[error("Script evaluation failed on {url}: {message}")]
    Script { url: String, message: String },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid CSS selector '{selector}': {message}")]
    InvalidSelector { selector: String, message: String },

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for crawl operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::{Config, LanguageConfig, SiteConfig};
pub use output::{ArticleRecord, CrawlIndex};
pub use slug::slug;
