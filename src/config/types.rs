use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure for the crawler
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub browser: BrowserConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub selectors: SelectorConfig,
    #[serde(default, rename = "site")]
    pub sites: Vec<SiteConfig>,
}

/// Crawler pacing and timeout configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct CrawlerConfig {
    /// Pause between two listing page fetches (milliseconds)
    pub page_delay_ms: u64,

    /// Pause between two article fetches (milliseconds)
    pub article_delay_ms: u64,

    /// Timeout for a single navigation (milliseconds)
    pub navigation_timeout_ms: u64,

    /// Pause after each scroll-to-bottom on a listing page (milliseconds)
    pub scroll_settle_ms: u64,

    /// Upper bound on scroll-to-bottom rounds per listing page
    pub max_scroll_iterations: u32,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            page_delay_ms: 3000,
            article_delay_ms: 2000,
            navigation_timeout_ms: 40000,
            scroll_settle_ms: 5000,
            max_scroll_iterations: 50,
        }
    }
}

impl CrawlerConfig {
    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }

    pub fn article_delay(&self) -> Duration {
        Duration::from_millis(self.article_delay_ms)
    }

    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_millis(self.navigation_timeout_ms)
    }

    pub fn scroll_settle(&self) -> Duration {
        Duration::from_millis(self.scroll_settle_ms)
    }
}

/// Which page session implementation drives navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserEngine {
    /// Headless Chromium; renders scripts and supports scroll stabilization
    Chrome,
    /// Plain HTTP GET; no script rendering and no scrolling
    Http,
}

/// Browser session configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct BrowserConfig {
    pub engine: BrowserEngine,

    /// Run Chromium without a window
    pub headless: bool,

    /// Explicit Chromium executable; autodetected when absent
    pub executable: Option<PathBuf>,

    /// User agent sent by the HTTP engine
    pub user_agent: String,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            engine: BrowserEngine::Chrome,
            headless: true,
            executable: None,
            user_agent: format!("muni-news-crawler/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct OutputConfig {
    /// Run root; each site is written under `{root}/{site name}`
    pub root: PathBuf,

    /// Stored when an article has no subtitle
    pub missing_subtitle: String,

    /// Stored when an article has no date
    pub missing_date: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("crawl"),
            missing_subtitle: "Sin subtítulo".to_string(),
            missing_date: "Sin fecha".to_string(),
        }
    }
}

/// CSS selectors used to read listing and article pages
///
/// Every list is an ordered fallback chain: the first selector yielding a
/// non-empty result wins.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct SelectorConfig {
    /// Anchors on a listing page that point at articles
    pub listing_link: String,
    pub title: Vec<String>,
    pub subtitle: Vec<String>,
    pub date: Vec<String>,
    pub paragraphs: Vec<String>,
    /// Container converted to Markdown
    pub main_content: Vec<String>,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            listing_link: "div.grupo-texto a".to_string(),
            title: vec!["div.grupo-titulares div.field-name-node-title h2".to_string()],
            subtitle: vec!["div.field-name-field-subtitulo div.field__item".to_string()],
            date: vec!["div.field__item time".to_string()],
            paragraphs: vec![
                "div.field__item p".to_string(),
                ".node__content p".to_string(),
            ],
            main_content: vec![
                ".node__content".to_string(),
                ".field-name-field-cuerpo".to_string(),
                "article".to_string(),
            ],
        }
    }
}

/// One municipal website
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SiteConfig {
    /// Short name, also the output directory name
    pub name: String,

    /// Bare domain, e.g. "alboraya.es"
    pub domain: String,

    /// Overrides the `https://www.{domain}` origin
    #[serde(default)]
    pub base_url: Option<String>,

    #[serde(default, rename = "language")]
    pub languages: Vec<LanguageConfig>,
}

impl SiteConfig {
    /// Origin the listing paths are appended to
    pub fn origin(&self) -> String {
        match &self.base_url {
            Some(base) => base.trim_end_matches('/').to_string(),
            None => format!("https://www.{}", self.domain),
        }
    }

    /// URL of the 0-based listing page for a language
    pub fn listing_url(&self, language: &LanguageConfig, page: u32) -> String {
        format!(
            "{}/{}?page={}",
            self.origin(),
            language.path.trim_start_matches('/'),
            page
        )
    }
}

/// One language edition of a site's news listing
#[derive(Debug, Clone, Deserialize)]
pub struct LanguageConfig {
    /// Language code as used in index keys, e.g. "VA"
    pub code: String,

    /// Listing path relative to the site origin, e.g. "va/noticias"
    pub path: String,

    /// Human readable name, e.g. "valenciano"
    #[serde(rename = "name")]
    pub display_name: String,
}

impl LanguageConfig {
    /// Directory name for this language under the site directory
    pub fn dir_name(&self) -> String {
        self.code.to_lowercase()
    }
}
