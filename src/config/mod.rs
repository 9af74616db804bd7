//! Configuration module
//!
//! This module handles loading, parsing, and validating the TOML site table
//! and crawler settings.
//!
//! # Example
//!
//! ```no_run
//! use muni_news_crawler::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("sites.toml")).unwrap();
//! println!("Page delay: {}ms", config.crawler.page_delay_ms);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    BrowserConfig, BrowserEngine, Config, CrawlerConfig, LanguageConfig, OutputConfig,
    SelectorConfig, SiteConfig,
};

// Re-export parser functions
pub use parser::{
    compute_config_hash, default_config, default_config_with_hash, hash_content, load_config,
    load_config_with_hash, parse_config,
};
pub use validation::validate;
