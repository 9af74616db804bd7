use crate::config::types::{Config, CrawlerConfig, LanguageConfig, OutputConfig, SiteConfig};
use crate::crawler::ExtractionSelectors;
use crate::ConfigError;
use std::collections::HashSet;
use url::Url;

/// Longest pause accepted for any configured delay (10 minutes)
const MAX_DELAY_MS: u64 = 600_000;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_output_config(&config.output)?;
    ExtractionSelectors::compile(&config.selectors)?;
    validate_sites(&config.sites)?;
    Ok(())
}

/// Validates crawler pacing configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    for (name, value) in [
        ("page_delay_ms", config.page_delay_ms),
        ("article_delay_ms", config.article_delay_ms),
        ("scroll_settle_ms", config.scroll_settle_ms),
    ] {
        if value > MAX_DELAY_MS {
            return Err(ConfigError::Validation(format!(
                "{} must be <= {}ms, got {}ms",
                name, MAX_DELAY_MS, value
            )));
        }
    }

    if config.navigation_timeout_ms < 1000 || config.navigation_timeout_ms > MAX_DELAY_MS {
        return Err(ConfigError::Validation(format!(
            "navigation_timeout_ms must be between 1000 and {}, got {}",
            MAX_DELAY_MS, config.navigation_timeout_ms
        )));
    }

    if config.max_scroll_iterations < 1 {
        return Err(ConfigError::Validation(
            "max_scroll_iterations must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.root.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "output root cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Validates every site entry and their uniqueness
fn validate_sites(sites: &[SiteConfig]) -> Result<(), ConfigError> {
    if sites.is_empty() {
        return Err(ConfigError::Validation(
            "at least one [[site]] must be configured".to_string(),
        ));
    }

    let mut names = HashSet::new();
    for site in sites {
        validate_site(site)?;
        if !names.insert(site.name.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate site name '{}'",
                site.name
            )));
        }
    }

    Ok(())
}

fn validate_site(site: &SiteConfig) -> Result<(), ConfigError> {
    validate_directory_name(&site.name)?;
    validate_domain_string(&site.domain)?;

    if let Some(base_url) = &site.base_url {
        let url = Url::parse(base_url).map_err(|e| {
            ConfigError::InvalidUrl(format!("Invalid base-url '{}': {}", base_url, e))
        })?;
        if url.scheme() != "https" && url.scheme() != "http" {
            return Err(ConfigError::InvalidUrl(format!(
                "base-url '{}' must use http or https",
                base_url
            )));
        }
    }

    if site.languages.is_empty() {
        return Err(ConfigError::Validation(format!(
            "Site '{}' must have at least one language",
            site.name
        )));
    }

    let mut dirs = HashSet::new();
    for language in &site.languages {
        validate_language(&site.name, language)?;
        if !dirs.insert(language.dir_name()) {
            return Err(ConfigError::Validation(format!(
                "Site '{}' lists language '{}' more than once",
                site.name, language.code
            )));
        }
    }

    Ok(())
}

fn validate_language(site: &str, language: &LanguageConfig) -> Result<(), ConfigError> {
    if language.code.is_empty() || !language.code.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ConfigError::Validation(format!(
            "Site '{}': language code must be non-empty and alphanumeric, got '{}'",
            site, language.code
        )));
    }

    if language.path.trim_matches('/').is_empty() {
        return Err(ConfigError::Validation(format!(
            "Site '{}': language '{}' has an empty listing path",
            site, language.code
        )));
    }

    Ok(())
}

/// Site names become directory names
fn validate_directory_name(name: &str) -> Result<(), ConfigError> {
    if name.is_empty() {
        return Err(ConfigError::Validation(
            "site name cannot be empty".to_string(),
        ));
    }

    if name.starts_with('.')
        || !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
    {
        return Err(ConfigError::Validation(format!(
            "site name must contain only ASCII letters, digits, '-', '_' or '.', got '{}'",
            name
        )));
    }

    Ok(())
}

/// Validates a bare domain such as "alboraya.es"
fn validate_domain_string(domain: &str) -> Result<(), ConfigError> {
    if domain.is_empty() {
        return Err(ConfigError::Validation("Domain cannot be empty".to_string()));
    }

    if !domain
        .chars()
        .all(|c| c.is_alphanumeric() || c == '.' || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "Domain '{}' contains invalid characters",
            domain
        )));
    }

    if domain.starts_with('.')
        || domain.ends_with('.')
        || domain.starts_with('-')
        || domain.ends_with('-')
    {
        return Err(ConfigError::Validation(format!(
            "Domain '{}' cannot start or end with '.' or '-'",
            domain
        )));
    }

    if domain.contains("..") {
        return Err(ConfigError::Validation(format!(
            "Domain '{}' cannot contain consecutive dots",
            domain
        )));
    }

    if !domain.contains('.') {
        return Err(ConfigError::Validation(format!(
            "Domain '{}' must contain at least one dot (e.g., 'example.es')",
            domain
        )));
    }

    Ok(())
}
