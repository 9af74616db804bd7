//! Muni-News-Crawler main entry point
//!
//! This is the command-line interface for the municipal news archiver.

use clap::Parser;
use muni_news_crawler::config::{
    default_config_with_hash, load_config_with_hash, validate, BrowserEngine, Config,
};
use muni_news_crawler::crawler::crawl;
use muni_news_crawler::output::print_summary;
use muni_news_crawler::ConfigError;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Muni-News-Crawler: a polite municipal news archiver
///
/// Walks the paginated news listings of each configured municipal site, one
/// language at a time, and stores every article as HTML, plain text and
/// Markdown with per-language and per-site JSON indexes.
#[derive(Parser, Debug)]
#[command(name = "muni-news-crawler")]
#[command(version = "1.0.0")]
#[command(about = "A polite municipal news archiver", long_about = None)]
struct Cli {
    /// Path to TOML configuration file; the built-in site table is used when omitted
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Output root directory, overrides [output] root
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Only crawl the named site (repeatable)
    #[arg(long = "site", value_name = "NAME")]
    sites: Vec<String>,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let loaded = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config_with_hash(path)
        }
        None => {
            tracing::info!("No configuration file given, using the built-in site table");
            default_config_with_hash()
        }
    };
    let config = match loaded.and_then(|(config, hash)| {
        tracing::info!("Configuration loaded successfully (hash: {})", hash);
        apply_overrides(config, &cli)
    }) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if cli.dry_run {
        handle_dry_run(&config);
    } else {
        handle_crawl(config).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("muni_news_crawler=info,warn"),
            1 => EnvFilter::new("muni_news_crawler=debug,info"),
            2 => EnvFilter::new("muni_news_crawler=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Applies `--output` and `--site` and validates the result again
fn apply_overrides(mut config: Config, cli: &Cli) -> Result<Config, ConfigError> {
    if let Some(output) = &cli.output {
        config.output.root = output.clone();
    }

    if !cli.sites.is_empty() {
        if let Some(unknown) = cli
            .sites
            .iter()
            .find(|name| !config.sites.iter().any(|site| &site.name == *name))
        {
            return Err(ConfigError::Validation(format!(
                "Unknown site '{}' given with --site",
                unknown
            )));
        }
        config.sites.retain(|site| cli.sites.contains(&site.name));
    }

    validate(&config)?;
    Ok(config)
}

/// Handles the --dry-run mode: shows the configuration and first listing pages
fn handle_dry_run(config: &Config) {
    println!("=== Muni-News-Crawler Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Page delay: {}ms", config.crawler.page_delay_ms);
    println!("  Article delay: {}ms", config.crawler.article_delay_ms);
    println!(
        "  Navigation timeout: {}ms",
        config.crawler.navigation_timeout_ms
    );
    println!(
        "  Scroll settle: {}ms (at most {} rounds)",
        config.crawler.scroll_settle_ms, config.crawler.max_scroll_iterations
    );

    println!("\nBrowser:");
    match config.browser.engine {
        BrowserEngine::Chrome => println!(
            "  Engine: chrome ({})",
            if config.browser.headless { "headless" } else { "windowed" }
        ),
        BrowserEngine::Http => println!("  Engine: http (no scrolling)"),
    }

    println!("\nOutput:");
    println!("  Root: {}", config.output.root.display());

    println!("\nSites ({}):", config.sites.len());
    for site in &config.sites {
        println!("  - {} ({})", site.name, site.origin());
        for language in &site.languages {
            println!(
                "    * {} [{}] {}",
                language.display_name,
                language.code,
                site.listing_url(language, 0)
            );
        }
    }

    println!("\n✓ Configuration is valid");
    println!(
        "✓ Would crawl {} language listings",
        config.sites.iter().map(|s| s.languages.len()).sum::<usize>()
    );
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(
        "Sites: {}, page delay: {}ms, article delay: {}ms",
        config.sites.len(),
        config.crawler.page_delay_ms,
        config.crawler.article_delay_ms
    );

    // Run the crawler
    match crawl(config).await {
        Ok(summary) => {
            print_summary(&summary);
            tracing::info!("Crawl completed successfully");
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
