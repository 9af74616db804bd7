//! Crawl statistics
//!
//! Counters accumulated while crawling a site and the end-of-run summary
//! printed by the binary.

use std::fmt;

/// Counters for one site
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SiteStatistics {
    /// Listing pages requested across all languages
    pub listing_pages: u64,

    /// Article links discovered across all languages
    pub links_discovered: u64,

    /// Articles persisted and indexed
    pub articles_written: u64,

    /// Articles skipped for missing title or body
    pub articles_skipped: u64,

    /// Articles that failed to load or persist
    pub articles_failed: u64,

    /// Languages whose pagination ended on a navigation error
    pub languages_cut_short: u64,
}

impl SiteStatistics {
    /// Articles attempted, whatever their outcome
    pub fn articles_attempted(&self) -> u64 {
        self.articles_written + self.articles_skipped + self.articles_failed
    }

    pub fn merge(&mut self, other: &SiteStatistics) {
        self.listing_pages += other.listing_pages;
        self.links_discovered += other.links_discovered;
        self.articles_written += other.articles_written;
        self.articles_skipped += other.articles_skipped;
        self.articles_failed += other.articles_failed;
        self.languages_cut_short += other.languages_cut_short;
    }
}

impl fmt::Display for SiteStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} listing pages, {} links, {} written, {} skipped, {} failed",
            self.listing_pages,
            self.links_discovered,
            self.articles_written,
            self.articles_skipped,
            self.articles_failed
        )?;
        if self.languages_cut_short > 0 {
            write!(f, ", {} languages cut short", self.languages_cut_short)?;
        }
        Ok(())
    }
}

/// Outcome of one site within a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SiteOutcome {
    Completed(SiteStatistics),

    /// The site raised an error; whatever was written before it is kept
    Failed { error: String },
}

/// Outcome of a whole run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Date stamp used for every artifact of the run
    pub date_stamp: String,

    /// Per-site outcomes in crawl order
    pub sites: Vec<(String, SiteOutcome)>,
}

impl RunSummary {
    pub fn new(date_stamp: &str) -> Self {
        Self {
            date_stamp: date_stamp.to_string(),
            sites: Vec::new(),
        }
    }

    pub fn record(&mut self, site: &str, outcome: SiteOutcome) {
        self.sites.push((site.to_string(), outcome));
    }

    pub fn sites_completed(&self) -> usize {
        self.sites
            .iter()
            .filter(|(_, outcome)| matches!(outcome, SiteOutcome::Completed(_)))
            .count()
    }

    pub fn sites_failed(&self) -> usize {
        self.sites.len() - self.sites_completed()
    }

    /// Counters summed over every completed site
    pub fn totals(&self) -> SiteStatistics {
        let mut totals = SiteStatistics::default();
        for (_, outcome) in &self.sites {
            if let SiteOutcome::Completed(stats) = outcome {
                totals.merge(stats);
            }
        }
        totals
    }
}

/// Prints the run summary to stdout
pub fn print_summary(summary: &RunSummary) {
    println!("=== Crawl Summary ({}) ===\n", summary.date_stamp);

    for (site, outcome) in &summary.sites {
        match outcome {
            SiteOutcome::Completed(stats) => println!("  {}: {}", site, stats),
            SiteOutcome::Failed { error } => println!("  {}: FAILED ({})", site, error),
        }
    }
    println!();

    println!(
        "Sites: {} completed, {} failed",
        summary.sites_completed(),
        summary.sites_failed()
    );
    println!("Total: {}", summary.totals());
}
