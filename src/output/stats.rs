//! Crawl statistics
//!
//! Counters are advisory: they are collected with relaxed atomics while the
//! crawl runs and frozen into a `CrawlStats` when it finishes.

use std::time::Duration;

/// Crawl statistics summary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlStats {
    /// Every HTTP attempt, retries included
    pub fetch_attempts: u64,

    /// Directory listings fetched and parsed successfully
    pub listings_fetched: u64,

    /// Nodes abandoned after fetch or parse failure
    pub failed_nodes: u64,

    /// Well-known files upserted into the record store
    pub files_recorded: u64,

    /// Links rejected by the root boundaries
    pub out_of_bounds: u64,

    /// Directories skipped because another parent already dispatched them
    pub duplicate_visits: u64,

    /// Well-known files whose path did not yield a package key
    pub malformed_paths: u64,

    /// Branches stopped by the depth or node ceiling
    pub ceiling_hits: u64,

    pub records: u64,
    pub complete_records: u64,
    pub elapsed: Duration,
}

impl CrawlStats {
    /// Percentage of records carrying both file URLs
    pub fn completeness(&self) -> f64 {
        if self.records == 0 {
            return 0.0;
        }
        (self.complete_records as f64 / self.records as f64) * 100.0
    }
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &CrawlStats) {
    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!("  Fetch attempts: {}", stats.fetch_attempts);
    println!("  Listings fetched: {}", stats.listings_fetched);
    println!("  Failed nodes: {}", stats.failed_nodes);
    println!("  Elapsed: {:.1}s", stats.elapsed.as_secs_f64());
    println!();

    println!("Records:");
    println!("  Package records: {}", stats.records);
    println!(
        "  With copyright and changelog: {} ({:.1}%)",
        stats.complete_records,
        stats.completeness()
    );
    println!("  Files recorded: {}", stats.files_recorded);
    println!();

    let skipped = stats.out_of_bounds + stats.duplicate_visits + stats.malformed_paths;
    if skipped > 0 || stats.ceiling_hits > 0 {
        println!("Skipped:");
        println!("  Outside root boundaries: {}", stats.out_of_bounds);
        println!("  Already visited: {}", stats.duplicate_visits);
        println!("  Malformed paths: {}", stats.malformed_paths);
        println!("  Ceiling hits: {}", stats.ceiling_hits);
        println!();
    }
}
