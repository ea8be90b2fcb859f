//! Live crawl counters shared by every node task

use crate::output::CrawlStats;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Monotonic counters updated concurrently during a crawl
///
/// All counters are advisory; `Relaxed` ordering is sufficient because no
/// decision depends on reading them consistently with other state.
#[derive(Debug, Default)]
pub struct CrawlCounters {
    fetch_attempts: AtomicU64,
    listings_fetched: AtomicU64,
    failed_nodes: AtomicU64,
    files_recorded: AtomicU64,
    out_of_bounds: AtomicU64,
    duplicate_visits: AtomicU64,
    malformed_paths: AtomicU64,
    ceiling_hits: AtomicU64,
}

impl CrawlCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one network attempt (first try or retry)
    pub fn record_fetch_attempt(&self) {
        self.fetch_attempts.fetch_add(1, Ordering::Relaxed);
    }

    /// Counts one parsed listing; returns the new total
    pub fn record_listing(&self) -> u64 {
        self.listings_fetched.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn record_failed_node(&self) {
        self.failed_nodes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_file(&self) {
        self.files_recorded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_out_of_bounds(&self) {
        self.out_of_bounds.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_duplicate(&self) {
        self.duplicate_visits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_malformed_path(&self) {
        self.malformed_paths.fetch_add(1, Ordering::Relaxed);
    }

    /// Counts one node skipped by a depth or node ceiling; returns the new total
    pub fn record_ceiling_hit(&self) -> u64 {
        self.ceiling_hits.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn fetch_attempts(&self) -> u64 {
        self.fetch_attempts.load(Ordering::Relaxed)
    }

    pub fn listings_fetched(&self) -> u64 {
        self.listings_fetched.load(Ordering::Relaxed)
    }

    /// Captures the counters into a plain statistics value
    ///
    /// # Arguments
    ///
    /// * `elapsed` - Wall time of the crawl so far
    /// * `records` - Number of package records in the store
    /// * `complete_records` - Records carrying both file URLs
    pub fn snapshot(&self, elapsed: Duration, records: usize, complete_records: usize) -> CrawlStats {
        CrawlStats {
            fetch_attempts: self.fetch_attempts.load(Ordering::Relaxed),
            listings_fetched: self.listings_fetched.load(Ordering::Relaxed),
            failed_nodes: self.failed_nodes.load(Ordering::Relaxed),
            files_recorded: self.files_recorded.load(Ordering::Relaxed),
            out_of_bounds: self.out_of_bounds.load(Ordering::Relaxed),
            duplicate_visits: self.duplicate_visits.load(Ordering::Relaxed),
            malformed_paths: self.malformed_paths.load(Ordering::Relaxed),
            ceiling_hits: self.ceiling_hits.load(Ordering::Relaxed),
            records: records as u64,
            complete_records: complete_records as u64,
            elapsed,
        }
    }
}
