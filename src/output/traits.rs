//! Output handler traits and types
//!
//! This module defines the trait interface for writers that persist a
//! finished crawl report.

use crate::crawler::CrawlReport;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize records: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Storage error: {0}")]
    Storage(String),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Trait for output handlers
///
/// A handler receives the complete report once the crawl has finished,
/// including partial reports from cancelled runs.
pub trait OutputHandler {
    /// Persists the records (and whatever run metadata the format keeps)
    ///
    /// # Arguments
    ///
    /// * `report` - The finished crawl report
    fn write_report(&mut self, report: &CrawlReport) -> OutputResult<()>;
}
