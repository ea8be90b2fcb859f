//! Output module for exporting crawl results
//!
//! This module handles:
//! - Writing the record set as a JSON array
//! - Exporting runs and records to SQLite
//! - Printing crawl statistics

mod json_output;
mod sqlite_output;
pub mod stats;
mod traits;

pub use json_output::JsonOutput;
pub use sqlite_output::SqliteOutput;
pub use stats::{print_statistics, CrawlStats};
pub use traits::{OutputError, OutputHandler, OutputResult};
