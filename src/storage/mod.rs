//! Storage module for package records
//!
//! This module holds:
//! - The in-memory `RecordStore` that owns records while a crawl runs
//! - SQLite export of finished runs and their records

mod record_store;
mod schema;
mod sqlite;

pub use record_store::{RecordStore, UpsertOutcome};
pub use sqlite::{NewRun, SqliteStorage};

/// How a crawl run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Every subtree reached completion
    Completed,
    /// The run was cancelled; records are a partial snapshot
    Cancelled,
}

impl RunStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "completed" => Some(Self::Completed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

/// Represents an exported run in the database
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: i64,
    pub started_at: String,
    pub finished_at: String,
    pub config_hash: String,
    pub status: RunStatus,
    pub fetch_attempts: u64,
    pub listings_fetched: u64,
    pub failed_nodes: u64,
    pub elapsed_ms: u64,
}
