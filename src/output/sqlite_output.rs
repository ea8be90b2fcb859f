//! SQLite-based output handler implementation
//!
//! This module provides an output handler that exports a finished crawl
//! into the SQLite storage backend as one run plus its package rows.

use crate::crawler::CrawlReport;
use crate::output::traits::{OutputError, OutputHandler, OutputResult};
use crate::storage::{NewRun, RunStatus, SqliteStorage};
use tracing::info;

/// SQLite-based output handler
pub struct SqliteOutput {
    storage: SqliteStorage,
    config_hash: String,
    last_run_id: Option<i64>,
}

impl SqliteOutput {
    /// Creates a new SQLite output handler
    ///
    /// # Arguments
    ///
    /// * `storage` - The storage backend to use
    /// * `config_hash` - Hash of the configuration that produced the run
    pub fn new(storage: SqliteStorage, config_hash: impl Into<String>) -> Self {
        Self {
            storage,
            config_hash: config_hash.into(),
            last_run_id: None,
        }
    }

    /// Id of the run written by the last `write_report`
    pub fn last_run_id(&self) -> Option<i64> {
        self.last_run_id
    }

    pub fn storage(&self) -> &SqliteStorage {
        &self.storage
    }
}

impl OutputHandler for SqliteOutput {
    fn write_report(&mut self, report: &CrawlReport) -> OutputResult<()> {
        let status = if report.cancelled {
            RunStatus::Cancelled
        } else {
            RunStatus::Completed
        };

        let run_id = self.storage.create_run(&NewRun {
            started_at: report.started_at,
            finished_at: report.finished_at,
            config_hash: &self.config_hash,
            status,
            stats: &report.stats,
        })?;

        let written = self.storage.insert_packages(run_id, &report.records)?;
        if written != report.records.len() {
            return Err(OutputError::Storage(format!(
                "Expected {} package rows, wrote {}",
                report.records.len(),
                written
            )));
        }

        info!("Exported run {} with {} records to SQLite", run_id, written);
        self.last_run_id = Some(run_id);
        Ok(())
    }
}
