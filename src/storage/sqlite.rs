//! SQLite export of crawl runs and their package records

use crate::output::CrawlStats;
use crate::package::PackageRecord;
use crate::storage::schema::initialize_schema;
use crate::storage::{RunRecord, RunStatus};
use crate::IndexerError;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// Run metadata written alongside an exported record set
#[derive(Debug, Clone)]
pub struct NewRun<'a> {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub config_hash: &'a str,
    pub status: RunStatus,
    pub stats: &'a CrawlStats,
}

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Opens (creating if needed) the database at `path`
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(IndexerError)` - Failed to open database
    pub fn new(path: &Path) -> Result<Self, IndexerError> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> Result<Self, IndexerError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Inserts a run row and returns its id
    pub fn create_run(&mut self, run: &NewRun<'_>) -> Result<i64, rusqlite::Error> {
        self.conn.execute(
            "INSERT INTO runs (started_at, finished_at, config_hash, status,
                               fetch_attempts, listings_fetched, failed_nodes, elapsed_ms)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                run.started_at.to_rfc3339(),
                run.finished_at.to_rfc3339(),
                run.config_hash,
                run.status.to_db_string(),
                run.stats.fetch_attempts as i64,
                run.stats.listings_fetched as i64,
                run.stats.failed_nodes as i64,
                run.stats.elapsed.as_millis() as i64,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Returns the most recently exported run
    pub fn get_latest_run(&self) -> Result<Option<RunRecord>, rusqlite::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT id, started_at, finished_at, config_hash, status,
                    fetch_attempts, listings_fetched, failed_nodes, elapsed_ms
             FROM runs ORDER BY id DESC LIMIT 1",
        )?;

        stmt.query_row([], |row| {
            Ok(RunRecord {
                id: row.get(0)?,
                started_at: row.get(1)?,
                finished_at: row.get(2)?,
                config_hash: row.get(3)?,
                status: RunStatus::from_db_string(&row.get::<_, String>(4)?)
                    .unwrap_or(RunStatus::Completed),
                fetch_attempts: row.get::<_, i64>(5)? as u64,
                listings_fetched: row.get::<_, i64>(6)? as u64,
                failed_nodes: row.get::<_, i64>(7)? as u64,
                elapsed_ms: row.get::<_, i64>(8)? as u64,
            })
        })
        .optional()
    }

    /// Writes `records` for `run_id` in a single transaction, preserving order
    pub fn insert_packages(
        &mut self,
        run_id: i64,
        records: &[PackageRecord],
    ) -> Result<usize, rusqlite::Error> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO packages (run_id, position, package, version, copyright_url, changelog_url)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            for (position, record) in records.iter().enumerate() {
                stmt.execute(params![
                    run_id,
                    position as i64,
                    record.package,
                    record.version,
                    record.copyright_url,
                    record.changelog_url,
                ])?;
            }
        }
        tx.commit()?;
        Ok(records.len())
    }

    /// Loads the records of `run_id` in discovery order
    pub fn load_packages(&self, run_id: i64) -> Result<Vec<PackageRecord>, rusqlite::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT package, version, copyright_url, changelog_url
             FROM packages WHERE run_id = ?1 ORDER BY position",
        )?;

        let rows = stmt.query_map(params![run_id], |row| {
            Ok(PackageRecord {
                package: row.get(0)?,
                version: row.get(1)?,
                copyright_url: row.get(2)?,
                changelog_url: row.get(3)?,
            })
        })?;

        let records = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    /// Counts the records of `run_id`
    pub fn count_packages(&self, run_id: i64) -> Result<u64, rusqlite::Error> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM packages WHERE run_id = ?1",
            params![run_id],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }
}
