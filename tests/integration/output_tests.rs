//! Integration tests for crawl output
//!
//! A crawl against a mock mirror is exported to JSON and SQLite in a
//! temporary directory and read back.

use crate::crawl_tests::{create_test_config, mount_libx};
use pool_indexer::crawler::Coordinator;
use pool_indexer::output::{JsonOutput, OutputHandler, SqliteOutput};
use pool_indexer::storage::{RunStatus, SqliteStorage};
use pool_indexer::PackageRecord;
use tempfile::TempDir;
use wiremock::MockServer;

#[tokio::test]
async fn test_crawl_exports_json_array() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    mount_libx(&mock_server).await;

    let config = create_test_config(&base_url, &["main"]);
    let report = Coordinator::new(&config).unwrap().run().await;

    let dir = TempDir::new().unwrap();
    let json_path = dir.path().join("out").join("packages.json");
    JsonOutput::new(&json_path).write_report(&report).unwrap();

    let content = std::fs::read_to_string(&json_path).unwrap();
    let value: serde_json::Value = serde_json::from_str(&content).unwrap();
    let array = value.as_array().expect("records are a JSON array");
    assert_eq!(array.len(), 1);

    let object = array[0].as_object().unwrap();
    let mut keys: Vec<&str> = object.keys().map(String::as_str).collect();
    keys.sort();
    assert_eq!(keys, vec!["changelog_url", "copyright_url", "package", "version"]);

    let records: Vec<PackageRecord> = serde_json::from_str(&content).unwrap();
    assert_eq!(records, report.records);
}

#[tokio::test]
async fn test_crawl_exports_to_sqlite() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    mount_libx(&mock_server).await;

    let config = create_test_config(&base_url, &["main"]);
    let report = Coordinator::new(&config).unwrap().run().await;

    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("packages.db");

    let storage = SqliteStorage::new(&db_path).unwrap();
    let mut output = SqliteOutput::new(storage, "test-hash");
    output.write_report(&report).unwrap();
    let run_id = output.last_run_id().unwrap();
    drop(output);

    let storage = SqliteStorage::new(&db_path).unwrap();
    let run = storage.get_latest_run().unwrap().unwrap();
    assert_eq!(run.id, run_id);
    assert_eq!(run.status, RunStatus::Completed);
    assert_eq!(run.config_hash, "test-hash");
    assert_eq!(run.fetch_attempts, report.stats.fetch_attempts);
    assert_eq!(storage.load_packages(run_id).unwrap(), report.records);
}
