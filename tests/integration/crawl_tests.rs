//! Integration tests for the crawler
//!
//! These tests use wiremock to serve a mock directory-listing mirror and
//! run the full crawl cycle end-to-end over HTTP.

use pool_indexer::config::{
    Config, CrawlerConfig, FetchConfig, OutputConfig, RootEntry, UserAgentConfig,
};
use pool_indexer::crawler::Coordinator;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

/// Creates a test configuration crawling the given component roots
pub fn create_test_config(base_url: &str, components: &[&str]) -> Config {
    Config {
        crawler: CrawlerConfig {
            max_concurrent_requests: 4,
            ..CrawlerConfig::default()
        },
        fetch: FetchConfig {
            request_timeout_ms: 2000,
            connect_timeout_ms: 1000,
            max_retries: 2,
            backoff_base_ms: 1,
            max_backoff_ms: 5,
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: "https://example.com/contact".to_string(),
        },
        output: OutputConfig {
            json_path: "packages.json".to_string(),
            database_path: None,
        },
        roots: components
            .iter()
            .map(|component| RootEntry {
                component: component.to_string(),
                url: format!("{}/pool/{}/", base_url, component),
            })
            .collect(),
    }
}

/// Renders an Apache-style autoindex page
pub fn listing(title: &str, hrefs: &[&str]) -> String {
    let mut rows = String::new();
    for href in hrefs {
        rows.push_str(&format!(
            "<tr><td><a href=\"{0}\">{0}</a></td><td>2024-01-01 00:00</td></tr>\n",
            href
        ));
    }
    format!(
        r#"<html><head><title>Index of {0}</title></head><body>
<h1>Index of {0}</h1>
<table>
<tr><th><a href="?C=N;O=D">Name</a></th><th><a href="?C=M;O=A">Last modified</a></th></tr>
<tr><td><a href="../">Parent Directory</a></td><td>&nbsp;</td></tr>
{1}</table></body></html>"#,
        title, rows
    )
}

/// Mounts a listing at `dir_path`, expecting exactly `expected` requests
pub async fn mount_dir(server: &MockServer, dir_path: &str, hrefs: &[&str], expected: u64) {
    Mock::given(method("GET"))
        .and(path(dir_path))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(listing(dir_path, hrefs))
                .insert_header("content-type", "text/html"),
        )
        .expect(expected)
        .mount(server)
        .await;
}

/// Mounts a redirect from `from` to `location`
pub async fn mount_redirect(server: &MockServer, from: &str, status: u16, location: &str) {
    Mock::given(method("GET"))
        .and(path(from))
        .respond_with(ResponseTemplate::new(status).insert_header("location", location))
        .expect(1)
        .mount(server)
        .await;
}

/// Number of GET requests the server received for `dir_path`
pub fn gets_for(requests: &[Request], dir_path: &str) -> usize {
    requests
        .iter()
        .filter(|request| request.method.as_str() == "GET" && request.url.path() == dir_path)
        .count()
}

/// Mounts the `pool/main/l/libx/libx_1.0/` package tree
pub async fn mount_libx(server: &MockServer) {
    mount_dir(server, "/pool/main/", &["l/"], 1).await;
    mount_dir(server, "/pool/main/l/", &["libx/"], 1).await;
    mount_dir(server, "/pool/main/l/libx/", &["libx_1.0/"], 1).await;
    mount_dir(
        server,
        "/pool/main/l/libx/libx_1.0/",
        &["copyright", "changelog", "libx_1.0.dsc"],
        1,
    )
    .await;
}

#[tokio::test]
async fn test_full_crawl_single_package() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    mount_libx(&mock_server).await;

    let config = create_test_config(&base_url, &["main"]);
    let coordinator = Coordinator::new(&config).expect("Failed to create coordinator");
    let report = coordinator.run().await;

    assert!(!report.cancelled);
    assert_eq!(report.records.len(), 1);

    let record = &report.records[0];
    assert_eq!(record.package, "libx");
    assert_eq!(record.version, "1.0");
    assert_eq!(
        record.copyright_url,
        Some(format!("{}/pool/main/l/libx/libx_1.0/copyright", base_url))
    );
    assert_eq!(
        record.changelog_url,
        Some(format!("{}/pool/main/l/libx/libx_1.0/changelog", base_url))
    );

    assert_eq!(report.stats.listings_fetched, 4);
    assert_eq!(report.stats.fetch_attempts, 4);
    assert_eq!(report.stats.failed_nodes, 0);
}

#[tokio::test]
async fn test_unavailable_subtree_is_isolated() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_dir(&mock_server, "/pool/main/", &["l/", "z/"], 1).await;
    mount_dir(&mock_server, "/pool/main/l/", &["libx/"], 1).await;
    mount_dir(&mock_server, "/pool/main/l/libx/", &["libx_1.0/"], 1).await;
    mount_dir(&mock_server, "/pool/main/l/libx/libx_1.0/", &["copyright"], 1).await;

    // One attempt plus max-retries
    Mock::given(method("GET"))
        .and(path("/pool/main/z/"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&base_url, &["main"]);
    let report = Coordinator::new(&config).unwrap().run().await;

    assert_eq!(report.records.len(), 1);
    assert_eq!(report.records[0].package, "libx");
    assert!(report.records[0].changelog_url.is_none());
    assert_eq!(report.stats.failed_nodes, 1);
    assert_eq!(report.stats.fetch_attempts, 7);
}

#[tokio::test]
async fn test_missing_directory_not_retried() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_dir(&mock_server, "/pool/main/", &["gone/"], 1).await;
    Mock::given(method("GET"))
        .and(path("/pool/main/gone/"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&base_url, &["main"]);
    let report = Coordinator::new(&config).unwrap().run().await;

    assert!(report.records.is_empty());
    assert_eq!(report.stats.failed_nodes, 1);
}

#[tokio::test]
async fn test_directory_with_two_parents_fetched_once() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_dir(&mock_server, "/pool/main/", &["a/", "b/"], 1).await;
    mount_dir(&mock_server, "/pool/main/a/", &["/pool/main/shared/"], 1).await;
    mount_dir(&mock_server, "/pool/main/b/", &["../shared/"], 1).await;
    mount_dir(&mock_server, "/pool/main/shared/", &[], 1).await;

    let config = create_test_config(&base_url, &["main"]);
    let report = Coordinator::new(&config).unwrap().run().await;

    assert_eq!(report.stats.listings_fetched, 4);
    assert_eq!(report.stats.duplicate_visits, 1);
}

#[tokio::test]
async fn test_links_outside_root_are_never_fetched() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_dir(
        &mock_server,
        "/pool/main/",
        &["/pool/restricted/", "/dists/", "https://elsewhere.invalid/pool/main/"],
        1,
    )
    .await;
    mount_dir(&mock_server, "/pool/restricted/", &[], 0).await;
    mount_dir(&mock_server, "/dists/", &[], 0).await;

    let config = create_test_config(&base_url, &["main"]);
    let report = Coordinator::new(&config).unwrap().run().await;

    assert_eq!(report.stats.out_of_bounds, 3);
    assert_eq!(report.stats.fetch_attempts, 1);
}

#[tokio::test]
async fn test_redirected_directory_is_listed_at_its_target() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_dir(&mock_server, "/pool/main/", &["lib/"], 1).await;
    mount_redirect(&mock_server, "/pool/main/lib/", 301, "/pool/main/l/").await;
    mount_dir(&mock_server, "/pool/main/l/", &["libx/"], 1).await;
    mount_dir(&mock_server, "/pool/main/l/libx/", &["libx_1.0/"], 1).await;
    mount_dir(&mock_server, "/pool/main/l/libx/libx_1.0/", &["changelog"], 1).await;

    let config = create_test_config(&base_url, &["main"]);
    let report = Coordinator::new(&config).unwrap().run().await;

    assert_eq!(report.records.len(), 1);
    assert_eq!(
        report.records[0].changelog_url,
        Some(format!("{}/pool/main/l/libx/libx_1.0/changelog", base_url))
    );
}

#[tokio::test]
async fn test_redirect_to_visited_directory_fetches_target_once() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_dir(&mock_server, "/pool/main/", &["a/", "old/"], 1).await;
    mount_redirect(&mock_server, "/pool/main/old/", 301, "/pool/main/a/").await;
    mount_dir(&mock_server, "/pool/main/a/", &[], 1).await;

    let config = create_test_config(&base_url, &["main"]);
    let report = Coordinator::new(&config).unwrap().run().await;

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(gets_for(&requests, "/pool/main/a/"), 1);
    assert_eq!(gets_for(&requests, "/pool/main/old/"), 1);
    assert_eq!(report.stats.duplicate_visits, 1);
    assert_eq!(report.stats.listings_fetched, 2);
}

#[tokio::test]
async fn test_redirect_outside_roots_is_never_followed() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_dir(&mock_server, "/pool/main/", &["x/"], 1).await;
    mount_redirect(&mock_server, "/pool/main/x/", 302, "/private/").await;
    mount_dir(&mock_server, "/private/", &["keys/"], 0).await;

    let config = create_test_config(&base_url, &["main"]);
    let report = Coordinator::new(&config).unwrap().run().await;

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(gets_for(&requests, "/private/"), 0);
    assert_eq!(report.stats.out_of_bounds, 1);
    assert_eq!(report.stats.fetch_attempts, 2);
}

#[tokio::test]
async fn test_two_components_and_multiple_versions() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_dir(&mock_server, "/pool/main/", &["a/"], 1).await;
    mount_dir(&mock_server, "/pool/main/a/", &["apt/"], 1).await;
    mount_dir(&mock_server, "/pool/main/a/apt/", &["apt_2.4.5/", "apt_2.7.14/"], 1).await;
    mount_dir(&mock_server, "/pool/main/a/apt/apt_2.4.5/", &["copyright", "changelog"], 1).await;
    mount_dir(&mock_server, "/pool/main/a/apt/apt_2.7.14/", &["Copyright"], 1).await;

    mount_dir(&mock_server, "/pool/universe/", &["libz/"], 1).await;
    mount_dir(&mock_server, "/pool/universe/libz/", &["libzstd/"], 1).await;
    mount_dir(&mock_server, "/pool/universe/libz/libzstd/", &["libzstd/"], 1).await;
    mount_dir(&mock_server, "/pool/universe/libz/libzstd/libzstd/", &["changelog"], 1).await;

    let config = create_test_config(&base_url, &["main", "universe"]);
    let report = Coordinator::new(&config).unwrap().run().await;

    let mut found: Vec<(String, String, bool)> = report
        .records
        .iter()
        .map(|r| (r.package.clone(), r.version.clone(), r.is_complete()))
        .collect();
    found.sort();

    assert_eq!(
        found,
        vec![
            ("apt".to_string(), "2.4.5".to_string(), true),
            ("apt".to_string(), "2.7.14".to_string(), false),
            ("libzstd".to_string(), String::new(), false),
        ]
    );
    assert_eq!(report.stats.complete_records, 1);
}
