use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Pool-Indexer
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
    #[serde(default, rename = "root")]
    pub roots: Vec<RootEntry>,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Maximum number of simultaneously outstanding listing fetches
    #[serde(rename = "max-concurrent-requests")]
    pub max_concurrent_requests: u32,

    /// Maximum directory depth below a root that will be followed
    #[serde(rename = "max-depth", default = "default_max_depth")]
    pub max_depth: u32,

    /// Maximum number of directories dispatched over the whole run
    #[serde(rename = "max-nodes", default = "default_max_nodes")]
    pub max_nodes: u64,

    /// Path segment separating the mirror prefix from component/bucket/package/version
    #[serde(rename = "anchor-segment", default = "default_anchor_segment")]
    pub anchor_segment: String,

    /// Emit a progress line every this many listings (0 disables)
    #[serde(rename = "progress-interval", default = "default_progress_interval")]
    pub progress_interval: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_requests: 10,
            max_depth: default_max_depth(),
            max_nodes: default_max_nodes(),
            anchor_segment: default_anchor_segment(),
            progress_interval: default_progress_interval(),
        }
    }
}

/// Per-request timeout and retry configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    /// Total time allowed for one request attempt (milliseconds)
    #[serde(rename = "request-timeout-ms", default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Time allowed to establish a connection (milliseconds)
    #[serde(rename = "connect-timeout-ms", default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    /// Retries after the first attempt for transient failures
    #[serde(rename = "max-retries", default = "default_max_retries")]
    pub max_retries: u32,

    /// Delay before the first retry; doubles on every following retry (milliseconds)
    #[serde(rename = "backoff-base-ms", default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,

    /// Upper bound for a single backoff delay (milliseconds)
    #[serde(rename = "max-backoff-ms", default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
}

impl FetchConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn backoff_base(&self) -> Duration {
        Duration::from_millis(self.backoff_base_ms)
    }

    pub fn max_backoff(&self) -> Duration {
        Duration::from_millis(self.max_backoff_ms)
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: default_request_timeout_ms(),
            connect_timeout_ms: default_connect_timeout_ms(),
            max_retries: default_max_retries(),
            backoff_base_ms: default_backoff_base_ms(),
            max_backoff_ms: default_max_backoff_ms(),
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,
}

impl UserAgentConfig {
    /// Formats the User-Agent header: `CrawlerName/Version (+ContactURL)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{})",
            self.crawler_name, self.crawler_version, self.contact_url
        )
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the JSON record file
    #[serde(rename = "json-path")]
    pub json_path: String,

    /// Optional SQLite database receiving a copy of the records
    #[serde(rename = "database-path", default)]
    pub database_path: Option<String>,
}

/// One crawl root: a component directory that seeds the crawl and bounds it
#[derive(Debug, Clone, Deserialize)]
pub struct RootEntry {
    /// Component name (e.g. "main", "universe")
    pub component: String,

    /// Directory URL of the component, e.g. `https://host/changelogs/pool/main/`
    pub url: String,
}

fn default_max_depth() -> u32 {
    16
}

fn default_max_nodes() -> u64 {
    5_000_000
}

fn default_anchor_segment() -> String {
    "pool".to_string()
}

fn default_progress_interval() -> u64 {
    1000
}

fn default_request_timeout_ms() -> u64 {
    30_000
}

fn default_connect_timeout_ms() -> u64 {
    10_000
}

fn default_max_retries() -> u32 {
    3
}

fn default_backoff_base_ms() -> u64 {
    500
}

fn default_max_backoff_ms() -> u64 {
    30_000
}
