//! HTTP fetcher implementation
//!
//! This module handles all listing requests for the crawler, including:
//! - Building HTTP clients with proper user agent strings
//! - A `Transport` seam performing a single request attempt
//! - Timeout, retry and exponential backoff around that attempt
//! - Error classification into transient and permanent failures
//! - Surfacing redirects to the caller instead of following them

use crate::config::{FetchConfig, UserAgentConfig};
use crate::state::CrawlCounters;
use async_trait::async_trait;
use reqwest::{redirect::Policy, Client};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};
use url::Url;

/// Errors produced by a single fetch attempt
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("HTTP status {0}")]
    Status(u16),

    #[error("Request timed out")]
    Timeout,

    #[error("Connection failed: {0}")]
    Connect(String),

    #[error("Failed to read response body: {0}")]
    Body(String),

    #[error("Request failed: {0}")]
    Request(String),

    #[error("Fetch cancelled")]
    Cancelled,
}

impl FetchError {
    /// Returns true if another attempt may succeed
    ///
    /// | Condition | Retried |
    /// |-----------|---------|
    /// | HTTP 5xx, HTTP 429 | yes |
    /// | Timeout | yes |
    /// | Connection failure | yes |
    /// | Body read failure | yes |
    /// | Other non-2xx status | no |
    /// | Request construction error | no |
    /// | Cancellation | no |
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Status(code) => *code >= 500 || *code == 429,
            Self::Timeout | Self::Connect(_) | Self::Body(_) => true,
            Self::Request(_) | Self::Cancelled => false,
        }
    }
}

/// Response of one transport attempt, before status classification
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    /// Location header, present on redirects
    pub location: Option<String>,
    pub content_type: Option<String>,
    pub body: String,
}

/// Performs exactly one GET attempt
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &Url) -> Result<RawResponse, FetchError>;
}

/// Production transport backed by a reqwest client
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &Url) -> Result<RawResponse, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(classify_reqwest_error)?;

        let status = response.status().as_u16();
        let header = |name| {
            response
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        let content_type = header(reqwest::header::CONTENT_TYPE);
        let location = header(reqwest::header::LOCATION);

        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout
            } else {
                FetchError::Body(e.to_string())
            }
        })?;

        Ok(RawResponse {
            status,
            location,
            content_type,
            body,
        })
    }
}

fn classify_reqwest_error(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout
    } else if e.is_connect() {
        FetchError::Connect(e.to_string())
    } else if e.is_builder() {
        FetchError::Request(e.to_string())
    } else {
        // Resets and protocol errors mid-request behave like connection loss
        FetchError::Connect(e.to_string())
    }
}

/// Builds an HTTP client with proper configuration
///
/// Redirects are not followed; the crawler decides whether a redirect
/// target may be visited.
///
/// # Arguments
///
/// * `user_agent` - The user agent configuration
/// * `fetch` - Timeouts applied to every request
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use pool_indexer::config::{FetchConfig, UserAgentConfig};
/// use pool_indexer::crawler::build_http_client;
///
/// let config = UserAgentConfig {
///     crawler_name: "PoolIndexer".to_string(),
///     crawler_version: "1.0".to_string(),
///     contact_url: "https://example.com/about".to_string(),
/// };
///
/// let client = build_http_client(&config, &FetchConfig::default()).unwrap();
/// ```
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    fetch: &FetchConfig,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent.header_value())
        .timeout(fetch.request_timeout())
        .connect_timeout(fetch.connect_timeout())
        .redirect(Policy::none())
        .gzip(true)
        .brotli(true)
        .build()
}

/// Retry bounds and backoff schedule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Delay before the first retry
    pub backoff_base: Duration,
    /// Cap on any single delay
    pub max_backoff: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &FetchConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            backoff_base: config.backoff_base(),
            max_backoff: config.max_backoff(),
        }
    }

    /// Delay before retry number `retry` (1-based): `base * 2^(retry - 1)`, capped
    pub fn backoff_delay(&self, retry: u32) -> Duration {
        let factor = 1u32
            .checked_shl(retry.saturating_sub(1))
            .unwrap_or(u32::MAX);
        self.backoff_base
            .saturating_mul(factor)
            .min(self.max_backoff)
    }
}

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult {
    /// Listing retrieved with a 2xx status
    Success {
        /// HTTP status code
        status_code: u16,
        /// Content-Type header value
        content_type: Option<String>,
        /// Listing body
        body: String,
    },

    /// The server answered with a 3xx pointing elsewhere
    Redirect {
        /// HTTP status code
        status_code: u16,
        /// Location resolved against the requested URL
        location: Url,
    },

    /// Every allowed attempt failed, or the failure was permanent
    Failure {
        /// Error of the last attempt
        error: FetchError,
        /// Attempts made, including the first
        attempts: u32,
    },
}

/// One logical retrieval of a listing: timeout, status check, retry with backoff
pub struct Fetcher {
    transport: Arc<dyn Transport>,
    policy: RetryPolicy,
    request_timeout: Duration,
    counters: Arc<CrawlCounters>,
}

impl Fetcher {
    pub fn new(
        transport: Arc<dyn Transport>,
        config: &FetchConfig,
        counters: Arc<CrawlCounters>,
    ) -> Self {
        Self {
            transport,
            policy: RetryPolicy::from_config(config),
            request_timeout: config.request_timeout(),
            counters,
        }
    }

    /// Fetches `url`, retrying transient failures
    ///
    /// A 3xx response with a usable `Location` resolves as `Redirect` without
    /// being followed. Every attempt increments the shared attempt counter exactly once.
    /// Cancelling `cancel` aborts an in-flight attempt or backoff wait and
    /// resolves as `Failure` with `FetchError::Cancelled`.
    pub async fn fetch(&self, url: &Url, cancel: &CancellationToken) -> FetchResult {
        let mut attempts = 0u32;

        loop {
            if cancel.is_cancelled() {
                return FetchResult::Failure {
                    error: FetchError::Cancelled,
                    attempts,
                };
            }

            attempts += 1;
            self.counters.record_fetch_attempt();
            trace!("GET {} (attempt {})", url, attempts);

            let outcome = tokio::select! {
                _ = cancel.cancelled() => Err(FetchError::Cancelled),
                result = tokio::time::timeout(self.request_timeout, self.transport.get(url)) => {
                    result.unwrap_or(Err(FetchError::Timeout))
                }
            };

            let error = match outcome {
                Ok(response) if (200..300).contains(&response.status) => {
                    return FetchResult::Success {
                        status_code: response.status,
                        content_type: response.content_type,
                        body: response.body,
                    };
                }
                Ok(response) if (300..400).contains(&response.status) => {
                    match response.location.as_deref().and_then(|l| url.join(l).ok()) {
                        Some(location) => {
                            return FetchResult::Redirect {
                                status_code: response.status,
                                location,
                            };
                        }
                        None => FetchError::Status(response.status),
                    }
                }
                Ok(response) => FetchError::Status(response.status),
                Err(e) => e,
            };

            let retry = attempts;
            if !error.is_transient() || retry > self.policy.max_retries {
                return FetchResult::Failure { error, attempts };
            }

            let delay = self.policy.backoff_delay(retry);
            debug!(
                "Transient failure fetching {}: {}; retry {}/{} in {:?}",
                url, error, retry, self.policy.max_retries, delay
            );

            tokio::select! {
                _ = cancel.cancelled() => {
                    return FetchResult::Failure {
                        error: FetchError::Cancelled,
                        attempts,
                    };
                }
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }
}
