//! Crawler module for directory listing traversal
//!
//! This module contains the core crawling logic, including:
//! - Listing fetches with timeout, retry and backoff
//! - Directory listing parsing
//! - Recursive, concurrency-bounded crawl coordination

mod coordinator;
mod fetcher;
mod parser;

pub use coordinator::{Coordinator, CrawlReport};
pub use fetcher::{
    build_http_client, FetchError, FetchResult, Fetcher, HttpTransport, RawResponse, RetryPolicy,
    Transport,
};
pub use parser::{parse_listing, EntryKind, Listing, ListingEntry, ListingError};
