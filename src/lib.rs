//! Pool-Indexer: a package metadata indexer for directory-listing mirrors
//!
//! This crate crawls static HTML directory listings laid out as
//! `pool/<component>/<bucket>/<package>/<package>_<version>/` and records,
//! for every package version directory, where its `copyright` and `changelog`
//! files live.

pub mod config;
pub mod crawler;
pub mod output;
pub mod package;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Pool-Indexer operations
#[derive(Debug, Error)]
pub enum IndexerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,

    #[error("URL cannot be a base: {0}")]
    CannotBeABase(String),
}

/// Result type alias for Pool-Indexer operations
pub type Result<T> = std::result::Result<T, IndexerError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Coordinator, CrawlReport};
pub use package::{FileKind, PackageKey, PackageRecord, PathExtractor};
pub use state::{Frontier, NodeState, VisitOutcome};
pub use storage::RecordStore;
pub use url::normalize_directory_url;
