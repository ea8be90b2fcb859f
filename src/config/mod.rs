//! Configuration module for Pool-Indexer
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use pool_indexer::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("indexer.toml")).unwrap();
//! println!("Crawling {} roots", config.roots.len());
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, FetchConfig, OutputConfig, RootEntry, UserAgentConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
