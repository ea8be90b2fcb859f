//! Integration tests for Pool-Indexer

mod crawl_tests;
mod output_tests;
