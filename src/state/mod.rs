//! State module for tracking crawl progress
//!
//! This module holds the mutable state shared by all concurrent node tasks.
//!
//! # Components
//!
//! - `NodeState`: lifecycle of a single directory node
//! - `Frontier`: exactly-once admission of directory URLs inside the root boundaries
//! - `CrawlCounters`: advisory attempt and outcome counters

mod counters;
mod frontier;
mod node_state;

// Re-export main types
pub use counters::CrawlCounters;
pub use frontier::{Frontier, VisitOutcome};
pub use node_state::NodeState;
