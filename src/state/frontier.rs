//! Exactly-once dispatch tracking for directory URLs

use crate::url::{normalize_directory_url, to_directory_url, Boundaries};
use dashmap::DashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use url::Url;

/// Result of offering a directory URL to the frontier
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VisitOutcome {
    /// First sighting; the caller owns fetching the returned normalized URL
    Admitted(Url),

    /// The normalized URL was dispatched earlier in this run
    AlreadyVisited,

    /// The URL is malformed or lies outside every root boundary
    OutOfBounds,

    /// The node ceiling for this run has been reached
    CeilingReached,
}

impl VisitOutcome {
    pub fn is_admitted(&self) -> bool {
        matches!(self, Self::Admitted(_))
    }
}

/// Set of directory URLs already dispatched for fetching
///
/// Membership check-and-insert is a single atomic operation on a sharded set,
/// so concurrent tasks offering the same URL see exactly one `Admitted`.
/// Boundary checks happen before the set is consulted, so out-of-bounds URLs
/// never touch it.
pub struct Frontier {
    boundaries: Boundaries,
    visited: DashSet<String>,
    admitted: AtomicU64,
    max_nodes: u64,
}

impl Frontier {
    /// Creates an empty frontier bounded by `boundaries`
    ///
    /// # Arguments
    ///
    /// * `boundaries` - Root prefixes every admitted URL must lie under
    /// * `max_nodes` - Maximum number of URLs admitted over the run
    pub fn new(boundaries: Boundaries, max_nodes: u64) -> Self {
        Self {
            boundaries,
            visited: DashSet::new(),
            admitted: AtomicU64::new(0),
            max_nodes,
        }
    }

    /// Normalizes `raw` and offers it to the frontier
    pub fn try_visit(&self, raw: &str) -> VisitOutcome {
        match normalize_directory_url(raw) {
            Ok(url) => self.offer(url),
            Err(e) => {
                tracing::trace!("Rejecting malformed directory URL {}: {}", raw, e);
                VisitOutcome::OutOfBounds
            }
        }
    }

    /// Normalizes a parsed URL and offers it to the frontier
    pub fn try_visit_url(&self, url: &Url) -> VisitOutcome {
        match to_directory_url(url.clone()) {
            Ok(url) => self.offer(url),
            Err(e) => {
                tracing::trace!("Rejecting malformed directory URL {}: {}", url, e);
                VisitOutcome::OutOfBounds
            }
        }
    }

    fn offer(&self, url: Url) -> VisitOutcome {
        if !self.boundaries.contains(&url) {
            return VisitOutcome::OutOfBounds;
        }

        if self.visited.contains(url.as_str()) {
            return VisitOutcome::AlreadyVisited;
        }

        // Only the task that wins the insert competes for a ceiling slot
        if !self.visited.insert(url.as_str().to_string()) {
            return VisitOutcome::AlreadyVisited;
        }

        let reserved = self
            .admitted
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |count| {
                (count < self.max_nodes).then_some(count + 1)
            })
            .is_ok();
        if reserved {
            VisitOutcome::Admitted(url)
        } else {
            self.visited.remove(url.as_str());
            VisitOutcome::CeilingReached
        }
    }

    /// Number of URLs admitted so far
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    pub fn boundaries(&self) -> &Boundaries {
        &self.boundaries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::url::RootBoundary;
    use std::sync::Arc;

    fn frontier(max_nodes: u64) -> Frontier {
        let boundaries = Boundaries::new(vec![
            RootBoundary::new("main", "https://example.com/pool/main/").unwrap(),
            RootBoundary::new("universe", "https://example.com/pool/universe/").unwrap(),
        ]);
        Frontier::new(boundaries, max_nodes)
    }

    #[test]
    fn test_first_visit_admitted() {
        let f = frontier(100);
        let outcome = f.try_visit("https://example.com/pool/main/l/");
        assert_eq!(
            outcome,
            VisitOutcome::Admitted(Url::parse("https://example.com/pool/main/l/").unwrap())
        );
        assert_eq!(f.visited_count(), 1);
    }

    #[test]
    fn test_second_visit_rejected() {
        let f = frontier(100);
        assert!(f.try_visit("https://example.com/pool/main/l/").is_admitted());
        assert_eq!(
            f.try_visit("https://example.com/pool/main/l/"),
            VisitOutcome::AlreadyVisited
        );
    }

    #[test]
    fn test_equivalent_forms_collapse() {
        let f = frontier(100);
        assert!(f.try_visit("https://example.com/pool/main/l").is_admitted());
        assert_eq!(
            f.try_visit("https://EXAMPLE.com/pool/main//l/#frag"),
            VisitOutcome::AlreadyVisited
        );
        assert_eq!(f.visited_count(), 1);
    }

    #[test]
    fn test_out_of_bounds_does_not_touch_set() {
        let f = frontier(100);
        assert_eq!(
            f.try_visit("https://example.com/pool/"),
            VisitOutcome::OutOfBounds
        );
        assert_eq!(
            f.try_visit("https://elsewhere.org/pool/main/"),
            VisitOutcome::OutOfBounds
        );
        assert_eq!(f.try_visit("not a url"), VisitOutcome::OutOfBounds);
        assert_eq!(f.visited_count(), 0);
    }

    #[test]
    fn test_ceiling_reached() {
        let f = frontier(2);
        assert!(f.try_visit("https://example.com/pool/main/a/").is_admitted());
        assert!(f.try_visit("https://example.com/pool/main/b/").is_admitted());
        assert_eq!(
            f.try_visit("https://example.com/pool/main/c/"),
            VisitOutcome::CeilingReached
        );
        // Already-visited URLs still report as such at the ceiling
        assert_eq!(
            f.try_visit("https://example.com/pool/main/a/"),
            VisitOutcome::AlreadyVisited
        );
    }

    #[test]
    fn test_ceiling_rejection_leaves_url_unvisited() {
        let f = frontier(1);
        assert!(f.try_visit("https://example.com/pool/main/a/").is_admitted());
        assert_eq!(
            f.try_visit("https://example.com/pool/main/b/"),
            VisitOutcome::CeilingReached
        );
        assert_eq!(f.visited_count(), 1);
        assert_eq!(
            f.try_visit("https://example.com/pool/main/b/"),
            VisitOutcome::CeilingReached
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_racing_duplicates_at_ceiling_are_already_visited() {
        let f = Arc::new(frontier(1));
        let mut handles = Vec::new();

        for _ in 0..64 {
            let f = Arc::clone(&f);
            handles.push(tokio::spawn(async move {
                f.try_visit("https://example.com/pool/main/l/libx/")
            }));
        }

        let mut admitted = 0;
        for handle in handles {
            match handle.await.unwrap() {
                VisitOutcome::Admitted(_) => admitted += 1,
                VisitOutcome::AlreadyVisited => {}
                other => panic!("unexpected outcome {:?}", other),
            }
        }

        assert_eq!(admitted, 1);
        assert_eq!(f.visited_count(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_visits_admit_exactly_once() {
        let f = Arc::new(frontier(1_000));
        let mut handles = Vec::new();

        for i in 0..64 {
            let f = Arc::clone(&f);
            handles.push(tokio::spawn(async move {
                // Mix equivalent spellings of the same directory
                let raw = if i % 2 == 0 {
                    "https://example.com/pool/main/l/libx/"
                } else {
                    "https://example.com/pool/main/l/libx"
                };
                f.try_visit(raw).is_admitted()
            }));
        }

        let mut admitted = 0;
        for handle in handles {
            if handle.await.unwrap() {
                admitted += 1;
            }
        }

        assert_eq!(admitted, 1);
        assert_eq!(f.visited_count(), 1);
    }
}
