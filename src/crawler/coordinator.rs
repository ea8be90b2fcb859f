//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the recursive fan-out that drives a crawl:
//! - Seeding one task per configured root
//! - Fetching each directory listing under a global concurrency cap
//! - Spawning a child task for every newly admitted subdirectory
//! - Upserting every well-known file into the record store
//! - Handling cancellation and producing the final report

use crate::config::Config;
use crate::crawler::fetcher::{build_http_client, FetchResult, Fetcher, HttpTransport, Transport};
use crate::crawler::parser::{parse_listing, EntryKind};
use crate::output::CrawlStats;
use crate::package::{FileKind, PackageRecord, PathExtractor};
use crate::state::{CrawlCounters, Frontier, NodeState, VisitOutcome};
use crate::storage::{RecordStore, UpsertOutcome};
use crate::url::{lowercase_basename, to_directory_url, Boundaries};
use crate::IndexerError;
use chrono::{DateTime, Utc};
use futures::future::{BoxFuture, FutureExt};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};
use url::Url;

/// Redirect hops followed for one node before it is abandoned
const MAX_REDIRECTS: u32 = 10;

/// Outcome of a finished (or cancelled) crawl
#[derive(Debug, Clone)]
pub struct CrawlReport {
    /// Records in order of first discovery
    pub records: Vec<PackageRecord>,
    pub stats: CrawlStats,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// True when the run was cut short; `records` is then a partial snapshot
    pub cancelled: bool,
}

/// State shared by every node task of one crawl
struct CrawlSession {
    fetcher: Fetcher,
    frontier: Frontier,
    records: RecordStore,
    counters: Arc<CrawlCounters>,
    extractor: PathExtractor,
    /// Admission for outstanding fetches; held only while fetching
    permits: Semaphore,
    cancel: CancellationToken,
    max_depth: u32,
    progress_interval: u64,
    started: Instant,
}

/// Spawnable future processing the subtree rooted at `url`
///
/// Boxed so each node is its own heap task regardless of depth.
fn crawl_node(session: Arc<CrawlSession>, url: Url, depth: u32) -> BoxFuture<'static, ()> {
    async move { session.process_node(url, depth).await }.boxed()
}

fn advance(url: &Url, state: NodeState, next: NodeState) -> NodeState {
    debug_assert!(
        state.can_transition_to(next),
        "illegal node transition {} -> {}",
        state,
        next
    );
    trace!("{}: {} -> {}", url, state, next);
    next
}

impl CrawlSession {
    /// Fetches one admitted directory, dispatches its children and waits for them
    async fn process_node(self: &Arc<Self>, url: Url, depth: u32) {
        let mut state = NodeState::Pending;

        if self.cancel.is_cancelled() {
            advance(&url, state, NodeState::Done);
            return;
        }

        state = advance(&url, state, NodeState::Fetching);
        let Some((base, content_type, body)) = self.fetch_listing(&url).await else {
            advance(&url, state, NodeState::Done);
            return;
        };

        let listing = match parse_listing(&body, content_type.as_deref(), &base) {
            Ok(listing) => listing,
            Err(e) => {
                warn!("Abandoning {}: {}", base, e);
                self.counters.record_failed_node();
                advance(&url, state, NodeState::Done);
                return;
            }
        };
        state = advance(&url, state, NodeState::Listed);
        self.report_progress();

        let mut children = JoinSet::new();
        for entry in &listing.entries {
            match entry.kind {
                EntryKind::File => self.record_file(&entry.url),
                EntryKind::Directory => {
                    if self.cancel.is_cancelled() {
                        continue;
                    }
                    if let Some(child) = self.admit_child(&entry.url, depth + 1) {
                        children.spawn(crawl_node(Arc::clone(self), child, depth + 1));
                    }
                }
            }
        }

        if children.is_empty() {
            advance(&url, state, NodeState::Done);
            return;
        }

        state = advance(&url, state, NodeState::Recursing);
        while let Some(joined) = children.join_next().await {
            if let Err(e) = joined {
                error!("Subtree task under {} failed: {}", base, e);
            }
        }
        advance(&url, state, NodeState::Done);
    }

    /// Fetches the listing of `url`, following redirects the frontier admits
    ///
    /// The permit is held for one request at a time and released before the
    /// next hop. Returns the URL that served the listing with its content
    /// type and body, or None when the node is abandoned.
    async fn fetch_listing(&self, url: &Url) -> Option<(Url, Option<String>, String)> {
        let mut current = url.clone();
        let mut hops = 0u32;

        loop {
            let result = {
                let _permit = tokio::select! {
                    _ = self.cancel.cancelled() => return None,
                    permit = self.permits.acquire() => permit.ok()?,
                };
                self.fetcher.fetch(&current, &self.cancel).await
            };

            match result {
                FetchResult::Success {
                    content_type, body, ..
                } => return Some((current, content_type, body)),
                FetchResult::Redirect {
                    status_code,
                    location,
                } => {
                    hops += 1;
                    if hops > MAX_REDIRECTS {
                        warn!("Abandoning {}: more than {} redirects", url, MAX_REDIRECTS);
                        self.counters.record_failed_node();
                        return None;
                    }
                    trace!("{} answered {} -> {}", current, status_code, location);
                    current = self.admit_redirect(&current, location)?;
                }
                FetchResult::Failure { error, attempts } => {
                    if self.cancel.is_cancelled() {
                        debug!("Fetch of {} cancelled", current);
                    } else {
                        warn!(
                            "Abandoning {} after {} attempt(s): {}",
                            current, attempts, error
                        );
                        self.counters.record_failed_node();
                    }
                    return None;
                }
            }
        }
    }

    /// Offers a redirect target to the frontier before it is fetched
    ///
    /// A target that was already visited, lies outside the roots or points
    /// back at the requested directory abandons the node.
    fn admit_redirect(&self, requested: &Url, location: Url) -> Option<Url> {
        let landed = match to_directory_url(location) {
            Ok(landed) => landed,
            Err(e) => {
                warn!("Abandoning {}: redirected to unusable URL: {}", requested, e);
                self.counters.record_failed_node();
                return None;
            }
        };

        if landed == *requested {
            warn!("Abandoning {}: redirects to itself", requested);
            self.counters.record_failed_node();
            return None;
        }

        match self.frontier.try_visit_url(&landed) {
            VisitOutcome::Admitted(target) => {
                debug!("{} redirected to {}", requested, target);
                Some(target)
            }
            VisitOutcome::AlreadyVisited => {
                debug!("{} redirected to already visited {}", requested, landed);
                self.counters.record_duplicate();
                None
            }
            VisitOutcome::OutOfBounds => {
                debug!("{} redirected outside the roots to {}", requested, landed);
                self.counters.record_out_of_bounds();
                None
            }
            VisitOutcome::CeilingReached => {
                self.note_ceiling(&landed);
                None
            }
        }
    }

    /// Applies the depth ceiling and dedup check to a subdirectory link
    fn admit_child(&self, url: &Url, depth: u32) -> Option<Url> {
        if depth > self.max_depth {
            self.note_ceiling(url);
            return None;
        }

        match self.frontier.try_visit_url(url) {
            VisitOutcome::Admitted(child) => Some(child),
            VisitOutcome::AlreadyVisited => {
                trace!("Skipping already visited {}", url);
                self.counters.record_duplicate();
                None
            }
            VisitOutcome::OutOfBounds => {
                trace!("Skipping out-of-bounds {}", url);
                self.counters.record_out_of_bounds();
                None
            }
            VisitOutcome::CeilingReached => {
                self.note_ceiling(url);
                None
            }
        }
    }

    fn note_ceiling(&self, url: &Url) {
        if self.counters.record_ceiling_hit() == 1 {
            warn!(
                "Crawl ceiling reached at {}; further branches past the limit are skipped",
                url
            );
        } else {
            debug!("Ceiling reached, skipping {}", url);
        }
    }

    /// Extracts and upserts a file entry if it is a well-known file
    fn record_file(&self, url: &Url) {
        let Some(name) = lowercase_basename(url) else {
            return;
        };
        if FileKind::from_filename(&name).is_none() {
            return;
        }

        if !self.frontier.boundaries().contains(url) {
            trace!("Skipping out-of-bounds file {}", url);
            self.counters.record_out_of_bounds();
            return;
        }

        match self.extractor.extract(url) {
            Some((key, kind)) => {
                self.counters.record_file();
                if self.records.upsert(key.clone(), kind, url.as_str()) == UpsertOutcome::Created
                {
                    debug!("New package record {}", key);
                }
            }
            None => {
                trace!("No package key for {}", url);
                self.counters.record_malformed_path();
            }
        }
    }

    fn report_progress(&self) {
        let listings = self.counters.record_listing();
        if self.progress_interval > 0 && listings % self.progress_interval == 0 {
            info!(
                "Progress: {} listings, {} fetch attempts, {} records, {:.1}s elapsed",
                listings,
                self.counters.fetch_attempts(),
                self.records.len(),
                self.started.elapsed().as_secs_f64()
            );
        }
    }
}

/// Main crawler coordinator structure
pub struct Coordinator {
    session: Arc<CrawlSession>,
}

impl Coordinator {
    /// Creates a coordinator that fetches over HTTP
    ///
    /// # Arguments
    ///
    /// * `config` - The validated crawler configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(IndexerError)` - Failed to build the HTTP client or the boundaries
    pub fn new(config: &Config) -> Result<Self, IndexerError> {
        let client = build_http_client(&config.user_agent, &config.fetch)?;
        Self::with_transport(config, Arc::new(HttpTransport::new(client)))
    }

    /// Creates a coordinator over an arbitrary transport
    pub fn with_transport(
        config: &Config,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, IndexerError> {
        let boundaries = Boundaries::from_config(config)?;
        let counters = Arc::new(CrawlCounters::new());

        let session = CrawlSession {
            fetcher: Fetcher::new(transport, &config.fetch, Arc::clone(&counters)),
            frontier: Frontier::new(boundaries, config.crawler.max_nodes),
            records: RecordStore::new(),
            counters,
            extractor: PathExtractor::new(config.crawler.anchor_segment.clone()),
            permits: Semaphore::new(config.crawler.max_concurrent_requests as usize),
            cancel: CancellationToken::new(),
            max_depth: config.crawler.max_depth,
            progress_interval: config.crawler.progress_interval,
            started: Instant::now(),
        };

        Ok(Self {
            session: Arc::new(session),
        })
    }

    /// Token that cancels the crawl when triggered
    pub fn cancellation_token(&self) -> CancellationToken {
        self.session.cancel.clone()
    }

    /// Runs the crawl until every subtree completes or the token is cancelled
    pub async fn run(self) -> CrawlReport {
        let started_at = Utc::now();
        let clock = Instant::now();
        let session = self.session;

        let mut roots = JoinSet::new();
        for root in session.frontier.boundaries().roots() {
            match session.frontier.try_visit_url(&root.url) {
                VisitOutcome::Admitted(url) => {
                    info!("Crawling component {} from {}", root.component, url);
                    roots.spawn(crawl_node(Arc::clone(&session), url, 0));
                }
                other => warn!("Root {} not admitted: {:?}", root.url, other),
            }
        }

        while let Some(joined) = roots.join_next().await {
            if let Err(e) = joined {
                error!("Root task failed: {}", e);
            }
        }

        let records = session.records.snapshot();
        let stats = session.counters.snapshot(
            clock.elapsed(),
            records.len(),
            session.records.complete_count(),
        );
        let cancelled = session.cancel.is_cancelled();

        if cancelled {
            warn!(
                "Crawl cancelled: {} records after {} fetch attempts",
                records.len(),
                stats.fetch_attempts
            );
        } else {
            info!(
                "Crawl completed: {} records, {} fetch attempts in {:?}",
                records.len(),
                stats.fetch_attempts,
                stats.elapsed
            );
        }

        CrawlReport {
            records,
            stats,
            started_at,
            finished_at: Utc::now(),
            cancelled,
        }
    }
}
