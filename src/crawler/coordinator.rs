//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the main crawl loop that coordinates all aspects of
//! the crawling process, including:
//! - Building the frontier from a checkpoint or the seed file
//! - Fetching, filtering and persisting articles
//! - Expanding relevant articles' links up to the depth bound
//! - Handling interrupts and saving the checkpoint on every exit path

use crate::config::{Config, OutputConfig};
use crate::crawler::fetcher::{ApiFetcher, ArticleSource, FetchOutcome};
use crate::crawler::relevance::RelevanceFilter;
use crate::state::{CrawlState, Frontier, FrontierItem, Popped};
use crate::storage::{
    load_checkpoint, save_checkpoint, ArticleStore, Checkpoint, FileArticleStore, SeedFile,
};
use crate::CrawlError;
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Notify;

/// Traversal bounds and pacing for one run
#[derive(Debug, Clone)]
pub struct CrawlSettings {
    pub max_depth: u32,
    pub article_limit: usize,
    pub politeness_delay: Duration,
    pub progress_interval: usize,
    pub checkpoint_path: PathBuf,
}

impl From<&Config> for CrawlSettings {
    fn from(config: &Config) -> Self {
        Self {
            max_depth: config.crawler.max_depth,
            article_limit: config.crawler.article_limit,
            politeness_delay: config.crawler.politeness_delay(),
            progress_interval: config.crawler.progress_interval.max(1),
            checkpoint_path: config.output.checkpoint_path.clone(),
        }
    }
}

/// Cooperative stop request shared with the signal listener
///
/// The crawl loop checks it between articles and while sleeping; a fetch in
/// flight always completes first.
#[derive(Debug, Clone, Default)]
pub struct Shutdown {
    requested: Arc<AtomicBool>,
    notify: Arc<Notify>,
}

impl Shutdown {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests the crawl to stop at the next loop boundary
    pub fn trigger(&self) {
        self.requested.store(true, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    pub fn is_triggered(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }

    /// Sleeps for `duration` unless a stop is requested first
    async fn sleep(&self, duration: Duration) {
        if duration.is_zero() {
            return;
        }
        let notified = self.notify.notified();
        if self.is_triggered() {
            return;
        }
        tokio::select! {
            _ = tokio::time::sleep(duration) => {}
            _ = notified => {}
        }
    }

    /// Triggers on Ctrl-C
    pub fn listen_for_ctrl_c(&self) {
        let shutdown = self.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupt received, stopping after the current article");
                shutdown.trigger();
            }
        });
    }
}

/// Counters and final state of one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlReport {
    pub state: CrawlState,
    /// Articles fetched this run (any outcome)
    pub processed: usize,
    /// Relevant articles written to the article store
    pub persisted: usize,
    /// Articles fetched but without any keyword
    pub irrelevant: usize,
    /// Articles whose fetch exhausted its retries
    pub failed: usize,
    /// Queue entries dropped without fetching
    pub skipped: usize,
    /// New identifiers added to the queue
    pub enqueued: usize,
    /// Size of the visited set at the end of the run
    pub visited_total: usize,
    /// Items left in the queue at the end of the run
    pub queued_remaining: usize,
    /// The error that stopped the loop, if any
    pub error: Option<String>,
}

impl CrawlReport {
    fn new() -> Self {
        Self {
            state: CrawlState::Running,
            processed: 0,
            persisted: 0,
            irrelevant: 0,
            failed: 0,
            skipped: 0,
            enqueued: 0,
            visited_total: 0,
            queued_remaining: 0,
            error: None,
        }
    }
}

/// Main crawler coordinator structure
pub struct Coordinator<S, A = FileArticleStore> {
    settings: CrawlSettings,
    source: S,
    store: A,
    filter: RelevanceFilter,
    frontier: Frontier,
    shutdown: Shutdown,
    report: CrawlReport,
    /// Item popped from the queue but not yet finished
    in_flight: Option<FrontierItem>,
}

impl<S, A> Coordinator<S, A>
where
    S: ArticleSource,
    A: ArticleStore,
{
    /// Creates a coordinator over an already initialized frontier
    pub fn new(
        settings: CrawlSettings,
        source: S,
        store: A,
        filter: RelevanceFilter,
        frontier: Frontier,
    ) -> Self {
        Self {
            settings,
            source,
            store,
            filter,
            frontier,
            shutdown: Shutdown::new(),
            report: CrawlReport::new(),
            in_flight: None,
        }
    }

    /// Replaces the stop signal the loop observes
    pub fn with_shutdown(mut self, shutdown: Shutdown) -> Self {
        self.shutdown = shutdown;
        self
    }

    pub fn frontier(&self) -> &Frontier {
        &self.frontier
    }

    pub fn state(&self) -> CrawlState {
        self.report.state
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn store(&self) -> &A {
        &self.store
    }

    /// Runs the crawl loop to a stop state and saves the checkpoint
    ///
    /// Errors and panics inside the loop stop it as
    /// [`CrawlState::StoppedInterrupted`] and are recorded in the report rather
    /// than returned. The article being processed goes back to the head of the
    /// queue. The only error returned is a failure to write the checkpoint.
    pub async fn run(&mut self) -> Result<CrawlReport, CrawlError> {
        tracing::info!(
            "Starting crawl: {} queued, {} already visited, limit {}, max depth {}",
            self.frontier.queue_len(),
            self.frontier.visited_count(),
            self.settings.article_limit,
            self.settings.max_depth
        );

        let start_time = Instant::now();
        let outcome = AssertUnwindSafe(self.crawl_loop(start_time))
            .catch_unwind()
            .await;

        self.report.state = match outcome {
            Ok(Ok(state)) => state,
            Ok(Err(e)) => self.stop_on_error(e.to_string()),
            Err(panic_info) => {
                let message = format!("panic: {}", extract_panic_message(&panic_info));
                self.stop_on_error(message)
            }
        };
        self.report.visited_total = self.frontier.visited_count();
        self.report.queued_remaining = self.frontier.queue_len();

        self.save_checkpoint()?;

        tracing::info!(
            "Crawl {} after {:?}: {} processed, {} saved, {} irrelevant, {} failed",
            self.report.state,
            start_time.elapsed(),
            self.report.processed,
            self.report.persisted,
            self.report.irrelevant,
            self.report.failed
        );

        Ok(self.report.clone())
    }

    async fn crawl_loop(&mut self, start_time: Instant) -> Result<CrawlState, CrawlError> {
        loop {
            if self.shutdown.is_triggered() {
                tracing::info!("Stop requested, leaving crawl loop");
                return Ok(CrawlState::StoppedInterrupted);
            }

            if self.frontier.is_queue_empty() {
                tracing::info!("Frontier is empty, crawl complete");
                return Ok(CrawlState::StoppedQueueEmpty);
            }

            if self.frontier.visited_count() >= self.settings.article_limit {
                tracing::info!(
                    "Article limit of {} reached with {} still queued",
                    self.settings.article_limit,
                    self.frontier.queue_len()
                );
                return Ok(CrawlState::StoppedBoundReached);
            }

            let item = match self.frontier.pop_next() {
                Some(Popped::Ready(item)) => item,
                Some(Popped::Skipped(item, reason)) => {
                    tracing::debug!("Skipping queue entry {:?}: {:?}", item.identifier, reason);
                    self.report.skipped += 1;
                    continue;
                }
                None => continue,
            };

            self.in_flight = Some(item.clone());
            self.process_item(&item).await?;
            self.in_flight = None;
            self.report.processed += 1;

            if self.report.processed % self.settings.progress_interval == 0 {
                let rate = self.report.processed as f64 / start_time.elapsed().as_secs_f64();
                tracing::info!(
                    "Progress: {} articles visited, {} saved, {} in frontier, {:.2} articles/sec",
                    self.frontier.visited_count(),
                    self.report.persisted,
                    self.frontier.queue_len(),
                    rate
                );
            }

            self.shutdown.sleep(self.settings.politeness_delay).await;
        }
    }

    /// Fetches one article and applies the relevance and expansion rules
    async fn process_item(&mut self, item: &FrontierItem) -> Result<(), CrawlError> {
        tracing::debug!("Processing '{}' at depth {}", item.identifier, item.depth);

        let result = match self.source.fetch(&item.identifier).await {
            FetchOutcome::Success(result) => result,
            FetchOutcome::Failure(failure) => {
                tracing::warn!(
                    "Giving up on '{}' after {} attempts: {}",
                    item.identifier,
                    failure.attempts,
                    failure.reason
                );
                self.frontier.mark_visited(&item.identifier);
                self.report.failed += 1;
                return Ok(());
            }
        };

        let Some(keyword) = self.filter.matching_keyword(&result.text) else {
            tracing::debug!("'{}' matched no keyword", item.identifier);
            self.frontier.mark_visited(&item.identifier);
            self.report.irrelevant += 1;
            return Ok(());
        };

        tracing::info!("Saving '{}' (matched {:?})", item.identifier, keyword);
        self.store.persist(&item.identifier, &result.text)?;
        self.frontier.mark_visited(&item.identifier);
        self.report.persisted += 1;

        if item.depth >= self.settings.max_depth {
            return Ok(());
        }

        let mut added = 0;
        for link in result.links {
            if self.frontier.offer(link, item.depth + 1) {
                added += 1;
            }
        }
        self.report.enqueued += added;
        tracing::debug!(
            "Enqueued {} new links from '{}' at depth {}",
            added,
            item.identifier,
            item.depth + 1
        );

        Ok(())
    }

    /// Records why the loop stopped and puts the unfinished item back
    fn stop_on_error(&mut self, message: String) -> CrawlState {
        tracing::error!("Crawl stopped by unexpected error: {}", message);
        if let Some(item) = self.in_flight.take() {
            self.frontier.requeue_front(item);
        }
        self.report.error = Some(message);
        CrawlState::StoppedInterrupted
    }

    fn save_checkpoint(&self) -> Result<(), CrawlError> {
        let checkpoint = Checkpoint::from_frontier(&self.frontier);
        save_checkpoint(&self.settings.checkpoint_path, &checkpoint)?;
        tracing::info!(
            "Saved checkpoint to {} ({} visited, {} queued)",
            self.settings.checkpoint_path.display(),
            checkpoint.visited.len(),
            checkpoint.queue.len()
        );
        Ok(())
    }
}

/// Extracts a human-readable message from a panic payload
fn extract_panic_message(panic_info: &Box<dyn Any + Send>) -> String {
    if let Some(s) = panic_info.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic_info.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Builds the starting frontier
///
/// Unless `fresh` is set, a readable checkpoint wins. A missing or unreadable
/// checkpoint falls back to the seed file with every seed at depth 0.
pub fn load_frontier(output: &OutputConfig, fresh: bool) -> Result<Frontier, CrawlError> {
    if fresh {
        tracing::info!("Starting fresh crawl (ignoring previous checkpoint)");
    } else {
        match load_checkpoint(&output.checkpoint_path) {
            Ok(Some(checkpoint)) => {
                tracing::info!(
                    "Resuming from checkpoint: {} visited, {} queued",
                    checkpoint.visited.len(),
                    checkpoint.queue.len()
                );
                return Ok(checkpoint.into_frontier());
            }
            Ok(None) => tracing::info!("No checkpoint found, seeding frontier"),
            Err(e) => tracing::warn!("Ignoring unreadable checkpoint: {}", e),
        }
    }

    let seeds = SeedFile::load(&output.seed_path)?;
    if seeds.is_empty() {
        tracing::warn!("Seed file {} has no records", output.seed_path.display());
    }
    tracing::info!("Seeding frontier with {} articles", seeds.len());

    Ok(Frontier::from_seeds(seeds.keys()))
}

/// Runs the main crawl operation
///
/// This function orchestrates the entire crawl process:
///
/// 1. Restore the frontier from the checkpoint or seed it
/// 2. Build the HTTP fetch client
/// 3. Install the Ctrl-C listener
/// 4. Run the crawl loop until a bound, an empty queue or an interrupt
/// 5. Save the checkpoint
///
/// # Example
///
/// ```no_run
/// use article_ripple::config::load_config;
/// use article_ripple::crawler::run_crawl;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("config.toml"))?;
/// let report = run_crawl(&config, false).await?;
/// println!("stopped: {}", report.state);
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: &Config, fresh: bool) -> Result<CrawlReport, CrawlError> {
    let frontier = load_frontier(&config.output, fresh)?;
    let fetcher = ApiFetcher::new(&config.provider)?;
    let store = FileArticleStore::open(&config.output.data_dir)?;
    let filter = RelevanceFilter::new(&config.crawler.keywords);

    let shutdown = Shutdown::new();
    shutdown.listen_for_ctrl_c();

    let settings = CrawlSettings::from(config);
    let mut coordinator =
        Coordinator::new(settings, fetcher, store, filter, frontier).with_shutdown(shutdown);
    coordinator.run().await
}
