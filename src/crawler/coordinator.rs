//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the crawl loop for one task:
//! - Seeding the frontier with the task's seed URL
//! - Handing frontier entries to a bounded pool of page workers
//! - Observing the task's stop signal between dequeues
//! - Persisting the terminal task state before the tracker reports it
//!
//! Each worker fetches one page, extracts and scores it, offers its internal
//! links back to the frontier and saves the result. A failed fetch only skips
//! that page. A failed save ends the task.

use crate::crawler::page::{LinkCounts, PageResult};
use crate::crawler::{FetchResult, Fetcher};
use crate::extract::extract;
use crate::frontier::{FrontierEntry, SharedFrontier};
use crate::seo::evaluate;
use crate::state::{CrawlTask, TaskStatus, TaskTracker};
use crate::storage::{lock_storage, SharedStorage, StorageResult};
use crate::url::{classify_href, normalize_url, LinkKind};
use crate::OpenCrawlError;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;
use tokio::task::JoinSet;
use url::Url;

/// Collaborators shared by every crawl task of a service
#[derive(Clone)]
pub struct CrawlContext {
    pub fetcher: Arc<dyn Fetcher>,
    pub storage: SharedStorage,
    pub tracker: Arc<TaskTracker>,

    /// Concurrent page fetches per task
    pub max_workers: usize,

    /// Whether raw HTML is kept with each result
    pub store_raw_content: bool,
}

/// Running totals for one crawl
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlStats {
    pub saved: usize,
    pub skipped: usize,
}

/// How the crawl loop ended, when it did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CrawlEnd {
    Exhausted,
    Stopped,
}

/// What a page worker did with its entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PageOutcome {
    Saved,
    Skipped,
}

/// Everything a page worker needs, cheap to clone into each spawned task
#[derive(Clone)]
struct PageWorker {
    task_id: Arc<str>,
    user_agent: Arc<str>,
    seed: Arc<Url>,
    frontier: Arc<SharedFrontier>,
    fetcher: Arc<dyn Fetcher>,
    storage: SharedStorage,
    store_raw_content: bool,
}

/// Orchestrates the crawl of one task
pub struct Coordinator {
    task: CrawlTask,
    seed: Url,
    ctx: CrawlContext,
    frontier: Arc<SharedFrontier>,
    stop_rx: watch::Receiver<bool>,
}

impl Coordinator {
    /// Creates a coordinator for a task that has entered in_progress
    ///
    /// # Arguments
    ///
    /// * `task` - The task snapshot returned when its run window opened
    /// * `stop_rx` - The task's stop signal
    /// * `ctx` - Shared collaborators
    ///
    /// # Returns
    ///
    /// * `Err(OpenCrawlError::Url)` - The seed URL is not a crawlable URL
    pub fn new(
        task: CrawlTask,
        stop_rx: watch::Receiver<bool>,
        ctx: CrawlContext,
    ) -> Result<Self, OpenCrawlError> {
        let seed = normalize_url(&task.seed_url)?;
        Ok(Self {
            task,
            seed,
            ctx,
            frontier: Arc::new(SharedFrontier::new()),
            stop_rx,
        })
    }

    /// Runs the crawl to a terminal status
    ///
    /// The terminal state is persisted before the tracker reports it. If that
    /// write fails, the task ends as failed instead.
    pub async fn run(self) -> TaskStatus {
        tracing::info!(
            "Starting crawl task {} for {} (depth {})",
            self.task.id,
            self.seed,
            self.task.depth
        );
        let start_time = Instant::now();

        let (status, summary, detail) = match self.crawl().await {
            Ok((CrawlEnd::Exhausted, stats)) => (
                TaskStatus::Completed,
                Some(format!(
                    "Crawl completed for {}: {} pages saved, {} skipped",
                    self.task.seed_url, stats.saved, stats.skipped
                )),
                None,
            ),
            Ok((CrawlEnd::Stopped, stats)) => (
                TaskStatus::Stopped,
                Some(format!(
                    "Crawl stopped for {}: {} pages saved, {} skipped",
                    self.task.seed_url, stats.saved, stats.skipped
                )),
                None,
            ),
            Err(e) => {
                tracing::error!("Crawl task {} failed: {}", self.task.id, e);
                (TaskStatus::Failed, None, Some(e.classified_message()))
            }
        };

        let status = finalize(&self.ctx, &self.task.id, status, summary, detail);
        tracing::info!(
            "Crawl task {} finished as {} in {:?} ({} URLs seen)",
            self.task.id,
            status,
            start_time.elapsed(),
            self.frontier.seen_count()
        );
        status
    }

    fn worker(&self) -> PageWorker {
        PageWorker {
            task_id: Arc::from(self.task.id.as_str()),
            user_agent: Arc::from(self.task.user_agent.as_str()),
            seed: Arc::new(self.seed.clone()),
            frontier: Arc::clone(&self.frontier),
            fetcher: Arc::clone(&self.ctx.fetcher),
            storage: Arc::clone(&self.ctx.storage),
            store_raw_content: self.ctx.store_raw_content,
        }
    }

    /// The dequeue/fetch loop
    ///
    /// The stop signal is checked before every dequeue. Once it is seen,
    /// nothing else is taken from the frontier; workers already in flight
    /// finish and persist.
    async fn crawl(&self) -> Result<(CrawlEnd, CrawlStats), OpenCrawlError> {
        // The seed's own level counts against the budget
        self.frontier
            .offer(self.seed.clone(), self.task.depth.saturating_add(1));

        let worker = self.worker();
        let max_workers = self.ctx.max_workers.max(1);
        let mut stop_rx = self.stop_rx.clone();
        let mut signal_open = true;
        let mut workers: JoinSet<Result<PageOutcome, OpenCrawlError>> = JoinSet::new();
        let mut stats = CrawlStats::default();
        let mut failure: Option<OpenCrawlError> = None;
        let mut end = CrawlEnd::Exhausted;

        loop {
            if *stop_rx.borrow() {
                tracing::info!("Stop observed for task {}", self.task.id);
                end = CrawlEnd::Stopped;
                break;
            }

            // Fill free worker slots from the frontier
            while workers.len() < max_workers {
                match self.frontier.next() {
                    Some(entry) => {
                        tracing::debug!(
                            "Dequeued {} (depth remaining {})",
                            entry.url,
                            entry.depth_remaining
                        );
                        workers.spawn(worker.clone().process(entry));
                    }
                    None => break,
                }
            }

            if workers.is_empty() {
                tracing::info!("Frontier is empty, crawl complete");
                break;
            }

            tokio::select! {
                joined = workers.join_next() => {
                    if let Some(joined) = joined {
                        if let Err(e) = record(joined, &mut stats) {
                            failure = Some(e);
                            break;
                        }
                    }
                }
                changed = stop_rx.changed(), if signal_open => {
                    if changed.is_err() {
                        // Sender gone; no stop can arrive any more
                        signal_open = false;
                    }
                }
            }
        }

        // Let in-flight pages complete and persist
        while let Some(joined) = workers.join_next().await {
            if let Err(e) = record(joined, &mut stats) {
                failure.get_or_insert(e);
            }
        }

        tracing::info!(
            "Task {}: {} pages saved, {} skipped, {} still queued",
            self.task.id,
            stats.saved,
            stats.skipped,
            self.frontier.pending()
        );

        match failure {
            Some(e) => Err(e),
            None => Ok((end, stats)),
        }
    }
}

/// Folds one finished worker into the running totals
fn record(
    joined: Result<Result<PageOutcome, OpenCrawlError>, tokio::task::JoinError>,
    stats: &mut CrawlStats,
) -> Result<(), OpenCrawlError> {
    match joined {
        Ok(Ok(PageOutcome::Saved)) => stats.saved += 1,
        Ok(Ok(PageOutcome::Skipped)) => stats.skipped += 1,
        Ok(Err(e)) => return Err(e),
        Err(e) => return Err(OpenCrawlError::Worker(e.to_string())),
    }
    Ok(())
}

impl PageWorker {
    /// Processes one frontier entry
    ///
    /// Per-page problems are logged and reported as `Skipped`. Only a failure
    /// to persist the result is returned as an error.
    async fn process(self, entry: FrontierEntry) -> Result<PageOutcome, OpenCrawlError> {
        let started = Instant::now();
        let fetched = self.fetcher.fetch(&entry.url, &self.user_agent).await;
        let load_time = started.elapsed().as_secs_f64();

        let (final_url, body) = match fetched {
            FetchResult::Success {
                final_url, body, ..
            } => (final_url, body),
            other => {
                tracing::warn!(
                    "Skipping {}: {}",
                    entry.url,
                    other.skip_reason().unwrap_or_default()
                );
                return Ok(PageOutcome::Skipped);
            }
        };

        // Parsing is CPU-bound; keep it off the async workers
        let page_url = final_url.clone();
        let extracted = tokio::task::spawn_blocking(move || {
            let content = extract(&body, &page_url);
            (content, body)
        })
        .await;
        let (content, body) = match extracted {
            Ok(extracted) => extracted,
            Err(e) => {
                tracing::warn!("Skipping {}: extraction aborted: {}", entry.url, e);
                return Ok(PageOutcome::Skipped);
            }
        };

        let base = content.base_url.as_ref().unwrap_or(&final_url);
        let (counts, internal) = classify_links(&content.links, base, &self.seed);
        if entry.can_expand() {
            let enqueued = self.frontier.offer_all(internal, entry.child_depth());
            tracing::debug!("{}: {} new internal links enqueued", entry.url, enqueued);
        }

        let seo = evaluate(&content);
        let raw_content = self.store_raw_content.then_some(body);
        let page = PageResult::assemble(
            entry.url.to_string(),
            &content,
            counts,
            seo,
            raw_content,
            load_time,
        );

        let id = {
            let mut storage = lock_storage(&self.storage)?;
            storage.save_page_result(&self.task_id, &page)?
        };

        tracing::info!(
            "Saved {} (result {}, score {}, {:.2}s)",
            page.url,
            id,
            page.seo.score,
            load_time
        );
        Ok(PageOutcome::Saved)
    }
}

/// Counts a page's anchors and collects the internal ones
///
/// Hrefs are resolved against the page's final URL and classified against the
/// crawl seed.
pub fn classify_links(hrefs: &[String], page_url: &Url, seed: &Url) -> (LinkCounts, Vec<Url>) {
    let mut counts = LinkCounts::default();
    let mut internal = Vec::new();

    for href in hrefs {
        match classify_href(href, page_url, seed) {
            (Some(url), LinkKind::Internal) => {
                counts.internal += 1;
                internal.push(url);
            }
            _ => counts.external += 1,
        }
    }

    (counts, internal)
}

fn persist(storage: &SharedStorage, task: &CrawlTask) -> StorageResult<()> {
    lock_storage(storage)?.update_task(task)
}

/// Moves a task to a terminal status, database first
///
/// If the terminal snapshot cannot be written the task is failed instead, with
/// the storage error as its detail. The returned status is what the tracker
/// reports afterwards.
pub(crate) fn finalize(
    ctx: &CrawlContext,
    task_id: &str,
    status: TaskStatus,
    result_summary: Option<String>,
    error_detail: Option<String>,
) -> TaskStatus {
    let mut snapshot = match ctx.tracker.prepare(task_id, status) {
        Ok(snapshot) => snapshot,
        Err(e) => {
            tracing::error!("Cannot finish task {} as {}: {}", task_id, status, e);
            return ctx.tracker.status(task_id).unwrap_or(TaskStatus::Failed);
        }
    };
    snapshot.result_summary = result_summary;
    snapshot.error_detail = error_detail;

    if let Err(e) = persist(&ctx.storage, &snapshot) {
        tracing::error!(
            "Failed to persist {} state of task {}: {}",
            status,
            task_id,
            e
        );
        snapshot.status = TaskStatus::Failed;
        snapshot.result_summary = None;
        snapshot.error_detail = Some(OpenCrawlError::from(e).classified_message());

        if let Err(e) = persist(&ctx.storage, &snapshot) {
            tracing::warn!("Failed state of task {} not persisted: {}", task_id, e);
        }
    }

    match ctx.tracker.commit(snapshot) {
        Ok(task) => task.status,
        Err(e) => {
            tracing::error!("Tracker rejected final state of task {}: {}", task_id, e);
            ctx.tracker.status(task_id).unwrap_or(TaskStatus::Failed)
        }
    }
}
