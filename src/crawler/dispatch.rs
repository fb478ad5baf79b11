//! Dispatch boundary for crawl tasks
//!
//! [`CrawlService`] accepts crawl requests, answers status queries and relays
//! stop requests. Each accepted request becomes a pending task that runs on
//! its own tokio task once one of the configured task slots is free.

use crate::config::{validate_user_agent, Config, CrawlerConfig};
use crate::crawler::coordinator::{finalize, CrawlContext, Coordinator};
use crate::crawler::{Fetcher, HttpFetcher};
use crate::state::{CrawlTask, StopOutcome, TaskError, TaskStatus, TaskTracker};
use crate::storage::{lock_storage, share, PageResultRecord, SharedStorage, SqliteStorage, StorageError};
use crate::url::normalize_url;
use crate::OpenCrawlError;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

/// A request to crawl a site
#[derive(Debug, Clone, Default)]
pub struct CrawlRequest {
    /// Seed URL; must be http or https
    pub url: String,

    /// Maximum hops from the seed; the configured default when absent
    pub depth: Option<u32>,

    /// User-Agent for every fetch; the configured default when absent
    pub user_agent: Option<String>,
}

impl CrawlRequest {
    /// Creates a request that uses the configured depth and user agent
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn with_depth(mut self, depth: u32) -> Self {
        self.depth = Some(depth);
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }
}

/// Handle to an accepted crawl
#[derive(Debug)]
pub struct CrawlHandle {
    task_id: String,
    join: JoinHandle<TaskStatus>,
}

impl CrawlHandle {
    /// Identifier of the accepted task
    pub fn task_id(&self) -> &str {
        &self.task_id
    }

    /// Waits for the task to reach a terminal status
    pub async fn wait(self) -> Result<TaskStatus, OpenCrawlError> {
        self.join
            .await
            .map_err(|e| OpenCrawlError::Worker(e.to_string()))
    }
}

/// Accepts crawl requests and exposes task status
pub struct CrawlService {
    config: CrawlerConfig,
    default_user_agent: String,
    ctx: CrawlContext,
    task_slots: Arc<Semaphore>,
}

impl CrawlService {
    /// Creates a service over the given storage and fetcher
    ///
    /// # Arguments
    ///
    /// * `config` - Loaded configuration
    /// * `storage` - Persistence sink for tasks and page results
    /// * `fetcher` - Page fetch collaborator
    pub fn new(config: &Config, storage: SharedStorage, fetcher: Arc<dyn Fetcher>) -> Self {
        let ctx = CrawlContext {
            fetcher,
            storage,
            tracker: Arc::new(TaskTracker::new()),
            max_workers: config.crawler.max_workers as usize,
            store_raw_content: config.crawler.store_raw_content,
        };

        Self {
            config: config.crawler.clone(),
            default_user_agent: config.user_agent.default.clone(),
            ctx,
            task_slots: Arc::new(Semaphore::new(config.crawler.max_concurrent_tasks as usize)),
        }
    }

    /// Creates a service backed by the configured SQLite database and a real HTTP client
    pub fn from_config(config: &Config) -> Result<Self, OpenCrawlError> {
        let storage = SqliteStorage::new(Path::new(&config.output.database_path))?;
        let fetcher = HttpFetcher::new(&config.crawler, &config.user_agent.default)?;
        Ok(Self::new(config, share(storage), Arc::new(fetcher)))
    }

    /// The in-process task tracker
    pub fn tracker(&self) -> &Arc<TaskTracker> {
        &self.ctx.tracker
    }

    /// The persistence sink
    pub fn storage(&self) -> &SharedStorage {
        &self.ctx.storage
    }

    /// Accepts a crawl request
    ///
    /// The task is persisted and registered as pending before this returns;
    /// the crawl itself runs in the background on the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlHandle)` - The task was accepted
    /// * `Err(OpenCrawlError::Url)` - The seed URL is not crawlable
    /// * `Err(OpenCrawlError::Config)` - The user agent is not a valid header value
    /// * `Err(OpenCrawlError::Storage)` - The task could not be persisted
    pub fn start_crawl(&self, request: CrawlRequest) -> Result<CrawlHandle, OpenCrawlError> {
        let seed = normalize_url(&request.url)?;
        let depth = request.depth.unwrap_or(self.config.default_depth);
        let user_agent = request
            .user_agent
            .unwrap_or_else(|| self.default_user_agent.clone());
        validate_user_agent(&user_agent)?;

        let task = CrawlTask::new(seed.as_str(), depth, user_agent);
        lock_storage(&self.ctx.storage)?.create_task(&task)?;
        self.ctx.tracker.register(task.clone())?;

        tracing::info!(
            "Accepted crawl task {} for {} (depth {})",
            task.id,
            task.seed_url,
            task.depth
        );

        let join = tokio::spawn(run_task(
            self.ctx.clone(),
            Arc::clone(&self.task_slots),
            task.id.clone(),
        ));

        Ok(CrawlHandle {
            task_id: task.id,
            join,
        })
    }

    /// Returns the current state of a task
    ///
    /// Tasks not tracked by this process are looked up in storage.
    pub fn status(&self, task_id: &str) -> Result<CrawlTask, OpenCrawlError> {
        match self.ctx.tracker.get(task_id) {
            Ok(task) => Ok(task),
            Err(TaskError::NotFound(_)) => self.stored_task(task_id),
            Err(e) => Err(e.into()),
        }
    }

    /// Requests that a task stop
    ///
    /// # Returns
    ///
    /// * `Ok(TaskStatus::Stopped)` - The task had not started and is now stopped
    /// * `Ok(TaskStatus::InProgress)` - The running task was signalled
    /// * `Ok(status)` - The task had already finished with `status`
    /// * `Err(OpenCrawlError::Storage)` - The stopped state of a pending task
    ///   could not be written; the task stays pending with its signal raised
    pub fn stop(&self, task_id: &str) -> Result<TaskStatus, OpenCrawlError> {
        match self.ctx.tracker.request_stop(task_id) {
            Ok(StopOutcome::NotStarted) => self.stop_pending(task_id),
            Ok(StopOutcome::Signalled) => Ok(TaskStatus::InProgress),
            Ok(StopOutcome::AlreadyTerminal(status)) => {
                tracing::debug!("Stop for finished task {} ignored ({})", task_id, status);
                Ok(status)
            }
            // Not running in this process: report what storage knows
            Err(TaskError::NotFound(_)) => Ok(self.stored_task(task_id)?.status),
            Err(e) => Err(e.into()),
        }
    }

    /// Returns one page of a task's results
    pub fn results(
        &self,
        task_id: &str,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<PageResultRecord>, OpenCrawlError> {
        self.status(task_id)?;
        let storage = lock_storage(&self.ctx.storage)?;
        Ok(storage.get_page_results(task_id, limit, offset)?)
    }

    /// Returns a single page result by ID
    pub fn result(&self, result_id: i64) -> Result<PageResultRecord, OpenCrawlError> {
        let storage = lock_storage(&self.ctx.storage)?;
        Ok(storage.get_page_result(result_id)?)
    }

    /// Moves a pending task to stopped, database first
    ///
    /// The storage lock is held across the write and the commit. If the run
    /// window opens in between, the commit is refused and the run stops itself
    /// on the raised signal.
    fn stop_pending(&self, task_id: &str) -> Result<TaskStatus, OpenCrawlError> {
        let tracker = &self.ctx.tracker;
        let mut storage = lock_storage(&self.ctx.storage)?;

        let status = tracker.status(task_id)?;
        if status != TaskStatus::Pending {
            // Already running or finished; the raised signal takes it from here
            return Ok(status);
        }

        let mut snapshot = tracker.prepare(task_id, TaskStatus::Stopped)?;
        snapshot.result_summary = Some(format!(
            "Crawl stopped for {} before it started",
            snapshot.seed_url
        ));

        if let Err(e) = storage.update_task(&snapshot) {
            tracing::error!(
                "Failed to persist stopped state of task {}: {}",
                task_id,
                e
            );
            return Err(e.into());
        }

        match tracker.commit_from(TaskStatus::Pending, snapshot) {
            Ok(task) => {
                tracing::info!("Task {} stopped before it started", task_id);
                Ok(task.status)
            }
            Err(TaskError::InvalidTransition { from, .. }) => {
                tracing::info!("Task {} started before the stop was committed", task_id);
                Ok(from)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn stored_task(&self, task_id: &str) -> Result<CrawlTask, OpenCrawlError> {
        let storage = lock_storage(&self.ctx.storage)?;
        match storage.get_task(task_id) {
            Ok(task) => Ok(task),
            Err(StorageError::TaskNotFound(id)) => Err(TaskError::NotFound(id).into()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Background body of one accepted task
///
/// Waits for a task slot, opens the task's run window, persists the
/// in_progress state and hands over to the coordinator.
async fn run_task(ctx: CrawlContext, slots: Arc<Semaphore>, task_id: String) -> TaskStatus {
    let _permit = match slots.acquire_owned().await {
        Ok(permit) => permit,
        Err(e) => {
            tracing::error!("Task slots unavailable for {}: {}", task_id, e);
            return ctx.tracker.status(&task_id).unwrap_or(TaskStatus::Failed);
        }
    };

    let (task, stop_rx) = match ctx.tracker.begin_run(&task_id) {
        Ok(run) => run,
        Err(TaskError::InvalidTransition { from, .. }) => {
            tracing::info!("Task {} is {} and will not run", task_id, from);
            return from;
        }
        Err(e) => {
            tracing::warn!("Task {} not started: {}", task_id, e);
            return ctx.tracker.status(&task_id).unwrap_or(TaskStatus::Failed);
        }
    };

    let persisted = lock_storage(&ctx.storage).and_then(|mut s| s.update_task(&task));
    if let Err(e) = persisted {
        tracing::error!("Failed to persist start of task {}: {}", task_id, e);
        let detail = OpenCrawlError::from(e).classified_message();
        return finalize(&ctx, &task_id, TaskStatus::Failed, None, Some(detail));
    }

    match Coordinator::new(task, stop_rx, ctx.clone()) {
        Ok(coordinator) => coordinator.run().await,
        Err(e) => finalize(
            &ctx,
            &task_id,
            TaskStatus::Failed,
            None,
            Some(e.classified_message()),
        ),
    }
}
