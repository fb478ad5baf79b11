//! In-process task registry
//!
//! The tracker is the single source of truth for task status at the dispatch
//! boundary. Every transition goes through one mutex, so readers always see the
//! latest committed status and illegal transitions are rejected atomically.
//!
//! Terminal transitions are two-phase: [`TaskTracker::prepare`] returns the
//! snapshot a transition would produce without applying it, the caller persists
//! that snapshot, and [`TaskTracker::commit`] applies it. A status visible here
//! is therefore never ahead of the database.

use crate::state::{CrawlTask, TaskStatus};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use thiserror::Error;
use tokio::sync::watch;

/// Errors raised by task lifecycle operations
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("Task not found: {0}")]
    NotFound(String),

    #[error("Invalid transition for task {id}: {from} -> {to}")]
    InvalidTransition {
        id: String,
        from: TaskStatus,
        to: TaskStatus,
    },

    #[error("Task is already running: {0}")]
    AlreadyRunning(String),

    #[error("Task already registered: {0}")]
    Duplicate(String),
}

/// Result type for task lifecycle operations
pub type TaskResult<T> = Result<T, TaskError>;

/// What a stop request did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopOutcome {
    /// The task had not started; its signal is raised but it is still pending
    /// until the caller persists and commits the stopped state
    NotStarted,

    /// The running task was signalled and will stop at its next dequeue
    Signalled,

    /// The task had already finished; nothing changed
    AlreadyTerminal(TaskStatus),
}

struct TrackedTask {
    task: CrawlTask,
    stop: watch::Sender<bool>,
}

/// Registry of crawl tasks known to this process
#[derive(Default)]
pub struct TaskTracker {
    tasks: Mutex<HashMap<String, TrackedTask>>,
}

impl TaskTracker {
    /// Creates an empty tracker
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, TrackedTask>> {
        // Every mutation below completes before the guard drops, so a poisoned
        // map is still consistent
        self.tasks.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Registers a new task
    ///
    /// # Returns
    ///
    /// * `Ok(())` - Task registered
    /// * `Err(TaskError::Duplicate)` - A task with this id is already tracked
    pub fn register(&self, task: CrawlTask) -> TaskResult<()> {
        let mut tasks = self.lock();
        if tasks.contains_key(&task.id) {
            return Err(TaskError::Duplicate(task.id));
        }

        let (stop, _) = watch::channel(false);
        tracing::debug!("Registered task {} ({})", task.id, task.status);
        tasks.insert(task.id.clone(), TrackedTask { task, stop });
        Ok(())
    }

    /// Returns a snapshot of a task
    pub fn get(&self, id: &str) -> TaskResult<CrawlTask> {
        self.lock()
            .get(id)
            .map(|tracked| tracked.task.clone())
            .ok_or_else(|| TaskError::NotFound(id.to_string()))
    }

    /// Returns the current status of a task
    pub fn status(&self, id: &str) -> TaskResult<TaskStatus> {
        self.lock()
            .get(id)
            .map(|tracked| tracked.task.status)
            .ok_or_else(|| TaskError::NotFound(id.to_string()))
    }

    /// Returns true if the task is known to this tracker
    pub fn contains(&self, id: &str) -> bool {
        self.lock().contains_key(id)
    }

    /// Opens the single in-progress window of a task
    ///
    /// Moves the task from pending to in_progress and hands back the snapshot
    /// plus a receiver for its stop signal.
    ///
    /// # Returns
    ///
    /// * `Err(TaskError::AlreadyRunning)` - Another run holds the window
    /// * `Err(TaskError::InvalidTransition)` - The task is no longer pending
    pub fn begin_run(&self, id: &str) -> TaskResult<(CrawlTask, watch::Receiver<bool>)> {
        let mut tasks = self.lock();
        let tracked = tasks
            .get_mut(id)
            .ok_or_else(|| TaskError::NotFound(id.to_string()))?;

        if tracked.task.status == TaskStatus::InProgress {
            return Err(TaskError::AlreadyRunning(id.to_string()));
        }
        check_transition(&tracked.task, TaskStatus::InProgress)?;

        tracked.task.status = TaskStatus::InProgress;
        tracked.task.touch();
        tracing::debug!("Task {} is now in_progress", id);

        Ok((tracked.task.clone(), tracked.stop.subscribe()))
    }

    /// Builds the snapshot a transition would produce, without applying it
    pub fn prepare(&self, id: &str, to: TaskStatus) -> TaskResult<CrawlTask> {
        let tasks = self.lock();
        let tracked = tasks
            .get(id)
            .ok_or_else(|| TaskError::NotFound(id.to_string()))?;
        check_transition(&tracked.task, to)?;

        let mut snapshot = tracked.task.clone();
        snapshot.status = to;
        snapshot.touch();
        Ok(snapshot)
    }

    /// Applies a snapshot produced by [`prepare`](Self::prepare)
    ///
    /// The transition is re-checked against the current status, so a snapshot
    /// can only be committed once.
    pub fn commit(&self, snapshot: CrawlTask) -> TaskResult<CrawlTask> {
        let mut tasks = self.lock();
        let tracked = tasks
            .get_mut(&snapshot.id)
            .ok_or_else(|| TaskError::NotFound(snapshot.id.clone()))?;
        check_transition(&tracked.task, snapshot.status)?;

        tracing::debug!(
            "Task {}: {} -> {}",
            snapshot.id,
            tracked.task.status,
            snapshot.status
        );
        tracked.task = snapshot;
        Ok(tracked.task.clone())
    }

    /// Applies a snapshot only if the task is still in `from`
    ///
    /// Used where another party may move the task between
    /// [`prepare`](Self::prepare) and the commit.
    pub fn commit_from(&self, from: TaskStatus, snapshot: CrawlTask) -> TaskResult<CrawlTask> {
        let mut tasks = self.lock();
        let tracked = tasks
            .get_mut(&snapshot.id)
            .ok_or_else(|| TaskError::NotFound(snapshot.id.clone()))?;

        if tracked.task.status != from {
            return Err(TaskError::InvalidTransition {
                id: snapshot.id,
                from: tracked.task.status,
                to: snapshot.status,
            });
        }
        check_transition(&tracked.task, snapshot.status)?;

        tracing::debug!("Task {}: {} -> {}", snapshot.id, from, snapshot.status);
        tracked.task = snapshot;
        Ok(tracked.task.clone())
    }

    /// Prepares and commits a transition in one step
    pub fn transition(&self, id: &str, to: TaskStatus) -> TaskResult<CrawlTask> {
        let snapshot = self.prepare(id, to)?;
        self.commit(snapshot)
    }

    /// Requests that a task stop
    ///
    /// Every live task has its stop signal raised. The status itself is not
    /// changed here: a running task keeps in_progress until the crawl observes
    /// the signal, and a pending task stays pending until the caller has
    /// persisted the stopped state. A finished task is left untouched.
    pub fn request_stop(&self, id: &str) -> TaskResult<StopOutcome> {
        let mut tasks = self.lock();
        let tracked = tasks
            .get_mut(id)
            .ok_or_else(|| TaskError::NotFound(id.to_string()))?;

        match tracked.task.status {
            TaskStatus::Pending => {
                tracked.stop.send_replace(true);
                tracing::info!("Stop requested for task {} before it started", id);
                Ok(StopOutcome::NotStarted)
            }
            TaskStatus::InProgress => {
                tracked.stop.send_replace(true);
                tracing::info!("Stop requested for task {}", id);
                Ok(StopOutcome::Signalled)
            }
            terminal => Ok(StopOutcome::AlreadyTerminal(terminal)),
        }
    }

    /// Returns true if a stop has been requested for the task
    pub fn stop_requested(&self, id: &str) -> bool {
        self.lock()
            .get(id)
            .map(|tracked| *tracked.stop.borrow())
            .unwrap_or(false)
    }
}

fn check_transition(task: &CrawlTask, to: TaskStatus) -> TaskResult<()> {
    if task.status.can_transition_to(to) {
        Ok(())
    } else {
        Err(TaskError::InvalidTransition {
            id: task.id.clone(),
            from: task.status,
            to,
        })
    }
}
