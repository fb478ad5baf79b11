//! State module for tracking crawl tasks
//!
//! This module provides the task lifecycle used by the dispatch boundary and
//! the crawl coordinator.
//!
//! # Components
//!
//! - `TaskStatus`: The lifecycle states of a crawl task
//! - `CrawlTask`: The persisted identity and outcome of one crawl
//! - `TaskTracker`: In-process registry that owns status transitions and stop signals

mod crawl_task;
mod task_status;
mod tracker;

// Re-export main types
pub use crawl_task::CrawlTask;
pub use task_status::TaskStatus;
pub use tracker::{StopOutcome, TaskError, TaskTracker};
