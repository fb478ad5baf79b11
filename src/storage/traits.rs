//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::crawler::PageResult;
use crate::state::CrawlTask;
use crate::storage::PageResultRecord;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Page result not found: {0}")]
    PageResultNotFound(i64),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Storage lock poisoned")]
    Poisoned,
}

impl StorageError {
    /// Short class name of the error, without any backend detail
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Database(_) | Self::Sqlite(_) => "database error",
            Self::TaskNotFound(_) => "task not found",
            Self::PageResultNotFound(_) => "page result not found",
            Self::Serialization(_) => "serialization error",
            Self::Io(_) => "I/O error",
            Self::ConstraintViolation(_) => "constraint violation",
            Self::Poisoned => "storage lock poisoned",
        }
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// This trait defines all persistence operations needed by the crawler.
/// Backends are shared behind a mutex, so methods take `&mut self` freely.
pub trait Storage {
    // ===== Task Management =====

    /// Inserts a new crawl task
    fn create_task(&mut self, task: &CrawlTask) -> StorageResult<()>;

    /// Overwrites the mutable fields of a task (status, summary, error, updated_at)
    ///
    /// # Returns
    ///
    /// * `Err(StorageError::TaskNotFound)` - No task with this id exists
    fn update_task(&mut self, task: &CrawlTask) -> StorageResult<()>;

    /// Gets a task by ID
    fn get_task(&self, task_id: &str) -> StorageResult<CrawlTask>;

    /// Gets all tasks, newest first
    fn list_tasks(&self) -> StorageResult<Vec<CrawlTask>>;

    // ===== Page Results =====

    /// Saves the result for one page of a task
    ///
    /// # Arguments
    ///
    /// * `task_id` - The owning task
    /// * `page` - The assembled page result
    ///
    /// # Returns
    ///
    /// The ID of the newly created record
    fn save_page_result(&mut self, task_id: &str, page: &PageResult) -> StorageResult<i64>;

    /// Gets a single page result by ID
    fn get_page_result(&self, id: i64) -> StorageResult<PageResultRecord>;

    /// Gets one page of results for a task, in insertion order
    fn get_page_results(
        &self,
        task_id: &str,
        limit: u32,
        offset: u32,
    ) -> StorageResult<Vec<PageResultRecord>>;

    /// Counts the results saved for a task
    fn count_page_results(&self, task_id: &str) -> StorageResult<u64>;

    // ===== Statistics =====

    /// Gets every result of a task, in insertion order
    fn get_all_page_results(&self, task_id: &str) -> StorageResult<Vec<PageResultRecord>> {
        let count = self.count_page_results(task_id)?;
        let limit = u32::try_from(count).unwrap_or(u32::MAX);
        self.get_page_results(task_id, limit, 0)
    }
}
