//! Storage module for persisting crawl data
//!
//! This module is the persistence sink for the crawler:
//! - SQLite database initialization and schema management
//! - Crawl task records and their status history
//! - One page result per (task, URL)
//! - Paginated result queries for the reporting boundary

mod schema;
mod sqlite;
mod traits;

pub use sqlite::{init_database, SqliteStorage};
pub use traits::{Storage, StorageError, StorageResult};

use crate::extract::HeadingLevel;
use crate::seo::{SeoIssue, NO_ISSUES};

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

/// Storage handle shared by the dispatch boundary and every crawl worker
pub type SharedStorage = Arc<Mutex<dyn Storage + Send>>;

/// Wraps a storage backend for sharing across tasks
pub fn share<S: Storage + Send + 'static>(storage: S) -> SharedStorage {
    Arc::new(Mutex::new(storage))
}

/// Locks shared storage, mapping a poisoned lock to a storage error
pub fn lock_storage(storage: &SharedStorage) -> StorageResult<MutexGuard<'_, dyn Storage + Send + 'static>> {
    storage.lock().map_err(|_| StorageError::Poisoned)
}

/// Initializes or opens a storage database
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
///
/// # Returns
///
/// * `Ok(SqliteStorage)` - Successfully initialized storage
/// * `Err(StorageError)` - Failed to initialize storage
pub fn open_storage(path: &Path) -> StorageResult<SqliteStorage> {
    SqliteStorage::new(path)
}

/// Represents a persisted page result
#[derive(Debug, Clone, PartialEq)]
pub struct PageResultRecord {
    pub id: i64,
    pub task_id: String,
    pub url: String,
    pub title: String,
    pub meta_description: String,
    pub headings: [String; 6],
    /// Alt texts joined with ", "
    pub alt_texts: String,
    pub word_count: u64,
    pub internal_links: u64,
    pub external_links: u64,
    /// Issue labels joined with ", ", or "No Issues"
    pub seo_evaluation: String,
    pub seo_score: i32,
    pub raw_content: Option<String>,
    pub load_time: f64,
    pub created_at: String,
}

impl PageResultRecord {
    /// Heading text for one level
    pub fn heading(&self, level: HeadingLevel) -> &str {
        &self.headings[level.number() - 1]
    }

    /// Parses the stored evaluation back into issues
    ///
    /// Unknown labels are skipped.
    pub fn issues(&self) -> Vec<SeoIssue> {
        if self.seo_evaluation == NO_ISSUES {
            return Vec::new();
        }
        self.seo_evaluation
            .split(", ")
            .filter_map(SeoIssue::from_label)
            .collect()
    }
}
