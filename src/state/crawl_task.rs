//! Crawl task record

use crate::state::TaskStatus;
use chrono::Utc;
use uuid::Uuid;

/// The identity and outcome of one crawl
///
/// Timestamps are RFC 3339 strings, the same form they take in the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlTask {
    /// Opaque unique identifier
    pub id: String,

    /// URL the crawl starts from; also the base for link classification
    pub seed_url: String,

    /// Maximum number of hops from the seed
    pub depth: u32,

    /// User-Agent header sent with every fetch of this task
    pub user_agent: String,

    pub status: TaskStatus,

    /// Human-readable outcome of a completed crawl
    pub result_summary: Option<String>,

    /// Classified failure message of a failed crawl
    pub error_detail: Option<String>,

    pub created_at: String,
    pub updated_at: String,
}

impl CrawlTask {
    /// Creates a new pending task with a freshly generated id
    ///
    /// # Arguments
    ///
    /// * `seed_url` - The URL the crawl starts from
    /// * `depth` - Maximum number of hops from the seed
    /// * `user_agent` - User-Agent to send on every request
    pub fn new(seed_url: impl Into<String>, depth: u32, user_agent: impl Into<String>) -> Self {
        let now = Utc::now().to_rfc3339();
        Self {
            id: Uuid::new_v4().to_string(),
            seed_url: seed_url.into(),
            depth,
            user_agent: user_agent.into(),
            status: TaskStatus::Pending,
            result_summary: None,
            error_detail: None,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// Refreshes `updated_at` to the current time
    pub fn touch(&mut self) {
        self.updated_at = Utc::now().to_rfc3339();
    }
}
