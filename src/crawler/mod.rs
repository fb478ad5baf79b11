//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching behind the [`Fetcher`] trait
//! - Assembling per-page results
//! - Per-task crawl coordination with a bounded worker pool
//! - The dispatch boundary that starts, queries and stops tasks

mod coordinator;
mod dispatch;
mod fetcher;
mod page;

pub use coordinator::{classify_links, CrawlContext, CrawlStats, Coordinator};
pub use dispatch::{CrawlHandle, CrawlRequest, CrawlService};
pub use fetcher::{build_http_client, FetchResult, Fetcher, HttpFetcher};
pub use page::{LinkCounts, PageResult};

use crate::config::Config;
use crate::OpenCrawlError;

/// Runs a single crawl to completion
///
/// This is the simplest entry point. It will:
/// 1. Open the configured database
/// 2. Build the HTTP client
/// 3. Accept the request as a new task
/// 4. Wait for the task to reach a terminal status
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `request` - What to crawl
///
/// # Returns
///
/// * `Ok(CrawlTask)` - The finished task, as persisted
/// * `Err(OpenCrawlError)` - The request was rejected or the service could not start
pub async fn crawl(
    config: &Config,
    request: CrawlRequest,
) -> Result<crate::state::CrawlTask, OpenCrawlError> {
    let service = CrawlService::from_config(config)?;
    let handle = service.start_crawl(request)?;
    let task_id = handle.task_id().to_string();
    handle.wait().await?;
    service.status(&task_id)
}
