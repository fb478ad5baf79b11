//! OpenCrawl: a site crawler that scores pages for on-page SEO
//!
//! This crate crawls a website from a seed URL, follows internal links up to a
//! bounded depth, extracts on-page SEO signals from every page, scores them, and
//! persists one result per page under a crawl task identity.

pub mod config;
pub mod crawler;
pub mod extract;
pub mod frontier;
pub mod output;
pub mod seo;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for OpenCrawl operations
#[derive(Debug, Error)]
pub enum OpenCrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Task error: {0}")]
    Task(#[from] state::TaskError),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("Worker failed: {0}")]
    Worker(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl OpenCrawlError {
    /// Returns a message that is safe to show at the status boundary
    ///
    /// Only the class of failure and its top-level reason are kept; no source
    /// chains or debug representations.
    pub fn classified_message(&self) -> String {
        match self {
            Self::Config(e) => format!("Configuration error: {}", e),
            Self::Reqwest(_) => "HTTP client unavailable".to_string(),
            Self::Storage(e) => format!("Persistence sink unavailable: {}", e.kind()),
            Self::Task(e) => format!("Task state error: {}", e),
            Self::Url(e) => format!("Invalid URL: {}", e),
            Self::Worker(_) => "Crawl worker terminated unexpectedly".to_string(),
            Self::Io(_) => "I/O failure".to_string(),
        }
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Result type alias for OpenCrawl operations
pub type Result<T> = std::result::Result<T, OpenCrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlHandle, CrawlRequest, CrawlService};
pub use extract::{extract, ExtractedContent};
pub use frontier::{Frontier, FrontierEntry};
pub use seo::{evaluate, SeoEvaluation, SeoIssue};
pub use state::{CrawlTask, TaskStatus, TaskTracker};
pub use crate::url::{classify, resolve, LinkKind};
