//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with timeouts and a bounded redirect policy
//! - GET requests with a per-task User-Agent
//! - Content-Type checks (only HTML is processed)
//! - Error classification
//!
//! The crawl coordinator only sees the [`Fetcher`] trait, so tests can script
//! responses without a network.

use crate::config::CrawlerConfig;
use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use reqwest::{redirect::Policy, Client};
use std::time::Duration;
use url::Url;

/// Result of a fetch operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchResult {
    /// Successfully fetched an HTML page
    Success {
        /// Final URL after redirects
        final_url: Url,
        /// HTTP status code
        status_code: u16,
        /// Page body content
        body: String,
    },

    /// Page is not HTML (Content-Type mismatch)
    ContentMismatch {
        /// The actual Content-Type received
        content_type: String,
    },

    /// Server answered with a non-success status
    HttpError {
        /// The HTTP status code
        status_code: u16,
    },

    /// Network error (connection refused, timeout, too many redirects, etc.)
    NetworkError {
        /// Error description
        error: String,
    },
}

impl FetchResult {
    /// Returns true if the page can be processed
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Short reason a page was skipped, for logging
    pub fn skip_reason(&self) -> Option<String> {
        match self {
            Self::Success { .. } => None,
            Self::ContentMismatch { content_type } => {
                Some(format!("expected HTML, got {:?}", content_type))
            }
            Self::HttpError { status_code } => Some(format!("HTTP {}", status_code)),
            Self::NetworkError { error } => Some(error.clone()),
        }
    }
}

/// Collaborator that retrieves one page
///
/// Implementations own their timeouts; the coordinator never cancels a fetch
/// in flight.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetches a page, sending the given User-Agent
    async fn fetch(&self, url: &Url, user_agent: &str) -> FetchResult;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - Crawler settings (timeouts, redirect limit)
/// * `default_user_agent` - User-Agent used when a request does not set one
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```
/// use opencrawl::config::parse_config;
/// use opencrawl::crawler::build_http_client;
///
/// let config = parse_config(r#"
///     [crawler]
///     max-workers = 4
///     max-concurrent-tasks = 2
///
///     [output]
///     database-path = "crawl.db"
/// "#).unwrap();
///
/// let client = build_http_client(&config.crawler, &config.user_agent.default).unwrap();
/// ```
pub fn build_http_client(
    config: &CrawlerConfig,
    default_user_agent: &str,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(default_user_agent)
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .redirect(Policy::limited(config.max_redirects as usize))
        .gzip(true)
        .brotli(true)
        .build()
}

/// [`Fetcher`] backed by a shared reqwest client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Creates a fetcher from crawler configuration
    pub fn new(config: &CrawlerConfig, default_user_agent: &str) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(config, default_user_agent)?,
        })
    }

    /// Wraps an already built client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    /// Fetches a URL and classifies the outcome
    ///
    /// | Condition | Result |
    /// |-----------|--------|
    /// | 2xx with `text/html` | Success |
    /// | 2xx with another Content-Type | ContentMismatch |
    /// | Any other status | HttpError |
    /// | Timeout, refused connection, redirect limit | NetworkError |
    async fn fetch(&self, url: &Url, user_agent: &str) -> FetchResult {
        let response = match self
            .client
            .get(url.clone())
            .header(USER_AGENT, user_agent)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return classify_request_error(&e),
        };

        let status = response.status();
        let final_url = response.url().clone();

        if !status.is_success() {
            return FetchResult::HttpError {
                status_code: status.as_u16(),
            };
        }

        // Check Content-Type
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        if !content_type.to_ascii_lowercase().contains("text/html") {
            return FetchResult::ContentMismatch { content_type };
        }

        match response.text().await {
            Ok(body) => FetchResult::Success {
                final_url,
                status_code: status.as_u16(),
                body,
            },
            Err(e) => classify_request_error(&e),
        }
    }
}

fn classify_request_error(e: &reqwest::Error) -> FetchResult {
    let error = if e.is_timeout() {
        "Request timeout".to_string()
    } else if e.is_connect() {
        "Connection refused".to_string()
    } else if e.is_redirect() {
        "Too many redirects".to_string()
    } else {
        e.to_string()
    };
    FetchResult::NetworkError { error }
}
