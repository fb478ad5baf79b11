use serde::Deserialize;

/// Main configuration structure for OpenCrawl
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Depth used when a crawl request does not name one
    #[serde(rename = "default-depth", default = "default_depth")]
    pub default_depth: u32,

    /// Maximum number of concurrent page fetches within one crawl task
    #[serde(rename = "max-workers")]
    pub max_workers: u32,

    /// Maximum number of crawl tasks running at the same time
    #[serde(rename = "max-concurrent-tasks")]
    pub max_concurrent_tasks: u32,

    /// Timeout for a single page fetch (seconds)
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Timeout for establishing a connection (seconds)
    #[serde(rename = "connect-timeout-secs", default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Maximum redirect hops followed for one page
    #[serde(rename = "max-redirects", default = "default_max_redirects")]
    pub max_redirects: u32,

    /// Whether the raw HTML of each page is persisted with its result
    #[serde(rename = "store-raw-content", default = "default_store_raw")]
    pub store_raw_content: bool,
}

/// User agent configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// User agent sent when a crawl request does not name one
    #[serde(rename = "default", default = "default_user_agent")]
    pub default: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            default: default_user_agent(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,

    /// Path to the markdown report file
    #[serde(rename = "report-path", default = "default_report_path")]
    pub report_path: String,
}

fn default_depth() -> u32 {
    1
}

fn default_request_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_max_redirects() -> u32 {
    5
}

fn default_store_raw() -> bool {
    true
}

fn default_user_agent() -> String {
    "CrawlBot".to_string()
}

fn default_report_path() -> String {
    "./report.md".to_string()
}
