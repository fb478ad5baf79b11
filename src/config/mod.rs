//! Configuration module for OpenCrawl
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use opencrawl::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("opencrawl.toml")).unwrap();
//! println!("Each crawl fans out to {} workers", config.crawler.max_workers);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, OutputConfig, UserAgentConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, config_digest, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
pub(crate) use validation::validate_user_agent;
