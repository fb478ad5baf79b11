//! Output module for crawl reports
//!
//! This module handles:
//! - Aggregating a task's page results into a report
//! - Printing reports and result listings to stdout
//! - Exporting reports as markdown

mod error;
mod markdown;
pub mod stats;

pub use error::{OutputError, OutputResult};
pub use markdown::{format_markdown_report, generate_markdown_report};
pub use stats::{load_report, print_page_results, print_report, IssueCount, TaskReport};
