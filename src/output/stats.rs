//! Report generation from the crawl database
//!
//! This module aggregates the page results of one task and prints them.

use crate::output::OutputResult;
use crate::seo::SeoIssue;
use crate::state::CrawlTask;
use crate::storage::{PageResultRecord, Storage};
use std::collections::HashMap;

/// How many pages of a task carry one issue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IssueCount {
    pub issue: SeoIssue,
    pub pages: u64,
}

/// Aggregated SEO results of one crawl task
#[derive(Debug, Clone)]
pub struct TaskReport {
    /// The task as persisted
    pub task: CrawlTask,

    /// Number of saved page results
    pub pages: u64,

    /// Mean score over all pages; `None` when nothing was saved
    pub average_score: Option<f64>,
    pub min_score: Option<i32>,
    pub max_score: Option<i32>,

    /// Pages without any issue
    pub clean_pages: u64,

    pub total_words: u64,
    pub internal_links: u64,
    pub external_links: u64,

    /// Issue frequencies, most frequent first
    pub issues: Vec<IssueCount>,

    /// Up to five lowest-scoring pages, worst first
    pub worst_pages: Vec<(String, i32)>,
}

impl TaskReport {
    /// Builds a report from a task and its page results
    pub fn from_results(task: CrawlTask, results: &[PageResultRecord]) -> Self {
        let scores: Vec<i32> = results.iter().map(|r| r.seo_score).collect();
        let average_score = if scores.is_empty() {
            None
        } else {
            Some(scores.iter().map(|s| *s as f64).sum::<f64>() / scores.len() as f64)
        };

        let mut frequencies: HashMap<SeoIssue, u64> = HashMap::new();
        let mut clean_pages = 0;
        for record in results {
            let issues = record.issues();
            if issues.is_empty() {
                clean_pages += 1;
            }
            for issue in issues {
                *frequencies.entry(issue).or_insert(0) += 1;
            }
        }

        // Sort by count (descending), then rubric order for ties
        let mut issues: Vec<IssueCount> = SeoIssue::all()
            .into_iter()
            .filter_map(|issue| {
                frequencies
                    .get(&issue)
                    .map(|pages| IssueCount { issue, pages: *pages })
            })
            .collect();
        issues.sort_by(|a, b| b.pages.cmp(&a.pages));

        let mut worst_pages: Vec<(String, i32)> = results
            .iter()
            .map(|r| (r.url.clone(), r.seo_score))
            .collect();
        worst_pages.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
        worst_pages.truncate(5);

        Self {
            task,
            pages: results.len() as u64,
            average_score,
            min_score: scores.iter().min().copied(),
            max_score: scores.iter().max().copied(),
            clean_pages,
            total_words: results.iter().map(|r| r.word_count).sum(),
            internal_links: results.iter().map(|r| r.internal_links).sum(),
            external_links: results.iter().map(|r| r.external_links).sum(),
            issues,
            worst_pages,
        }
    }
}

/// Loads a report for one task from storage
///
/// # Arguments
///
/// * `storage` - The storage backend to query
/// * `task_id` - The task to report on
///
/// # Returns
///
/// * `Ok(TaskReport)` - Successfully aggregated report
/// * `Err(OutputError)` - The task is unknown or the query failed
pub fn load_report(storage: &dyn Storage, task_id: &str) -> OutputResult<TaskReport> {
    let task = storage.get_task(task_id)?;
    let results = storage.get_all_page_results(task_id)?;
    Ok(TaskReport::from_results(task, &results))
}

/// Prints a report to stdout in a formatted manner
///
/// # Arguments
///
/// * `report` - The report to display
pub fn print_report(report: &TaskReport) {
    println!("=== Crawl Report ===\n");

    println!("Task:");
    println!("  ID: {}", report.task.id);
    println!("  Seed: {}", report.task.seed_url);
    println!("  Depth: {}", report.task.depth);
    println!("  Status: {}", report.task.status);
    if let Some(summary) = &report.task.result_summary {
        println!("  Summary: {}", summary);
    }
    if let Some(detail) = &report.task.error_detail {
        println!("  Error: {}", detail);
    }
    println!();

    println!("Overview:");
    println!("  Pages analyzed: {}", report.pages);
    match (report.average_score, report.min_score, report.max_score) {
        (Some(avg), Some(min), Some(max)) => {
            println!("  SEO score: avg {:.1}, min {}, max {}", avg, min, max);
        }
        _ => println!("  SEO score: n/a"),
    }
    println!("  Pages without issues: {}", report.clean_pages);
    println!("  Words: {}", report.total_words);
    println!(
        "  Links: {} internal, {} external",
        report.internal_links, report.external_links
    );
    println!();

    if !report.issues.is_empty() {
        println!("Issues:");
        for count in &report.issues {
            let percentage = (count.pages as f64 / report.pages as f64) * 100.0;
            println!("  {}: {} ({:.1}%)", count.issue, count.pages, percentage);
        }
        println!();
    }

    if !report.worst_pages.is_empty() {
        println!("Lowest scores:");
        for (url, score) in &report.worst_pages {
            println!("  {:>4}  {}", score, url);
        }
    }
}

/// Prints a listing of page results
pub fn print_page_results(results: &[PageResultRecord]) {
    if results.is_empty() {
        println!("No results.");
        return;
    }

    for record in results {
        println!("[{}] {}", record.id, record.url);
        println!("  Title: {}", record.title);
        println!("  Meta description: {}", record.meta_description);
        println!("  H1: {}", record.headings[0]);
        println!(
            "  Words: {}, links: {} internal / {} external, load time: {:.2}s",
            record.word_count, record.internal_links, record.external_links, record.load_time
        );
        println!("  SEO: {} ({})", record.seo_score, record.seo_evaluation);
    }
}
