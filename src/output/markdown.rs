//! Markdown report generation
//!
//! This module renders a [`TaskReport`] as a human-readable markdown document.

use crate::output::{OutputResult, TaskReport};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes a task report as markdown
///
/// # Arguments
///
/// * `report` - The aggregated task report
/// * `output_path` - Path where the markdown file should be written
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote the report
/// * `Err(OutputError)` - Failed to write the report
pub fn generate_markdown_report(report: &TaskReport, output_path: &Path) -> OutputResult<()> {
    let markdown = format_markdown_report(report);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a task report as markdown
pub fn format_markdown_report(report: &TaskReport) -> String {
    let mut md = String::new();

    md.push_str("# OpenCrawl SEO Report\n\n");

    // Task metadata
    md.push_str("## Task Information\n\n");
    md.push_str(&format!("- **Task ID**: {}\n", report.task.id));
    md.push_str(&format!("- **Seed URL**: {}\n", report.task.seed_url));
    md.push_str(&format!("- **Depth**: {}\n", report.task.depth));
    md.push_str(&format!("- **User Agent**: {}\n", report.task.user_agent));
    md.push_str(&format!("- **Status**: {}\n", report.task.status));
    md.push_str(&format!("- **Created**: {}\n", report.task.created_at));
    md.push_str(&format!("- **Updated**: {}\n", report.task.updated_at));
    if let Some(summary) = &report.task.result_summary {
        md.push_str(&format!("- **Summary**: {}\n", summary));
    }
    if let Some(detail) = &report.task.error_detail {
        md.push_str(&format!("- **Error**: {}\n", detail));
    }
    md.push('\n');

    // Overall statistics
    md.push_str("## Overall Statistics\n\n");
    md.push_str(&format!("- **Pages Analyzed**: {}\n", report.pages));
    if let (Some(avg), Some(min), Some(max)) =
        (report.average_score, report.min_score, report.max_score)
    {
        md.push_str(&format!("- **Average Score**: {:.1}\n", avg));
        md.push_str(&format!("- **Score Range**: {} to {}\n", min, max));
    }
    md.push_str(&format!(
        "- **Pages Without Issues**: {}\n",
        report.clean_pages
    ));
    md.push_str(&format!("- **Total Words**: {}\n", report.total_words));
    md.push_str(&format!(
        "- **Links**: {} internal, {} external\n\n",
        report.internal_links, report.external_links
    ));

    // Issue breakdown
    if !report.issues.is_empty() {
        md.push_str("## Issue Breakdown\n\n");
        md.push_str("| Issue | Pages | Penalty |\n");
        md.push_str("|-------|-------|---------|\n");
        for count in &report.issues {
            md.push_str(&format!(
                "| {} | {} | -{} |\n",
                count.issue,
                count.pages,
                count.issue.penalty()
            ));
        }
        md.push('\n');
    }

    // Lowest scoring pages
    if !report.worst_pages.is_empty() {
        md.push_str("## Lowest Scoring Pages\n\n");
        md.push_str("| URL | Score |\n");
        md.push_str("|-----|-------|\n");
        for (url, score) in &report.worst_pages {
            md.push_str(&format!("| {} | {} |\n", url, score));
        }
        md.push('\n');
    }

    md
}
