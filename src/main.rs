//! OpenCrawl main entry point
//!
//! This is the command-line interface for the OpenCrawl SEO crawler.

use anyhow::{bail, Context};
use clap::Parser;
use opencrawl::config::{load_config_with_hash, Config};
use opencrawl::crawler::{CrawlRequest, CrawlService};
use opencrawl::output::{
    generate_markdown_report, load_report, print_page_results, print_report,
};
use opencrawl::state::TaskStatus;
use opencrawl::storage::{lock_storage, SqliteStorage, Storage};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// OpenCrawl: an on-page SEO crawler
///
/// OpenCrawl crawls a site from a seed URL, follows internal links up to a
/// bounded depth, scores every page against an SEO rubric and stores the
/// results in SQLite.
#[derive(Parser, Debug)]
#[command(name = "opencrawl")]
#[command(version = "1.0.0")]
#[command(about = "An on-page SEO crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Seed URL to crawl
    #[arg(value_name = "URL")]
    url: Option<String>,

    /// Maximum link hops from the seed (defaults to crawler.default-depth)
    #[arg(short, long)]
    depth: Option<u32>,

    /// User-Agent sent with every request (defaults to user-agent.default)
    #[arg(long)]
    user_agent: Option<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long, conflicts_with_all = ["status", "results", "export_report"])]
    dry_run: bool,

    /// Show the status of a task and exit
    #[arg(long, value_name = "TASK_ID", conflicts_with_all = ["results", "export_report"])]
    status: Option<String>,

    /// List the page results of a task and exit
    #[arg(long, value_name = "TASK_ID", conflicts_with = "export_report")]
    results: Option<String>,

    /// Maximum number of results to list
    #[arg(long, default_value_t = 50)]
    limit: u32,

    /// Number of results to skip
    #[arg(long, default_value_t = 0)]
    offset: u32,

    /// Write the markdown report of a task to output.report-path and exit
    #[arg(long, value_name = "TASK_ID")]
    export_report: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    // Handle different modes
    if cli.dry_run {
        handle_dry_run(&config, &cli)
    } else if let Some(task_id) = &cli.status {
        handle_status(&config, task_id)
    } else if let Some(task_id) = &cli.results {
        handle_results(&config, task_id, cli.limit, cli.offset)
    } else if let Some(task_id) = &cli.export_report {
        handle_export_report(&config, task_id)
    } else {
        handle_crawl(&config, &cli).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("opencrawl=info,warn"),
            1 => EnvFilter::new("opencrawl=debug,info"),
            2 => EnvFilter::new("opencrawl=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

fn request_from(cli: &Cli) -> anyhow::Result<CrawlRequest> {
    let Some(url) = &cli.url else {
        bail!("a seed URL is required to start a crawl");
    };

    let mut request = CrawlRequest::new(url.clone());
    request.depth = cli.depth;
    request.user_agent = cli.user_agent.clone();
    Ok(request)
}

fn open_database(config: &Config) -> anyhow::Result<SqliteStorage> {
    SqliteStorage::new(Path::new(&config.output.database_path))
        .with_context(|| format!("Failed to open database {}", config.output.database_path))
}

/// Handles the --dry-run mode: validates config and shows what would be crawled
fn handle_dry_run(config: &Config, cli: &Cli) -> anyhow::Result<()> {
    println!("=== OpenCrawl Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Default depth: {}", config.crawler.default_depth);
    println!("  Workers per task: {}", config.crawler.max_workers);
    println!("  Concurrent tasks: {}", config.crawler.max_concurrent_tasks);
    println!(
        "  Timeouts: {}s request, {}s connect",
        config.crawler.request_timeout_secs, config.crawler.connect_timeout_secs
    );
    println!("  Max redirects: {}", config.crawler.max_redirects);
    println!("  Store raw content: {}", config.crawler.store_raw_content);

    println!("\nUser Agent:");
    println!("  Default: {}", config.user_agent.default);

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);
    println!("  Report: {}", config.output.report_path);

    println!("\n✓ Configuration is valid");

    if cli.url.is_some() {
        let request = request_from(cli)?;
        let seed = opencrawl::url::normalize_url(&request.url)?;
        println!(
            "✓ Would crawl {} to depth {} as {:?}",
            seed,
            request.depth.unwrap_or(config.crawler.default_depth),
            request
                .user_agent
                .as_deref()
                .unwrap_or(&config.user_agent.default)
        );
    }

    Ok(())
}

/// Handles the --status mode: shows one task from the database
fn handle_status(config: &Config, task_id: &str) -> anyhow::Result<()> {
    let storage = open_database(config)?;
    let task = storage
        .get_task(task_id)
        .with_context(|| format!("No task {}", task_id))?;

    println!("Task: {}", task.id);
    println!("  Seed: {}", task.seed_url);
    println!("  Depth: {}", task.depth);
    println!("  User agent: {}", task.user_agent);
    println!("  Status: {}", task.status);
    if let Some(summary) = &task.result_summary {
        println!("  Summary: {}", summary);
    }
    if let Some(detail) = &task.error_detail {
        println!("  Error: {}", detail);
    }
    println!("  Pages saved: {}", storage.count_page_results(task_id)?);
    println!("  Created: {}", task.created_at);
    println!("  Updated: {}", task.updated_at);

    Ok(())
}

/// Handles the --results mode: lists a page of results
fn handle_results(config: &Config, task_id: &str, limit: u32, offset: u32) -> anyhow::Result<()> {
    let storage = open_database(config)?;
    storage
        .get_task(task_id)
        .with_context(|| format!("No task {}", task_id))?;

    let total = storage.count_page_results(task_id)?;
    let results = storage.get_page_results(task_id, limit, offset)?;

    println!(
        "Showing {} of {} results for task {} (offset {})\n",
        results.len(),
        total,
        task_id,
        offset
    );
    print_page_results(&results);

    Ok(())
}

/// Handles the --export-report mode: writes the markdown report of a task
fn handle_export_report(config: &Config, task_id: &str) -> anyhow::Result<()> {
    let storage = open_database(config)?;

    println!("=== Exporting Crawl Report ===\n");
    println!("Database: {}", config.output.database_path);
    println!("Output: {}", config.output.report_path);
    println!();

    tracing::info!("Loading results of task {}...", task_id);
    let report = load_report(&storage, task_id)?;

    generate_markdown_report(&report, Path::new(&config.output.report_path))?;
    println!("✓ Report exported to: {}", config.output.report_path);

    Ok(())
}

/// Handles the main crawl operation
///
/// Ctrl-C sends a stop request; pages already in flight still finish.
async fn handle_crawl(config: &Config, cli: &Cli) -> anyhow::Result<()> {
    let request = request_from(cli)?;
    let service = CrawlService::from_config(config)?;

    let handle = service.start_crawl(request)?;
    let task_id = handle.task_id().to_string();
    println!("Task: {}", task_id);

    let wait = handle.wait();
    tokio::pin!(wait);

    let status = tokio::select! {
        status = &mut wait => status?,
        _ = tokio::signal::ctrl_c() => {
            tracing::warn!("Interrupt received, stopping task {}", task_id);
            service.stop(&task_id)?;
            wait.await?
        }
    };

    let report = {
        let storage = lock_storage(service.storage())?;
        load_report(&*storage, &task_id)?
    };
    println!();
    print_report(&report);

    if status == TaskStatus::Failed {
        bail!(
            "crawl task {} failed: {}",
            task_id,
            report.task.error_detail.as_deref().unwrap_or("unknown error")
        );
    }

    Ok(())
}
