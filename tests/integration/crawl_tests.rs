//! Integration tests for the crawler
//!
//! The end-to-end tests use wiremock to serve real HTTP. The orchestration
//! tests use scripted fetchers so that link graphs, failures and stop timing
//! are deterministic.

use async_trait::async_trait;
use opencrawl::config::{parse_config, Config};
use opencrawl::crawler::{crawl, CrawlRequest, CrawlService, FetchResult, Fetcher, PageResult};
use opencrawl::extract::HeadingLevel;
use opencrawl::state::{CrawlTask, TaskError, TaskStatus};
use opencrawl::storage::{
    lock_storage, share, PageResultRecord, SharedStorage, SqliteStorage, Storage, StorageError,
    StorageResult,
};
use opencrawl::OpenCrawlError;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Semaphore;
use url::Url;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration
fn create_test_config(db_path: &str, max_workers: u32, max_concurrent_tasks: u32) -> Config {
    parse_config(&format!(
        r#"
        [crawler]
        default-depth = 1
        max-workers = {}
        max-concurrent-tasks = {}
        request-timeout-secs = 5
        connect-timeout-secs = 2

        [user-agent]
        default = "TestBot/1.0"

        [output]
        database-path = "{}"
        "#,
        max_workers, max_concurrent_tasks, db_path
    ))
    .expect("test config should parse")
}

fn html_page(title: &str, body: &str) -> String {
    format!(
        "<html><head><title>{}</title></head><body>{}</body></html>",
        title, body
    )
}

/// Fetcher that serves pages from a fixed map and records every fetch
///
/// URLs missing from the map answer 404. When a gate is set, every fetch
/// except the first waits for a permit before answering.
#[derive(Default)]
struct ScriptedFetcher {
    pages: HashMap<String, String>,
    redirects: HashMap<String, String>,
    fetched: Mutex<Vec<String>>,
    gate: Option<Arc<Semaphore>>,
}

impl ScriptedFetcher {
    fn new(pages: &[(&str, String)]) -> Self {
        Self {
            pages: pages
                .iter()
                .map(|(url, body)| (url.to_string(), body.clone()))
                .collect(),
            ..Default::default()
        }
    }

    fn with_gate(mut self, gate: Arc<Semaphore>) -> Self {
        self.gate = Some(gate);
        self
    }

    fn with_redirect(mut self, from: &str, to: &str) -> Self {
        self.redirects.insert(from.to_string(), to.to_string());
        self
    }

    fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }

    fn fetch_count(&self, url: &str) -> usize {
        self.fetched().iter().filter(|u| u.as_str() == url).count()
    }
}

#[async_trait]
impl Fetcher for ScriptedFetcher {
    async fn fetch(&self, url: &Url, _user_agent: &str) -> FetchResult {
        let first = {
            let mut fetched = self.fetched.lock().unwrap();
            fetched.push(url.to_string());
            fetched.len() == 1
        };

        if let (Some(gate), false) = (&self.gate, first) {
            gate.acquire().await.unwrap().forget();
        }

        let final_url = match self.redirects.get(url.as_str()) {
            Some(target) => Url::parse(target).unwrap(),
            None => url.clone(),
        };

        match self.pages.get(final_url.as_str()) {
            Some(body) => FetchResult::Success {
                final_url,
                status_code: 200,
                body: body.clone(),
            },
            None => FetchResult::HttpError { status_code: 404 },
        }
    }
}

/// Storage wrapper that can be told to fail specific writes
struct FlakyStorage {
    inner: SqliteStorage,
    fail_saves: bool,
    fail_update_to: Option<TaskStatus>,
}

impl FlakyStorage {
    fn new() -> Self {
        Self {
            inner: SqliteStorage::new_in_memory().unwrap(),
            fail_saves: false,
            fail_update_to: None,
        }
    }
}

impl Storage for FlakyStorage {
    fn create_task(&mut self, task: &CrawlTask) -> StorageResult<()> {
        self.inner.create_task(task)
    }

    fn update_task(&mut self, task: &CrawlTask) -> StorageResult<()> {
        if self.fail_update_to == Some(task.status) {
            return Err(StorageError::Database("disk I/O error".to_string()));
        }
        self.inner.update_task(task)
    }

    fn get_task(&self, task_id: &str) -> StorageResult<CrawlTask> {
        self.inner.get_task(task_id)
    }

    fn list_tasks(&self) -> StorageResult<Vec<CrawlTask>> {
        self.inner.list_tasks()
    }

    fn save_page_result(&mut self, task_id: &str, page: &PageResult) -> StorageResult<i64> {
        if self.fail_saves {
            return Err(StorageError::Database("database is locked".to_string()));
        }
        self.inner.save_page_result(task_id, page)
    }

    fn get_page_result(&self, id: i64) -> StorageResult<PageResultRecord> {
        self.inner.get_page_result(id)
    }

    fn get_page_results(
        &self,
        task_id: &str,
        limit: u32,
        offset: u32,
    ) -> StorageResult<Vec<PageResultRecord>> {
        self.inner.get_page_results(task_id, limit, offset)
    }

    fn count_page_results(&self, task_id: &str) -> StorageResult<u64> {
        self.inner.count_page_results(task_id)
    }
}

fn scripted_service(
    fetcher: Arc<ScriptedFetcher>,
    max_workers: u32,
    max_concurrent_tasks: u32,
) -> (CrawlService, SharedStorage) {
    let config = create_test_config("unused.db", max_workers, max_concurrent_tasks);
    let storage = share(SqliteStorage::new_in_memory().unwrap());
    let service = CrawlService::new(&config, Arc::clone(&storage), fetcher);
    (service, storage)
}

fn stored_results(storage: &SharedStorage, task_id: &str) -> Vec<PageResultRecord> {
    lock_storage(storage)
        .unwrap()
        .get_all_page_results(task_id)
        .unwrap()
}

fn result_for<'a>(results: &'a [PageResultRecord], url: &str) -> &'a PageResultRecord {
    results
        .iter()
        .find(|r| r.url == url)
        .unwrap_or_else(|| panic!("no result for {}", url))
}

/// Polls until the fetcher has seen `count` fetches
async fn wait_for_fetches(fetcher: &ScriptedFetcher, count: usize) {
    for _ in 0..500 {
        if fetcher.fetched().len() >= count {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("expected {} fetches, saw {:?}", count, fetcher.fetched());
}

/// A links to internal B and external C; B links further in
fn site_abc() -> Vec<(&'static str, String)> {
    vec![
        (
            "https://example.test/a",
            html_page(
                "Page A",
                r#"<h1>A</h1><a href="/b">B</a><a href="https://other.test/c">C</a>"#,
            ),
        ),
        (
            "https://example.test/b",
            html_page("Page B", r#"<h1>B</h1><a href="/d">D</a>"#),
        ),
        (
            "https://example.test/d",
            html_page("Page D", "<h1>D</h1>"),
        ),
        ("https://other.test/c", html_page("Page C", "<h1>C</h1>")),
    ]
}

#[tokio::test]
async fn test_depth_one_crawl_follows_internal_links_only() {
    let fetcher = Arc::new(ScriptedFetcher::new(&site_abc()));
    let (service, storage) = scripted_service(Arc::clone(&fetcher), 4, 1);

    let handle = service
        .start_crawl(CrawlRequest::new("https://example.test/a").with_depth(1))
        .unwrap();
    let task_id = handle.task_id().to_string();
    assert_eq!(handle.wait().await.unwrap(), TaskStatus::Completed);

    let results = stored_results(&storage, &task_id);
    assert_eq!(results.len(), 2);

    let a = result_for(&results, "https://example.test/a");
    assert_eq!(a.internal_links, 1);
    assert_eq!(a.external_links, 1);

    let b = result_for(&results, "https://example.test/b");
    assert_eq!(b.internal_links, 1);

    // C is external and D is beyond the depth bound
    assert_eq!(fetcher.fetch_count("https://other.test/c"), 0);
    assert_eq!(fetcher.fetch_count("https://example.test/d"), 0);

    let task = service.status(&task_id).unwrap();
    assert_eq!(task.status, TaskStatus::Completed);
    assert_eq!(
        task.result_summary.as_deref(),
        Some("Crawl completed for https://example.test/a: 2 pages saved, 0 skipped")
    );
    assert!(task.error_detail.is_none());

    // Tracker and database agree
    let stored = lock_storage(&storage).unwrap().get_task(&task_id).unwrap();
    assert_eq!(stored, task);
}

#[tokio::test]
async fn test_depth_zero_fetches_seed_only() {
    let fetcher = Arc::new(ScriptedFetcher::new(&site_abc()));
    let (service, storage) = scripted_service(Arc::clone(&fetcher), 4, 1);

    let handle = service
        .start_crawl(CrawlRequest::new("https://example.test/a").with_depth(0))
        .unwrap();
    let task_id = handle.task_id().to_string();
    assert_eq!(handle.wait().await.unwrap(), TaskStatus::Completed);

    let results = stored_results(&storage, &task_id);
    assert_eq!(results.len(), 1);
    // Links are still counted even though none are followed
    assert_eq!(results[0].internal_links, 1);
    assert_eq!(fetcher.fetched(), vec!["https://example.test/a".to_string()]);
}

#[tokio::test]
async fn test_depth_two_reaches_grandchildren() {
    let fetcher = Arc::new(ScriptedFetcher::new(&site_abc()));
    let (service, storage) = scripted_service(Arc::clone(&fetcher), 2, 1);

    let handle = service
        .start_crawl(CrawlRequest::new("https://example.test/a").with_depth(2))
        .unwrap();
    let task_id = handle.task_id().to_string();
    assert_eq!(handle.wait().await.unwrap(), TaskStatus::Completed);

    let mut urls: Vec<String> = stored_results(&storage, &task_id)
        .into_iter()
        .map(|r| r.url)
        .collect();
    urls.sort();
    assert_eq!(
        urls,
        vec![
            "https://example.test/a",
            "https://example.test/b",
            "https://example.test/d"
        ]
    );
}

#[tokio::test]
async fn test_each_url_fetched_once() {
    let pages = vec![
        (
            "https://example.test/",
            html_page(
                "Home",
                r#"<a href="/b">B</a><a href="/b">B again</a><a href="/">Home</a>
                   <a href="https://EXAMPLE.test/b">B upper</a>"#,
            ),
        ),
        (
            "https://example.test/b",
            html_page("B", r#"<a href="/">Home</a><a href="/b">Self</a>"#),
        ),
    ];
    let fetcher = Arc::new(ScriptedFetcher::new(&pages));
    let (service, storage) = scripted_service(Arc::clone(&fetcher), 8, 1);

    let handle = service
        .start_crawl(CrawlRequest::new("https://example.test/").with_depth(5))
        .unwrap();
    let task_id = handle.task_id().to_string();
    assert_eq!(handle.wait().await.unwrap(), TaskStatus::Completed);

    assert_eq!(fetcher.fetch_count("https://example.test/"), 1);
    assert_eq!(fetcher.fetch_count("https://example.test/b"), 1);
    assert_eq!(stored_results(&storage, &task_id).len(), 2);

    let home = result_for(&stored_results(&storage, &task_id), "https://example.test/").clone();
    assert_eq!(home.internal_links, 4);
    assert_eq!(home.external_links, 0);
}

#[tokio::test]
async fn test_failed_fetch_skips_page() {
    let pages = vec![
        (
            "https://example.test/",
            html_page("Home", r#"<a href="/missing">Gone</a><a href="/ok">OK</a>"#),
        ),
        ("https://example.test/ok", html_page("OK", "<h1>OK</h1>")),
    ];
    let fetcher = Arc::new(ScriptedFetcher::new(&pages));
    let (service, storage) = scripted_service(Arc::clone(&fetcher), 2, 1);

    let handle = service
        .start_crawl(CrawlRequest::new("https://example.test/"))
        .unwrap();
    let task_id = handle.task_id().to_string();
    assert_eq!(handle.wait().await.unwrap(), TaskStatus::Completed);

    assert_eq!(fetcher.fetch_count("https://example.test/missing"), 1);
    assert_eq!(stored_results(&storage, &task_id).len(), 2);
    assert_eq!(
        service.status(&task_id).unwrap().result_summary.as_deref(),
        Some("Crawl completed for https://example.test/: 2 pages saved, 1 skipped")
    );
}

#[tokio::test]
async fn test_unreachable_seed_still_completes() {
    let fetcher = Arc::new(ScriptedFetcher::new(&[]));
    let (service, storage) = scripted_service(Arc::clone(&fetcher), 2, 1);

    let handle = service
        .start_crawl(CrawlRequest::new("https://example.test/"))
        .unwrap();
    let task_id = handle.task_id().to_string();
    assert_eq!(handle.wait().await.unwrap(), TaskStatus::Completed);
    assert!(stored_results(&storage, &task_id).is_empty());
}

#[tokio::test]
async fn test_links_resolve_against_final_url() {
    let pages = vec![(
        "https://example.test/docs/",
        html_page("Docs", r#"<a href="intro">Intro</a>"#),
    )];
    let fetcher = Arc::new(
        ScriptedFetcher::new(&pages)
            .with_redirect("https://example.test/start", "https://example.test/docs/"),
    );
    let (service, storage) = scripted_service(Arc::clone(&fetcher), 1, 1);

    let handle = service
        .start_crawl(CrawlRequest::new("https://example.test/start"))
        .unwrap();
    let task_id = handle.task_id().to_string();
    handle.wait().await.unwrap();

    // The result keeps the requested URL; its link resolved under /docs/
    let results = stored_results(&storage, &task_id);
    assert_eq!(results[0].url, "https://example.test/start");
    assert_eq!(fetcher.fetch_count("https://example.test/docs/intro"), 1);
}

#[tokio::test]
async fn test_stop_mid_crawl_keeps_results() {
    let links: String = (1..=5)
        .map(|i| format!(r#"<a href="/p{}">P{}</a>"#, i, i))
        .collect();
    let children: Vec<String> = (1..=5)
        .map(|i| format!("https://example.test/p{}", i))
        .collect();
    let mut pages = vec![("https://example.test/", html_page("Home", &links))];
    for child in &children {
        pages.push((child.as_str(), html_page("Child", "<h1>Child</h1>")));
    }

    let gate = Arc::new(Semaphore::new(0));
    let fetcher = Arc::new(ScriptedFetcher::new(&pages).with_gate(Arc::clone(&gate)));
    let (service, storage) = scripted_service(Arc::clone(&fetcher), 1, 1);

    let handle = service
        .start_crawl(CrawlRequest::new("https://example.test/").with_depth(1))
        .unwrap();
    let task_id = handle.task_id().to_string();

    // Seed done, first child blocked in flight
    wait_for_fetches(&fetcher, 2).await;
    assert_eq!(service.stop(&task_id).unwrap(), TaskStatus::InProgress);

    gate.add_permits(10);
    assert_eq!(handle.wait().await.unwrap(), TaskStatus::Stopped);

    // The in-flight page persisted; nothing was dequeued after the stop
    assert_eq!(fetcher.fetched().len(), 2);
    assert_eq!(stored_results(&storage, &task_id).len(), 2);

    let task = service.status(&task_id).unwrap();
    assert_eq!(task.status, TaskStatus::Stopped);
    let stored = lock_storage(&storage).unwrap().get_task(&task_id).unwrap();
    assert_eq!(stored.status, TaskStatus::Stopped);
}

#[tokio::test]
async fn test_stop_pending_task() {
    let pages = vec![
        (
            "https://example.test/",
            html_page("Home", r#"<a href="/next">Next</a>"#),
        ),
        ("https://example.test/next", html_page("Next", "")),
        ("https://queued.test/", html_page("Queued", "")),
    ];
    let gate = Arc::new(Semaphore::new(0));
    let fetcher = Arc::new(ScriptedFetcher::new(&pages).with_gate(Arc::clone(&gate)));
    let (service, storage) = scripted_service(Arc::clone(&fetcher), 1, 1);

    // The first task holds the only task slot
    let first = service
        .start_crawl(CrawlRequest::new("https://example.test/"))
        .unwrap();
    wait_for_fetches(&fetcher, 2).await;

    let second = service
        .start_crawl(CrawlRequest::new("https://queued.test/"))
        .unwrap();
    let second_id = second.task_id().to_string();
    assert_eq!(service.status(&second_id).unwrap().status, TaskStatus::Pending);

    assert_eq!(service.stop(&second_id).unwrap(), TaskStatus::Stopped);

    gate.add_permits(10);
    assert_eq!(first.wait().await.unwrap(), TaskStatus::Completed);
    assert_eq!(second.wait().await.unwrap(), TaskStatus::Stopped);

    assert_eq!(fetcher.fetch_count("https://queued.test/"), 0);
    let stored = lock_storage(&storage).unwrap().get_task(&second_id).unwrap();
    assert_eq!(stored.status, TaskStatus::Stopped);
    assert_eq!(
        stored.result_summary.as_deref(),
        Some("Crawl stopped for https://queued.test/ before it started")
    );
}

#[tokio::test]
async fn test_unpersisted_pending_stop_leaves_task_pending() {
    let pages = vec![
        (
            "https://example.test/",
            html_page("Home", r#"<a href="/next">Next</a>"#),
        ),
        ("https://example.test/next", html_page("Next", "")),
        ("https://queued.test/", html_page("Queued", "")),
    ];
    let gate = Arc::new(Semaphore::new(0));
    let fetcher = Arc::new(ScriptedFetcher::new(&pages).with_gate(Arc::clone(&gate)));
    let config = create_test_config("unused.db", 1, 1);
    let mut flaky = FlakyStorage::new();
    flaky.fail_update_to = Some(TaskStatus::Stopped);
    let storage = share(flaky);
    let shared_fetcher: Arc<dyn Fetcher> = fetcher.clone();
    let service = CrawlService::new(&config, Arc::clone(&storage), shared_fetcher);

    let first = service
        .start_crawl(CrawlRequest::new("https://example.test/"))
        .unwrap();
    wait_for_fetches(&fetcher, 2).await;

    let second = service
        .start_crawl(CrawlRequest::new("https://queued.test/"))
        .unwrap();
    let second_id = second.task_id().to_string();

    assert!(matches!(
        service.stop(&second_id),
        Err(OpenCrawlError::Storage(_))
    ));

    // Tracker and database still agree
    assert_eq!(service.status(&second_id).unwrap().status, TaskStatus::Pending);
    let stored = lock_storage(&storage).unwrap().get_task(&second_id).unwrap();
    assert_eq!(stored.status, TaskStatus::Pending);

    gate.add_permits(10);
    assert_eq!(first.wait().await.unwrap(), TaskStatus::Completed);

    // The raised signal stops the run at once; its stopped write fails too
    assert_eq!(second.wait().await.unwrap(), TaskStatus::Failed);
    assert_eq!(fetcher.fetch_count("https://queued.test/"), 0);

    let task = service.status(&second_id).unwrap();
    let stored = lock_storage(&storage).unwrap().get_task(&second_id).unwrap();
    assert_eq!(task.status, TaskStatus::Failed);
    assert_eq!(stored.status, TaskStatus::Failed);
    assert_eq!(
        task.error_detail.as_deref(),
        Some("Persistence sink unavailable: database error")
    );
}

#[tokio::test]
async fn test_links_resolve_against_base_href() {
    let pages = vec![(
        "https://example.test/",
        html_page(
            "Home",
            r#"<base href="https://example.test/guide/"><a href="start">Start</a>"#,
        ),
    )];
    let fetcher = Arc::new(ScriptedFetcher::new(&pages));
    let (service, _storage) = scripted_service(Arc::clone(&fetcher), 1, 1);

    let handle = service
        .start_crawl(CrawlRequest::new("https://example.test/"))
        .unwrap();
    assert_eq!(handle.wait().await.unwrap(), TaskStatus::Completed);

    assert_eq!(fetcher.fetch_count("https://example.test/guide/start"), 1);
    assert_eq!(fetcher.fetch_count("https://example.test/start"), 0);
}

#[tokio::test]
async fn test_stop_finished_task_is_noop() {
    let fetcher = Arc::new(ScriptedFetcher::new(&site_abc()));
    let (service, _storage) = scripted_service(fetcher, 2, 1);

    let handle = service
        .start_crawl(CrawlRequest::new("https://example.test/a"))
        .unwrap();
    let task_id = handle.task_id().to_string();
    handle.wait().await.unwrap();

    assert_eq!(service.stop(&task_id).unwrap(), TaskStatus::Completed);
    assert_eq!(service.status(&task_id).unwrap().status, TaskStatus::Completed);
}

#[tokio::test]
async fn test_unknown_task_is_not_found() {
    let fetcher = Arc::new(ScriptedFetcher::new(&[]));
    let (service, _storage) = scripted_service(fetcher, 1, 1);

    assert!(matches!(
        service.status("no-such-task"),
        Err(OpenCrawlError::Task(TaskError::NotFound(_)))
    ));
    assert!(matches!(
        service.results("no-such-task", 10, 0),
        Err(OpenCrawlError::Task(TaskError::NotFound(_)))
    ));
}

#[tokio::test]
async fn test_sink_failure_fails_task() {
    let fetcher = Arc::new(ScriptedFetcher::new(&site_abc()));
    let config = create_test_config("unused.db", 2, 1);
    let mut flaky = FlakyStorage::new();
    flaky.fail_saves = true;
    let storage = share(flaky);
    let service = CrawlService::new(&config, Arc::clone(&storage), fetcher);

    let handle = service
        .start_crawl(CrawlRequest::new("https://example.test/a"))
        .unwrap();
    let task_id = handle.task_id().to_string();
    assert_eq!(handle.wait().await.unwrap(), TaskStatus::Failed);

    let task = service.status(&task_id).unwrap();
    assert_eq!(task.status, TaskStatus::Failed);
    assert_eq!(
        task.error_detail.as_deref(),
        Some("Persistence sink unavailable: database error")
    );
    assert!(task.result_summary.is_none());

    let stored = lock_storage(&storage).unwrap().get_task(&task_id).unwrap();
    assert_eq!(stored.status, TaskStatus::Failed);
}

#[tokio::test]
async fn test_terminal_update_failure_fails_task() {
    let fetcher = Arc::new(ScriptedFetcher::new(&site_abc()));
    let config = create_test_config("unused.db", 2, 1);
    let mut flaky = FlakyStorage::new();
    flaky.fail_update_to = Some(TaskStatus::Completed);
    let storage = share(flaky);
    let service = CrawlService::new(&config, Arc::clone(&storage), fetcher);

    let handle = service
        .start_crawl(CrawlRequest::new("https://example.test/a"))
        .unwrap();
    let task_id = handle.task_id().to_string();
    assert_eq!(handle.wait().await.unwrap(), TaskStatus::Failed);

    let task = service.status(&task_id).unwrap();
    assert_eq!(task.status, TaskStatus::Failed);
    assert!(task.error_detail.is_some());

    // Pages saved before the failure remain
    assert_eq!(stored_results(&storage, &task_id).len(), 2);
    let stored = lock_storage(&storage).unwrap().get_task(&task_id).unwrap();
    assert_eq!(stored.status, TaskStatus::Failed);
}

#[tokio::test]
async fn test_results_pagination() {
    let fetcher = Arc::new(ScriptedFetcher::new(&site_abc()));
    let (service, _storage) = scripted_service(fetcher, 1, 1);

    let handle = service
        .start_crawl(CrawlRequest::new("https://example.test/a").with_depth(2))
        .unwrap();
    let task_id = handle.task_id().to_string();
    handle.wait().await.unwrap();

    let first = service.results(&task_id, 2, 0).unwrap();
    let rest = service.results(&task_id, 2, 2).unwrap();
    assert_eq!(first.len(), 2);
    assert_eq!(rest.len(), 1);

    let single = service.result(rest[0].id).unwrap();
    assert_eq!(single, rest[0]);
}

#[tokio::test]
async fn test_concurrent_tasks_are_independent() {
    let fetcher = Arc::new(ScriptedFetcher::new(&site_abc()));
    let (service, storage) = scripted_service(Arc::clone(&fetcher), 2, 2);

    let first = service
        .start_crawl(CrawlRequest::new("https://example.test/a"))
        .unwrap();
    let second = service
        .start_crawl(CrawlRequest::new("https://example.test/a"))
        .unwrap();
    let ids = [first.task_id().to_string(), second.task_id().to_string()];

    assert_eq!(first.wait().await.unwrap(), TaskStatus::Completed);
    assert_eq!(second.wait().await.unwrap(), TaskStatus::Completed);

    // Each task has its own frontier, so both see both pages
    for id in &ids {
        assert_eq!(stored_results(&storage, id).len(), 2);
    }
}

#[tokio::test]
async fn test_full_crawl_over_http() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let long_meta = "A".repeat(80);

    Mock::given(method("GET"))
        .and(path("/"))
        .and(header("user-agent", "AuditBot/2.0"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(
                format!(
                    r#"<html><head><title>Home</title>
                    <meta name="description" content="{}"></head><body>
                    <h1>Welcome</h1><img src="logo.png" alt="Logo">
                    <a href="/about">About</a>
                    <a href="/missing">Missing</a>
                    <a href="https://external.test/">Elsewhere</a>
                    </body></html>"#,
                    long_meta
                ),
                "text/html",
            ),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/about"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(
                html_page(
                    "About us",
                    r#"<h1>About</h1><h1>Team</h1><a href="/deeper">Deeper</a>"#,
                ),
                "text/html; charset=utf-8",
            ),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/deeper"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("crawl.db");
    let config = create_test_config(db_path.to_str().unwrap(), 2, 1);

    let request = CrawlRequest::new(format!("{}/", base_url))
        .with_depth(1)
        .with_user_agent("AuditBot/2.0");
    let task = crawl(&config, request).await.unwrap();

    assert_eq!(task.status, TaskStatus::Completed);
    assert_eq!(task.user_agent, "AuditBot/2.0");

    // Reopen the database from disk
    let storage = SqliteStorage::new(&db_path).unwrap();
    let results = storage.get_all_page_results(&task.id).unwrap();
    assert_eq!(results.len(), 2);

    let home = result_for(&results, &format!("{}/", base_url));
    assert_eq!(home.title, "Home");
    assert_eq!(home.heading(HeadingLevel::H1), "Welcome");
    assert_eq!(home.alt_texts, "Logo");
    assert_eq!(home.internal_links, 2);
    assert_eq!(home.external_links, 1);
    assert_eq!(home.seo_evaluation, "Title Too Short (Minor Issue)");
    assert_eq!(home.seo_score, 95);
    assert!(home.raw_content.as_deref().unwrap().contains("<h1>Welcome</h1>"));
    assert!(home.load_time >= 0.0);

    let about = result_for(&results, &format!("{}/about", base_url));
    assert_eq!(about.heading(HeadingLevel::H1), "About, Team");
    assert_eq!(
        about.seo_evaluation,
        "Title Too Short (Minor Issue), Missing Meta Description (Critical Issue), \
         Multiple H1 Tags (Moderate Issue)"
    );
    assert_eq!(about.seo_score, 55);
}

#[tokio::test]
async fn test_raw_content_not_stored_when_disabled() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(html_page("Only page", "<h1>Hi</h1>"), "text/html"),
        )
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("crawl.db");
    let mut config = create_test_config(db_path.to_str().unwrap(), 1, 1);
    config.crawler.store_raw_content = false;

    let task = crawl(&config, CrawlRequest::new(mock_server.uri()).with_depth(0))
        .await
        .unwrap();

    let storage = SqliteStorage::new(&db_path).unwrap();
    let results = storage.get_all_page_results(&task.id).unwrap();
    assert_eq!(results.len(), 1);
    assert!(results[0].raw_content.is_none());
}
