//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.

use crate::crawler::PageResult;
use crate::state::{CrawlTask, TaskStatus};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::storage::PageResultRecord;
use chrono::Utc;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};
use std::path::Path;

const TASK_COLUMNS: &str = "id, seed_url, depth, user_agent, status, result_summary, \
                            error_detail, created_at, updated_at";

const PAGE_RESULT_COLUMNS: &str = "id, task_id, url, title, meta_description, \
                                   h1, h2, h3, h4, h5, h6, alt_texts, word_count, \
                                   internal_links, external_links, seo_evaluation, seo_score, \
                                   raw_content, load_time, created_at";

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = init_database(path)?;
        Ok(Self { conn })
    }

    /// Creates an in-memory database
    ///
    /// Nothing is written to disk; used by tests and dry runs.
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

fn task_from_row(row: &Row<'_>) -> rusqlite::Result<CrawlTask> {
    Ok(CrawlTask {
        id: row.get(0)?,
        seed_url: row.get(1)?,
        depth: row.get(2)?,
        user_agent: row.get(3)?,
        status: TaskStatus::from_db_string(&row.get::<_, String>(4)?)
            .unwrap_or(TaskStatus::Failed),
        result_summary: row.get(5)?,
        error_detail: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

fn page_result_from_row(row: &Row<'_>) -> rusqlite::Result<PageResultRecord> {
    Ok(PageResultRecord {
        id: row.get(0)?,
        task_id: row.get(1)?,
        url: row.get(2)?,
        title: row.get(3)?,
        meta_description: row.get(4)?,
        headings: [
            row.get(5)?,
            row.get(6)?,
            row.get(7)?,
            row.get(8)?,
            row.get(9)?,
            row.get(10)?,
        ],
        alt_texts: row.get(11)?,
        word_count: row.get::<_, i64>(12)? as u64,
        internal_links: row.get::<_, i64>(13)? as u64,
        external_links: row.get::<_, i64>(14)? as u64,
        seo_evaluation: row.get(15)?,
        seo_score: row.get(16)?,
        raw_content: row.get(17)?,
        load_time: row.get(18)?,
        created_at: row.get(19)?,
    })
}

impl Storage for SqliteStorage {
    // ===== Task Management =====

    fn create_task(&mut self, task: &CrawlTask) -> StorageResult<()> {
        self.conn
            .execute(
                &format!(
                    "INSERT INTO crawl_tasks ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                    TASK_COLUMNS
                ),
                params![
                    task.id,
                    task.seed_url,
                    task.depth,
                    task.user_agent,
                    task.status.to_db_string(),
                    task.result_summary,
                    task.error_detail,
                    task.created_at,
                    task.updated_at,
                ],
            )
            .map_err(|e| constraint_or(e, || format!("task {} already exists", task.id)))?;
        Ok(())
    }

    fn update_task(&mut self, task: &CrawlTask) -> StorageResult<()> {
        let updated = self.conn.execute(
            "UPDATE crawl_tasks
             SET status = ?1, result_summary = ?2, error_detail = ?3, updated_at = ?4
             WHERE id = ?5",
            params![
                task.status.to_db_string(),
                task.result_summary,
                task.error_detail,
                task.updated_at,
                task.id,
            ],
        )?;

        if updated == 0 {
            return Err(StorageError::TaskNotFound(task.id.clone()));
        }
        Ok(())
    }

    fn get_task(&self, task_id: &str) -> StorageResult<CrawlTask> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM crawl_tasks WHERE id = ?1",
            TASK_COLUMNS
        ))?;

        stmt.query_row(params![task_id], task_from_row)
            .optional()?
            .ok_or_else(|| StorageError::TaskNotFound(task_id.to_string()))
    }

    fn list_tasks(&self) -> StorageResult<Vec<CrawlTask>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM crawl_tasks ORDER BY created_at DESC, id",
            TASK_COLUMNS
        ))?;

        let tasks = stmt
            .query_map([], task_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(tasks)
    }

    // ===== Page Results =====

    fn save_page_result(&mut self, task_id: &str, page: &PageResult) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        let [h1, h2, h3, h4, h5, h6] = &page.headings;

        self.conn
            .execute(
                "INSERT INTO page_results (
                    task_id, url, title, meta_description, h1, h2, h3, h4, h5, h6,
                    alt_texts, word_count, internal_links, external_links,
                    seo_evaluation, seo_score, raw_content, load_time, created_at
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10,
                           ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19)",
                params![
                    task_id,
                    page.url,
                    page.title,
                    page.meta_description,
                    h1,
                    h2,
                    h3,
                    h4,
                    h5,
                    h6,
                    page.alt_texts.join(", "),
                    page.word_count as i64,
                    page.internal_links as i64,
                    page.external_links as i64,
                    page.seo.summary(),
                    page.seo.score,
                    page.raw_content,
                    page.load_time,
                    now,
                ],
            )
            .map_err(|e| {
                constraint_or(e, || {
                    format!("result for {} already saved in task {}", page.url, task_id)
                })
            })?;

        Ok(self.conn.last_insert_rowid())
    }

    fn get_page_result(&self, id: i64) -> StorageResult<PageResultRecord> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM page_results WHERE id = ?1",
            PAGE_RESULT_COLUMNS
        ))?;

        stmt.query_row(params![id], page_result_from_row)
            .optional()?
            .ok_or(StorageError::PageResultNotFound(id))
    }

    fn get_page_results(
        &self,
        task_id: &str,
        limit: u32,
        offset: u32,
    ) -> StorageResult<Vec<PageResultRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM page_results WHERE task_id = ?1 ORDER BY id LIMIT ?2 OFFSET ?3",
            PAGE_RESULT_COLUMNS
        ))?;

        let results = stmt
            .query_map(params![task_id, limit, offset], page_result_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(results)
    }

    fn count_page_results(&self, task_id: &str) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM page_results WHERE task_id = ?1",
            params![task_id],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }
}

/// Maps a SQLite constraint failure to a `ConstraintViolation`, passing other errors through
fn constraint_or(err: rusqlite::Error, describe: impl FnOnce() -> String) -> StorageError {
    match &err {
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.code == ErrorCode::ConstraintViolation =>
        {
            StorageError::ConstraintViolation(describe())
        }
        _ => StorageError::Sqlite(err),
    }
}

/// Opens a database file and brings its schema up to date
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
pub fn init_database(path: &Path) -> Result<Connection, rusqlite::Error> {
    let conn = Connection::open(path)?;

    // Configure SQLite for better performance
    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA foreign_keys = ON;
        PRAGMA temp_store = MEMORY;
    ",
    )?;

    initialize_schema(&conn)?;

    Ok(conn)
}
