//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the OpenCrawl database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- One row per crawl request
CREATE TABLE IF NOT EXISTS crawl_tasks (
    id TEXT PRIMARY KEY,
    seed_url TEXT NOT NULL,
    depth INTEGER NOT NULL,
    user_agent TEXT NOT NULL,
    status TEXT NOT NULL,
    result_summary TEXT,
    error_detail TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_crawl_tasks_status ON crawl_tasks(status);

-- One row per successfully fetched page
CREATE TABLE IF NOT EXISTS page_results (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    task_id TEXT NOT NULL REFERENCES crawl_tasks(id),
    url TEXT NOT NULL,
    title TEXT NOT NULL,
    meta_description TEXT NOT NULL,
    h1 TEXT NOT NULL,
    h2 TEXT NOT NULL,
    h3 TEXT NOT NULL,
    h4 TEXT NOT NULL,
    h5 TEXT NOT NULL,
    h6 TEXT NOT NULL,
    alt_texts TEXT NOT NULL,
    word_count INTEGER NOT NULL,
    internal_links INTEGER NOT NULL,
    external_links INTEGER NOT NULL,
    seo_evaluation TEXT NOT NULL,
    seo_score INTEGER NOT NULL,
    raw_content TEXT,
    load_time REAL NOT NULL,
    created_at TEXT NOT NULL,
    UNIQUE(task_id, url)
);

CREATE INDEX IF NOT EXISTS idx_page_results_task ON page_results(task_id);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
