//! Versioned schema for the local bookmark database.
//!
//! Applied versions are recorded in `schema_version`; `run_all` applies the
//! missing ones in order and is safe to call on every open.

use chrono::Utc;
use rusqlite::{params, Connection};
use tracing::info;

/// Highest version in [`MIGRATIONS`].
pub const CURRENT_SCHEMA_VERSION: i32 = 2;

type Migration = fn(&Connection) -> Result<(), rusqlite::Error>;

/// `(version, description, apply)` in ascending version order.
const MIGRATIONS: [(i32, &str, Migration); 2] = [
    (1, "Bookmarks with polymorphic content columns", create_bookmarks),
    (2, "Tags and bookmark_tags", create_tags),
];

/// Highest applied version, or 0 for a fresh database.
pub fn get_schema_version(conn: &Connection) -> i32 {
    conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )
    .unwrap_or(0)
}

/// Brings the schema up to [`CURRENT_SCHEMA_VERSION`].
///
/// # Errors
/// Returns the first failing statement's `rusqlite::Error`; versions applied
/// before it stay recorded.
pub fn run_all(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "PRAGMA journal_mode = WAL;
         PRAGMA foreign_keys = ON;
         CREATE TABLE IF NOT EXISTS schema_version (
             version INTEGER PRIMARY KEY,
             applied_at INTEGER NOT NULL,
             description TEXT NOT NULL
         );",
    )?;

    let applied = get_schema_version(conn);
    for (version, description, apply) in MIGRATIONS.iter().filter(|(v, _, _)| *v > applied) {
        apply(conn)?;
        conn.execute(
            "INSERT OR IGNORE INTO schema_version (version, applied_at, description) \
             VALUES (?1, ?2, ?3)",
            params![version, Utc::now().timestamp(), description],
        )?;
        info!(version, description, "schema migration applied");
    }
    Ok(())
}

/// Dates are unix milliseconds. Link, text and asset columns are filled
/// according to `content_type`.
fn create_bookmarks(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS bookmarks (
             id TEXT PRIMARY KEY,
             title TEXT,
             created_at INTEGER,
             updated_at INTEGER NOT NULL,
             content_type TEXT NOT NULL,
             url TEXT,
             link_title TEXT,
             description TEXT,
             author TEXT,
             publisher TEXT,
             date_published INTEGER,
             date_modified INTEGER,
             text_content TEXT,
             asset_type TEXT,
             asset_id TEXT,
             file_name TEXT
         );
         CREATE INDEX IF NOT EXISTS idx_bookmarks_created_at ON bookmarks(created_at);",
    )
}

fn create_tags(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS tags (
             id TEXT PRIMARY KEY,
             name TEXT NOT NULL UNIQUE
         );
         CREATE TABLE IF NOT EXISTS bookmark_tags (
             bookmark_id TEXT NOT NULL REFERENCES bookmarks(id) ON DELETE CASCADE,
             tag_id TEXT NOT NULL REFERENCES tags(id) ON DELETE CASCADE,
             PRIMARY KEY (bookmark_id, tag_id)
         );",
    )
}
