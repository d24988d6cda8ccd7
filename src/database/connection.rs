//! SQLite connection management for the local bookmark database.
//!
//! [`Database`] wraps a `rusqlite::Connection` and brings the schema up to
//! date when opened.

use rusqlite::Connection;
use std::path::Path;
use tracing::{debug, warn};

use super::migrations;

/// Owned SQLite connection with migrations applied.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens (or creates) the database file at `path`, creating parent
    /// directories as needed, and runs pending migrations.
    ///
    /// # Errors
    /// Returns `rusqlite::Error` if the connection cannot be established or migrations fail.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, rusqlite::Error> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                if let Err(e) = std::fs::create_dir_all(parent) {
                    warn!(path = %parent.display(), error = %e, "cannot create database directory");
                }
            }
        }
        debug!(path = %path.display(), "opening bookmark database");
        Self::with_connection(Connection::open(path)?)
    }

    /// Opens an in-memory database. Used by tests; discarded on drop.
    pub fn open_in_memory() -> Result<Self, rusqlite::Error> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, rusqlite::Error> {
        migrations::run_all(&conn)?;
        Ok(Self { conn })
    }

    /// Returns the underlying connection for stores to query.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}
