//! SQLite storage behind the local bookmark backend.
//!
//! [`Database`] owns the connection and migrates the schema when opened:
//!
//! ```no_run
//! use bookmark_editor::database::Database;
//!
//! let db = Database::open("bookmarks.db").expect("open bookmark database");
//! let scratch = Database::open_in_memory().expect("open scratch database");
//! assert!(scratch.connection().is_autocommit());
//! # drop(db);
//! ```

pub mod connection;
pub mod migrations;

pub use connection::Database;
