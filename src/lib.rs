//! Bookmark editor: a headless edit form for a single bookmark.
//!
//! Projects a bookmark into editable form values, validates and tracks edits,
//! submits changes through a pluggable backend and reports the outcome as
//! notifications. The library backs the `bookmark-editor-rpc` binary and the
//! integration tests.

pub mod app;
pub mod database;
pub mod managers;
pub mod platform;
pub mod rpc_handler;
pub mod services;
pub mod types;
