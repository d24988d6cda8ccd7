// macOS paths live under ~/Library.

use std::env;
use std::path::PathBuf;

const APP_DIR: &str = "BookmarkEditor";

fn library_dir() -> PathBuf {
    PathBuf::from(env::var("HOME").unwrap_or_else(|_| String::from("/tmp"))).join("Library")
}

/// `~/Library/Preferences/BookmarkEditor`
pub fn get_config_dir() -> PathBuf {
    library_dir().join("Preferences").join(APP_DIR)
}

/// `~/Library/Application Support/BookmarkEditor`
pub fn get_data_dir() -> PathBuf {
    library_dir().join("Application Support").join(APP_DIR)
}
