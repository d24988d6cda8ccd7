// Bookmark editor platform paths
// Resolves where settings and the local bookmark database live on each OS.
//
// Environment overrides take precedence over the OS conventions:
// `BOOKMARK_EDITOR_CONFIG` names the settings file itself and
// `BOOKMARK_EDITOR_DATA_DIR` replaces the data directory.

use std::env;
use std::path::PathBuf;

#[cfg(target_os = "linux")]
mod linux;

#[cfg(target_os = "macos")]
mod macos;

#[cfg(target_os = "windows")]
mod windows;

pub const CONFIG_ENV: &str = "BOOKMARK_EDITOR_CONFIG";
pub const DATA_DIR_ENV: &str = "BOOKMARK_EDITOR_DATA_DIR";

const SETTINGS_FILE: &str = "settings.json";
const DATABASE_FILE: &str = "bookmarks.db";

/// Directory holding `settings.json`.
///
/// - **Linux**: `$XDG_CONFIG_HOME/bookmark-editor` or `~/.config/bookmark-editor`
/// - **macOS**: `~/Library/Preferences/BookmarkEditor`
/// - **Windows**: `%APPDATA%/BookmarkEditor`
pub fn get_config_dir() -> PathBuf {
    #[cfg(target_os = "linux")]
    {
        linux::get_config_dir()
    }
    #[cfg(target_os = "macos")]
    {
        macos::get_config_dir()
    }
    #[cfg(target_os = "windows")]
    {
        windows::get_config_dir()
    }
}

/// Directory holding the local bookmark database. `BOOKMARK_EDITOR_DATA_DIR`
/// wins when set and non-empty.
///
/// - **Linux**: `$XDG_DATA_HOME/bookmark-editor` or `~/.local/share/bookmark-editor`
/// - **macOS**: `~/Library/Application Support/BookmarkEditor`
/// - **Windows**: `%LOCALAPPDATA%/BookmarkEditor`
pub fn get_data_dir() -> PathBuf {
    if let Some(dir) = non_empty_env(DATA_DIR_ENV) {
        return PathBuf::from(dir);
    }
    #[cfg(target_os = "linux")]
    {
        linux::get_data_dir()
    }
    #[cfg(target_os = "macos")]
    {
        macos::get_data_dir()
    }
    #[cfg(target_os = "windows")]
    {
        windows::get_data_dir()
    }
}

/// Settings file path: `BOOKMARK_EDITOR_CONFIG` if set, else
/// `<config dir>/settings.json`.
pub fn settings_path() -> PathBuf {
    match non_empty_env(CONFIG_ENV) {
        Some(path) => PathBuf::from(path),
        None => get_config_dir().join(SETTINGS_FILE),
    }
}

/// Default location of the local bookmark database.
pub fn default_database_path() -> PathBuf {
    get_data_dir().join(DATABASE_FILE)
}

fn non_empty_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}
