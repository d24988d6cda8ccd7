// Windows paths: roaming profile for settings, local profile for data.

use std::env;
use std::path::PathBuf;

const APP_DIR: &str = "BookmarkEditor";

/// `%APPDATA%/BookmarkEditor`
pub fn get_config_dir() -> PathBuf {
    let appdata = env::var("APPDATA")
        .unwrap_or_else(|_| String::from("C:\\Users\\Default\\AppData\\Roaming"));
    PathBuf::from(appdata).join(APP_DIR)
}

/// `%LOCALAPPDATA%/BookmarkEditor`
pub fn get_data_dir() -> PathBuf {
    let local = env::var("LOCALAPPDATA")
        .unwrap_or_else(|_| String::from("C:\\Users\\Default\\AppData\\Local"));
    PathBuf::from(local).join(APP_DIR)
}
