// Linux paths follow the XDG base directory layout.

use std::env;
use std::path::PathBuf;

const APP_DIR: &str = "bookmark-editor";

fn xdg_dir(var: &str, fallback: &[&str]) -> PathBuf {
    match env::var(var) {
        Ok(dir) if !dir.is_empty() => PathBuf::from(dir).join(APP_DIR),
        _ => {
            let home = env::var("HOME").unwrap_or_else(|_| String::from("/tmp"));
            fallback
                .iter()
                .fold(PathBuf::from(home), |path, part| path.join(part))
                .join(APP_DIR)
        }
    }
}

/// `$XDG_CONFIG_HOME/bookmark-editor`, falling back to `~/.config/bookmark-editor`.
pub fn get_config_dir() -> PathBuf {
    xdg_dir("XDG_CONFIG_HOME", &[".config"])
}

/// `$XDG_DATA_HOME/bookmark-editor`, falling back to `~/.local/share/bookmark-editor`.
pub fn get_data_dir() -> PathBuf {
    xdg_dir("XDG_DATA_HOME", &[".local", "share"])
}
