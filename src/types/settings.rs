use serde::{Deserialize, Serialize};

/// Top-level editor settings container.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct EditorSettings {
    #[serde(default)]
    pub backend: BackendSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
    #[serde(default)]
    pub notifications: NotificationSettings,
}

/// Which bookmark backend the host talks to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum BackendMode {
    /// SQLite database on this machine.
    Local,
    /// Bookmark server reached over HTTP.
    Remote,
}

/// Backend connection settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BackendSettings {
    pub mode: BackendMode,
    /// Path of the local SQLite database; `None` uses the platform data dir.
    pub database_path: Option<String>,
    pub api_base_url: String,
    pub api_key: Option<String>,
    pub request_timeout_secs: u64,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            mode: BackendMode::Local,
            database_path: None,
            api_base_url: "http://localhost:3000".to_string(),
            api_key: None,
            request_timeout_secs: 30,
        }
    }
}

/// Log output settings for the RPC host.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingSettings {
    /// `tracing_subscriber::EnvFilter` directive, e.g. `info` or `bookmark_editor=debug`.
    pub level: String,
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Texts of the toasts emitted after a submission.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NotificationSettings {
    pub success_message: String,
    pub failure_title: String,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            success_message: "Bookmark details updated successfully!".to_string(),
            failure_title: "Failed to update bookmark".to_string(),
        }
    }
}
