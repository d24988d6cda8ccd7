// Bookmark editor settings engine
// Loads and saves `EditorSettings` as JSON, with dot-notation updates and reset.

use std::fs;
use std::path::Path;

use serde_json::Value;
use tracing::{debug, info};

use crate::platform;
use crate::types::errors::SettingsError;
use crate::types::settings::EditorSettings;

/// Trait defining the settings engine interface.
pub trait SettingsEngineTrait {
    fn load(&mut self) -> Result<EditorSettings, SettingsError>;
    fn save(&self) -> Result<(), SettingsError>;
    fn get_settings(&self) -> &EditorSettings;
    fn set_value(&mut self, key: &str, value: Value) -> Result<(), SettingsError>;
    fn reset(&mut self) -> Result<(), SettingsError>;
    fn get_config_path(&self) -> &str;
}

/// Settings engine persisting `settings.json` on disk.
pub struct SettingsEngine {
    config_path: String,
    settings: EditorSettings,
}

impl SettingsEngine {
    /// Creates an engine for `path_override`, or for [`platform::settings_path`]
    /// when `None`. Nothing is read until [`SettingsEngineTrait::load`].
    pub fn new(path_override: Option<String>) -> Self {
        let config_path =
            path_override.unwrap_or_else(|| platform::settings_path().to_string_lossy().to_string());
        Self {
            config_path,
            settings: EditorSettings::default(),
        }
    }
}

impl SettingsEngineTrait for SettingsEngine {
    /// Missing file means defaults; a malformed file is an error.
    fn load(&mut self) -> Result<EditorSettings, SettingsError> {
        let path = Path::new(&self.config_path);
        if !path.exists() {
            debug!(path = %self.config_path, "no settings file, using defaults");
            self.settings = EditorSettings::default();
            return Ok(self.settings.clone());
        }

        let content = fs::read_to_string(path)
            .map_err(|e| SettingsError::IoError(format!("Failed to read config file: {}", e)))?;
        let loaded: EditorSettings = serde_json::from_str(&content).map_err(|e| {
            SettingsError::SerializationError(format!("Failed to parse config file: {}", e))
        })?;
        check_ranges(&loaded)?;
        self.settings = loaded;
        info!(path = %self.config_path, "settings loaded");
        Ok(self.settings.clone())
    }

    fn save(&self) -> Result<(), SettingsError> {
        let path = Path::new(&self.config_path);
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    SettingsError::IoError(format!("Failed to create config directory: {}", e))
                })?;
            }
        }

        let json = serde_json::to_string_pretty(&self.settings).map_err(|e| {
            SettingsError::SerializationError(format!("Failed to serialize settings: {}", e))
        })?;
        fs::write(path, json)
            .map_err(|e| SettingsError::IoError(format!("Failed to write config file: {}", e)))
    }

    fn get_settings(&self) -> &EditorSettings {
        &self.settings
    }

    /// Updates one setting by dot path (`backend.mode`,
    /// `notifications.success_message`), validates the result by
    /// deserializing it, then saves.
    fn set_value(&mut self, key: &str, value: Value) -> Result<(), SettingsError> {
        if key.trim().is_empty() {
            return Err(SettingsError::InvalidKey("Key cannot be empty".to_string()));
        }

        let mut tree = serde_json::to_value(&self.settings).map_err(|e| {
            SettingsError::SerializationError(format!("Failed to serialize settings: {}", e))
        })?;

        let (parents, leaf) = match key.rsplit_once('.') {
            Some((parents, leaf)) => (parents.split('.').collect::<Vec<_>>(), leaf),
            None => (Vec::new(), key),
        };

        let mut current = &mut tree;
        for part in parents {
            current = current.get_mut(part).ok_or_else(|| {
                SettingsError::InvalidKey(format!("Key '{}' not found in settings", key))
            })?;
        }
        match current {
            Value::Object(map) if map.contains_key(leaf) => {
                map.insert(leaf.to_string(), value);
            }
            Value::Object(_) => {
                return Err(SettingsError::InvalidKey(format!(
                    "Key '{}' not found in settings",
                    key
                )))
            }
            _ => {
                return Err(SettingsError::InvalidKey(format!(
                    "Cannot navigate to key '{}': intermediate value is not an object",
                    key
                )))
            }
        }

        let updated: EditorSettings = serde_json::from_value(tree).map_err(|e| {
            SettingsError::InvalidValue(format!("Invalid value for key '{}': {}", key, e))
        })?;
        check_ranges(&updated)?;
        self.settings = updated;
        debug!(key, "setting updated");
        self.save()
    }

    fn reset(&mut self) -> Result<(), SettingsError> {
        self.settings = EditorSettings::default();
        self.save()
    }

    fn get_config_path(&self) -> &str {
        &self.config_path
    }
}

/// Rejects values that deserialize fine but cannot work.
fn check_ranges(settings: &EditorSettings) -> Result<(), SettingsError> {
    if settings.backend.request_timeout_secs == 0 {
        return Err(SettingsError::InvalidValue(
            "backend.request_timeout_secs must be at least 1".to_string(),
        ));
    }
    Ok(())
}
