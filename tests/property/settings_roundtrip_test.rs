//! Property-based tests for settings persistence.
//!
//! Any settings value written through the engine must come back unchanged
//! after a save and a fresh load from disk.

use bookmark_editor::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use bookmark_editor::types::settings::{
    BackendMode, BackendSettings, EditorSettings, LoggingSettings, NotificationSettings,
};
use proptest::prelude::*;
use serde_json::json;
use tempfile::TempDir;

fn arb_backend_settings() -> impl Strategy<Value = BackendSettings> {
    (
        prop_oneof![Just(BackendMode::Local), Just(BackendMode::Remote)],
        proptest::option::of("/[a-z]{1,10}/[a-z]{1,10}\\.db"),
        "https?://[a-z]{3,12}\\.(com|org|io)(:[0-9]{2,4})?",
        proptest::option::of("[A-Za-z0-9]{8,32}"),
        1u64..600,
    )
        .prop_map(
            |(mode, database_path, api_base_url, api_key, request_timeout_secs)| BackendSettings {
                mode,
                database_path,
                api_base_url,
                api_key,
                request_timeout_secs,
            },
        )
}

fn arb_editor_settings() -> impl Strategy<Value = EditorSettings> {
    (
        arb_backend_settings(),
        prop_oneof![Just("info"), Just("debug"), Just("warn"), Just("bookmark_editor=trace")],
        any::<bool>(),
        "[A-Za-z !.]{1,40}",
        "[A-Za-z !.]{1,40}",
    )
        .prop_map(|(backend, level, json, success_message, failure_title)| EditorSettings {
            backend,
            logging: LoggingSettings {
                level: level.to_string(),
                json,
            },
            notifications: NotificationSettings {
                success_message,
                failure_title,
            },
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    #[test]
    fn settings_survive_set_value_and_reload(settings in arb_editor_settings()) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json").to_string_lossy().to_string();
        let mut engine = SettingsEngine::new(Some(path.clone()));
        engine.load().unwrap();

        for section in ["backend", "logging", "notifications"] {
            let value = serde_json::to_value(&settings).unwrap()[section].clone();
            engine.set_value(section, value).unwrap();
        }
        prop_assert_eq!(engine.get_settings(), &settings);

        let mut reloaded = SettingsEngine::new(Some(path));
        prop_assert_eq!(reloaded.load().unwrap(), settings);
    }

    #[test]
    fn notification_texts_update_individually(message in "[A-Za-z0-9 !]{1,60}") {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json").to_string_lossy().to_string();
        let mut engine = SettingsEngine::new(Some(path));
        engine.load().unwrap();

        engine.set_value("notifications.success_message", json!(message.clone())).unwrap();
        prop_assert_eq!(&engine.get_settings().notifications.success_message, &message);
        prop_assert_eq!(
            &engine.get_settings().notifications.failure_title,
            &NotificationSettings::default().failure_title
        );
    }
}
