//! Unit tests for the RPC handler: every method dispatched by `handle_method`,
//! through the same code path the `bookmark-editor-rpc` binary uses, against a
//! local in-memory bookmark database.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use serde_json::{json, Value};
use tempfile::TempDir;

use bookmark_editor::app::{App, AppEvents};
use bookmark_editor::database::Database;
use bookmark_editor::managers::bookmark_store::BookmarkStoreTrait;
use bookmark_editor::managers::edit_dialog::SubmitOutcome;
use bookmark_editor::rpc_handler::handle_method;
use bookmark_editor::services::local_backend::LocalBookmarkApi;
use bookmark_editor::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use bookmark_editor::types::bookmark::{BookmarkContent, BookmarkRecord, LinkContent, TextContent};
use bookmark_editor::types::notification::NotificationKind;

/// Fresh app over an in-memory database holding one link (`l1`) and one note (`n1`).
fn setup() -> (App, AppEvents, TempDir) {
    let tmp = TempDir::new().expect("Failed to create temp dir");
    let settings_path = tmp.path().join("settings.json").to_string_lossy().to_string();
    let mut settings = SettingsEngine::new(Some(settings_path));
    settings.load().unwrap();

    let api = LocalBookmarkApi::new(Database::open_in_memory().unwrap());
    api.with_store(|store| {
        store.insert_bookmark(&BookmarkRecord {
            id: "l1".to_string(),
            title: None,
            created_at: Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
            tags: vec![],
            content: BookmarkContent::Link(LinkContent {
                url: "https://x.com".to_string(),
                title: Some("Example".to_string()),
                ..Default::default()
            }),
        })?;
        store.insert_bookmark(&BookmarkRecord {
            id: "n1".to_string(),
            title: Some("Note".to_string()),
            created_at: None,
            tags: vec![],
            content: BookmarkContent::Text(TextContent {
                text: "hello".to_string(),
            }),
        })?;
        Ok(())
    })
    .unwrap();

    let (app, events) = App::new(settings, Arc::new(api));
    (app, events, tmp)
}

async fn open(app: &mut App, bookmark_id: &str) -> String {
    let res = handle_method(app, "dialog.open", &json!({"bookmarkId": bookmark_id}))
        .await
        .unwrap();
    res["dialogId"].as_str().unwrap().to_string()
}

// ─── Unknown method / params ───

/// Unknown methods are reported by name.
#[tokio::test]
async fn test_unknown_method_returns_error() {
    let (mut app, _events, _tmp) = setup();
    let res = handle_method(&mut app, "nonexistent.method", &json!({})).await;
    assert!(res.unwrap_err().contains("unknown method"));
}

/// Missing parameters and unknown dialogs are reported.
#[tokio::test]
async fn test_missing_params_are_reported() {
    let (mut app, _events, _tmp) = setup();
    let res = handle_method(&mut app, "dialog.open", &json!({})).await;
    assert_eq!(res.unwrap_err(), "missing bookmarkId");

    let res = handle_method(&mut app, "dialog.state", &json!({"dialogId": "nope"})).await;
    assert_eq!(res.unwrap_err(), "No edit dialog with id: nope");
}

// ─── Dialog ───

/// dialog.open returns the dialog id and projected state.
#[tokio::test]
async fn test_open_returns_projected_state() {
    let (mut app, _events, _tmp) = setup();
    let res = handle_method(&mut app, "dialog.open", &json!({"bookmarkId": "l1"}))
        .await
        .unwrap();

    let state = &res["state"];
    assert_eq!(state["phase"], "editing");
    assert_eq!(state["editableAsLink"], true);
    assert_eq!(state["values"]["bookmarkId"], "l1");
    assert_eq!(state["values"]["title"], "Example");
    assert_eq!(state["values"]["link"]["url"], "https://x.com");
    assert_eq!(state["values"]["link"]["description"], "");
}

/// dialog.open on an unknown bookmark creates no dialog.
#[tokio::test]
async fn test_open_unknown_bookmark_fails() {
    let (mut app, _events, _tmp) = setup();
    let res = handle_method(&mut app, "dialog.open", &json!({"bookmarkId": "ghost"})).await;
    assert_eq!(res.unwrap_err(), "Bookmark not found: ghost");
    assert_eq!(app.dialog_count(), 0);
}

/// Reopening a bookmark reuses its dialog.
#[tokio::test]
async fn test_reopening_reuses_the_dialog() {
    let (mut app, _events, _tmp) = setup();
    let first = open(&mut app, "l1").await;
    handle_method(&mut app, "dialog.dismiss", &json!({"dialogId": first}))
        .await
        .unwrap();
    let second = open(&mut app, "l1").await;
    assert_eq!(first, second);
    assert_eq!(app.dialog_count(), 1);
}

/// Note dialogs list no link inputs and refuse link writes.
#[tokio::test]
async fn test_fields_for_note_exclude_link_inputs() {
    let (mut app, _events, _tmp) = setup();
    let dialog_id = open(&mut app, "n1").await;

    let res = handle_method(&mut app, "dialog.fields", &json!({"dialogId": dialog_id}))
        .await
        .unwrap();
    let fields: Vec<&str> = res
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["title", "createdAt"]);

    let res = handle_method(
        &mut app,
        "dialog.set_field",
        &json!({"dialogId": dialog_id, "field": "url", "value": "https://y.com"}),
    )
    .await;
    assert_eq!(
        res.unwrap_err(),
        "Field 'url' is not editable for this bookmark"
    );
}

/// dialog.set_field parses text and RFC 3339 dates.
#[tokio::test]
async fn test_set_field_text_and_dates() {
    let (mut app, _events, _tmp) = setup();
    let dialog_id = open(&mut app, "l1").await;

    let state = handle_method(
        &mut app,
        "dialog.set_field",
        &json!({"dialogId": dialog_id, "field": "author", "value": "Jane"}),
    )
    .await
    .unwrap();
    assert_eq!(state["values"]["link"]["author"], "Jane");
    assert_eq!(state["dirtyFields"], json!(["author"]));

    let state = handle_method(
        &mut app,
        "dialog.set_field",
        &json!({"dialogId": dialog_id, "field": "datePublished", "value": "2023-05-01T12:00:00Z"}),
    )
    .await
    .unwrap();
    assert_eq!(
        state["values"]["link"]["datePublished"],
        "2023-05-01T12:00:00Z"
    );

    let res = handle_method(
        &mut app,
        "dialog.set_field",
        &json!({"dialogId": dialog_id, "field": "datePublished", "value": "yesterday"}),
    )
    .await;
    assert!(res.unwrap_err().starts_with("invalid date for datePublished"));

    let res = handle_method(
        &mut app,
        "dialog.set_field",
        &json!({"dialogId": dialog_id, "field": "colour", "value": "red"}),
    )
    .await;
    assert_eq!(res.unwrap_err(), "unknown field: colour");
}

/// Submit runs in the background and reports through both channels.
#[tokio::test]
async fn test_submit_flow_saves_and_notifies() {
    let (mut app, mut events, _tmp) = setup();
    let dialog_id = open(&mut app, "l1").await;
    handle_method(
        &mut app,
        "dialog.set_field",
        &json!({"dialogId": dialog_id, "field": "author", "value": "  Jane  "}),
    )
    .await
    .unwrap();

    let res = handle_method(&mut app, "dialog.submit", &json!({"dialogId": dialog_id}))
        .await
        .unwrap();
    assert!(res["ticket"].as_u64().is_some());
    assert_eq!(app.pending_submissions(), 1);

    let state = handle_method(&mut app, "dialog.state", &json!({"dialogId": dialog_id}))
        .await
        .unwrap();
    assert_eq!(state["phase"], "submitting");
    assert_eq!(state["submitting"], true);

    let again = handle_method(&mut app, "dialog.submit", &json!({"dialogId": dialog_id})).await;
    assert!(again.unwrap_err().contains("already in flight"));

    let cancel = handle_method(&mut app, "dialog.cancel", &json!({"dialogId": dialog_id})).await;
    assert_eq!(
        cancel.unwrap_err(),
        "Cannot cancel while a submission is in flight"
    );

    let completion = events.completions.recv().await.unwrap();
    assert_eq!(app.finish_submission(completion), Some(SubmitOutcome::Saved));
    assert_eq!(app.pending_submissions(), 0);

    let notification = events.notifications.recv().await.unwrap();
    assert_eq!(notification.kind, NotificationKind::Success);
    assert_eq!(notification.message, "Bookmark details updated successfully!");

    let state = handle_method(&mut app, "dialog.state", &json!({"dialogId": dialog_id}))
        .await
        .unwrap();
    assert_eq!(state["phase"], "closed");
    assert_eq!(state["values"]["link"]["author"], "Jane");

    let record = handle_method(&mut app, "bookmark.get", &json!({"bookmarkId": "l1"}))
        .await
        .unwrap();
    assert_eq!(record["content"]["author"], "Jane");
    assert_eq!(record["title"], "Example");
}

/// An invalid URL blocks dialog.submit.
#[tokio::test]
async fn test_submit_with_invalid_url_is_rejected() {
    let (mut app, _events, _tmp) = setup();
    let dialog_id = open(&mut app, "l1").await;
    handle_method(
        &mut app,
        "dialog.set_field",
        &json!({"dialogId": dialog_id, "field": "url", "value": ""}),
    )
    .await
    .unwrap();

    let res = handle_method(&mut app, "dialog.submit", &json!({"dialogId": dialog_id})).await;
    assert_eq!(res.unwrap_err(), "Validation failed: url: URL is required");

    let state = handle_method(&mut app, "dialog.state", &json!({"dialogId": dialog_id}))
        .await
        .unwrap();
    assert_eq!(state["errors"]["url"], "URL is required");
    assert_eq!(state["phase"], "editing");
}

/// A save finishing after dialog.close only notifies.
#[tokio::test]
async fn test_completion_after_close_only_notifies() {
    let (mut app, mut events, _tmp) = setup();
    let dialog_id = open(&mut app, "l1").await;
    handle_method(&mut app, "dialog.submit", &json!({"dialogId": dialog_id}))
        .await
        .unwrap();
    handle_method(&mut app, "dialog.close", &json!({"dialogId": dialog_id}))
        .await
        .unwrap();
    assert_eq!(app.dialog_count(), 0);
    assert_eq!(app.pending_submissions(), 1);

    let completion = events.completions.recv().await.unwrap();
    assert_eq!(app.finish_submission(completion), None);
    assert_eq!(app.pending_submissions(), 0);
    assert_eq!(
        events.notifications.recv().await.unwrap().kind,
        NotificationKind::Success
    );
}

/// dialog.cancel discards edits.
#[tokio::test]
async fn test_cancel_discards_edits() {
    let (mut app, _events, _tmp) = setup();
    let dialog_id = open(&mut app, "l1").await;
    handle_method(
        &mut app,
        "dialog.set_field",
        &json!({"dialogId": dialog_id, "field": "title", "value": "Changed"}),
    )
    .await
    .unwrap();

    let state = handle_method(&mut app, "dialog.cancel", &json!({"dialogId": dialog_id}))
        .await
        .unwrap();
    assert_eq!(state["phase"], "closed");
    assert_eq!(state["values"]["title"], "Example");
    assert_eq!(state["dirty"], false);
}

// ─── Tags / refresh ───

/// bookmark.tags.update keeps unsaved form edits.
#[tokio::test]
async fn test_tag_update_keeps_unsaved_edits() {
    let (mut app, _events, _tmp) = setup();
    let dialog_id = open(&mut app, "l1").await;
    handle_method(
        &mut app,
        "dialog.set_field",
        &json!({"dialogId": dialog_id, "field": "publisher", "value": "ACME"}),
    )
    .await
    .unwrap();

    let record = handle_method(
        &mut app,
        "bookmark.tags.update",
        &json!({"bookmarkId": "l1", "attach": ["rust", "web"]}),
    )
    .await
    .unwrap();
    let names: Vec<&str> = record["tags"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["rust", "web"]);

    let state = handle_method(&mut app, "dialog.state", &json!({"dialogId": dialog_id}))
        .await
        .unwrap();
    assert_eq!(state["values"]["link"]["publisher"], "ACME");

    let res = handle_method(
        &mut app,
        "bookmark.tags.update",
        &json!({"bookmarkId": "l1", "attach": "rust"}),
    )
    .await;
    assert_eq!(res.unwrap_err(), "attach must be an array");
}

/// dialog.refresh without remote changes keeps edits.
#[tokio::test]
async fn test_refresh_without_changes_keeps_edits() {
    let (mut app, _events, _tmp) = setup();
    let dialog_id = open(&mut app, "l1").await;
    handle_method(
        &mut app,
        "dialog.set_field",
        &json!({"dialogId": dialog_id, "field": "title", "value": "Draft"}),
    )
    .await
    .unwrap();

    let res = handle_method(&mut app, "dialog.refresh", &json!({"dialogId": dialog_id}))
        .await
        .unwrap();
    assert_eq!(res["rebuilt"], false);
    assert_eq!(res["state"]["values"]["title"], "Draft");
}

// ─── Settings ───

/// settings.set applies new notification texts to the next save.
#[tokio::test]
async fn test_settings_get_and_set() {
    let (mut app, mut events, _tmp) = setup();
    let settings = handle_method(&mut app, "settings.get", &json!({})).await.unwrap();
    assert_eq!(settings["backend"]["mode"], "Local");

    handle_method(
        &mut app,
        "settings.set",
        &json!({"key": "notifications.success_message", "value": "Saved!"}),
    )
    .await
    .unwrap();
    let res = handle_method(&mut app, "settings.set", &json!({"key": "backend.mode"})).await;
    assert_eq!(res.unwrap_err(), "missing value");

    // New notification texts apply to the next submission.
    let dialog_id = open(&mut app, "n1").await;
    handle_method(&mut app, "dialog.submit", &json!({"dialogId": dialog_id}))
        .await
        .unwrap();
    let completion = events.completions.recv().await.unwrap();
    app.finish_submission(completion);
    assert_eq!(events.notifications.recv().await.unwrap().message, "Saved!");

    let value: Value = handle_method(&mut app, "settings.get", &json!({})).await.unwrap();
    assert_eq!(value["notifications"]["success_message"], "Saved!");
}

/// A zero request timeout is refused over RPC.
#[tokio::test]
async fn test_zero_timeout_setting_is_rejected() {
    let (mut app, _events, _tmp) = setup();
    let res = handle_method(
        &mut app,
        "settings.set",
        &json!({"key": "backend.request_timeout_secs", "value": 0}),
    )
    .await;
    assert!(res.unwrap_err().starts_with("Invalid settings value:"));
}
