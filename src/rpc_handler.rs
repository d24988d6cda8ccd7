//! RPC method handler for the bookmark editor JSON protocol.
//!
//! Kept apart from `rpc_server.rs` so it can be tested without stdin/stdout.
//! `handle_method` dispatches one call against the [`App`].

use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use tracing::debug;

use crate::app::App;
use crate::services::settings_engine::SettingsEngineTrait;
use crate::types::bookmark::TagUpdate;
use crate::types::form::{FieldValue, FormField};

fn str_param<'a>(params: &'a Value, key: &str) -> Result<&'a str, String> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| format!("missing {}", key))
}

fn string_list(params: &Value, key: &str) -> Result<Vec<String>, String> {
    match params.get(key) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|v| {
                v.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| format!("{} must contain only strings", key))
            })
            .collect(),
        Some(_) => Err(format!("{} must be an array", key)),
    }
}

/// Converts a JSON value into the value kind `field` expects. Date fields take
/// an RFC 3339 string or `null`.
pub fn parse_field_value(field: FormField, value: &Value) -> Result<FieldValue, String> {
    if field.is_date() {
        return match value {
            Value::Null => Ok(FieldValue::Date(None)),
            Value::String(s) => DateTime::parse_from_rfc3339(s)
                .map(|d| FieldValue::Date(Some(d.with_timezone(&Utc))))
                .map_err(|e| format!("invalid date for {}: {}", field.as_str(), e)),
            _ => Err(format!("{} expects a date string or null", field.as_str())),
        };
    }
    match value {
        Value::String(s) => Ok(FieldValue::Text(s.clone())),
        Value::Null => Ok(FieldValue::Text(String::new())),
        _ => Err(format!("{} expects a string", field.as_str())),
    }
}

fn snapshot(app: &App, dialog_id: &str) -> Result<Value, String> {
    let dialog = app.dialog(dialog_id).map_err(|e| e.to_string())?;
    serde_json::to_value(dialog.snapshot()).map_err(|e| e.to_string())
}

/// Dispatch one RPC call.
///
/// Returns `Ok(Value)` on success or `Err(String)` with an error message.
pub async fn handle_method(app: &mut App, method: &str, params: &Value) -> Result<Value, String> {
    debug!(method, "rpc call");
    match method {
        // ─── Dialog ───
        "dialog.open" => {
            let bookmark_id = str_param(params, "bookmarkId")?;
            let dialog_id = app.open_dialog(bookmark_id).await.map_err(|e| e.to_string())?;
            Ok(json!({"dialogId": dialog_id, "state": snapshot(app, &dialog_id)?}))
        }
        "dialog.state" => {
            let dialog_id = str_param(params, "dialogId")?;
            snapshot(app, dialog_id)
        }
        "dialog.fields" => {
            let dialog_id = str_param(params, "dialogId")?;
            let dialog = app.dialog(dialog_id).map_err(|e| e.to_string())?;
            serde_json::to_value(dialog.visible_fields()).map_err(|e| e.to_string())
        }
        "dialog.set_field" => {
            let dialog_id = str_param(params, "dialogId")?;
            let name = str_param(params, "field")?;
            let field = FormField::parse(name).ok_or_else(|| format!("unknown field: {}", name))?;
            let value = parse_field_value(field, params.get("value").unwrap_or(&Value::Null))?;
            app.dialog_mut(dialog_id)
                .map_err(|e| e.to_string())?
                .set_field(field, value)
                .map_err(|e| e.to_string())?;
            snapshot(app, dialog_id)
        }
        "dialog.refresh" => {
            let dialog_id = str_param(params, "dialogId")?;
            let rebuilt = app.refresh_dialog(dialog_id).await.map_err(|e| e.to_string())?;
            Ok(json!({"rebuilt": rebuilt, "state": snapshot(app, dialog_id)?}))
        }
        "dialog.submit" => {
            let dialog_id = str_param(params, "dialogId")?;
            let ticket = app.submit(dialog_id).map_err(|e| e.to_string())?;
            Ok(json!({"ticket": ticket}))
        }
        "dialog.cancel" => {
            let dialog_id = str_param(params, "dialogId")?;
            app.dialog_mut(dialog_id)
                .map_err(|e| e.to_string())?
                .cancel()
                .map_err(|e| e.to_string())?;
            snapshot(app, dialog_id)
        }
        "dialog.dismiss" => {
            let dialog_id = str_param(params, "dialogId")?;
            app.dialog_mut(dialog_id).map_err(|e| e.to_string())?.dismiss();
            snapshot(app, dialog_id)
        }
        "dialog.close" => {
            let dialog_id = str_param(params, "dialogId")?;
            app.close_dialog(dialog_id).map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }

        // ─── Bookmarks ───
        "bookmark.get" => {
            let bookmark_id = str_param(params, "bookmarkId")?;
            let record = app
                .api()
                .fetch_bookmark(bookmark_id)
                .await
                .map_err(|e| e.to_string())?;
            serde_json::to_value(record).map_err(|e| e.to_string())
        }
        "bookmark.tags.update" => {
            let bookmark_id = str_param(params, "bookmarkId")?;
            let update = TagUpdate {
                attach: string_list(params, "attach")?,
                detach: string_list(params, "detach")?,
            };
            let record = app
                .update_tags(bookmark_id, update)
                .await
                .map_err(|e| e.to_string())?;
            serde_json::to_value(record).map_err(|e| e.to_string())
        }

        // ─── Settings ───
        "settings.get" => {
            serde_json::to_value(app.settings_engine.get_settings()).map_err(|e| e.to_string())
        }
        "settings.set" => {
            let key = str_param(params, "key")?;
            let value = params.get("value").cloned().ok_or("missing value")?;
            app.set_setting(key, value).map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }

        _ => Err(format!("unknown method: {}", method)),
    }
}
