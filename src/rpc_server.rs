//! Bookmark editor RPC server: newline-delimited JSON over stdin/stdout.
//!
//! Request:  {"id":1, "method":"dialog.open", "params":{"bookmarkId":"..."}}
//! Response: {"id":1, "result":{...}} or {"id":1, "error":"..."}
//! Events:   {"event":"ready"|"notification"|"submission", ...}
//!
//! Logs go to stderr; stdout carries only protocol lines.

use std::io::{self, Write};
use std::time::Instant;

use bookmark_editor::app::{App, SubmissionCompletion};
use bookmark_editor::managers::edit_dialog::SubmitOutcome;
use bookmark_editor::rpc_handler::handle_method;
use bookmark_editor::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use bookmark_editor::types::settings::LoggingSettings;

use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Fixed-window limiter: at most `max_per_second` requests per second.
struct RateLimiter {
    window_start: Instant,
    request_count: u32,
    max_per_second: u32,
}

impl RateLimiter {
    fn new(max_per_second: u32) -> Self {
        Self {
            window_start: Instant::now(),
            request_count: 0,
            max_per_second,
        }
    }

    fn check(&mut self) -> bool {
        if self.window_start.elapsed().as_secs() >= 1 {
            self.window_start = Instant::now();
            self.request_count = 0;
        }
        self.request_count += 1;
        self.request_count <= self.max_per_second
    }
}

fn init_tracing(logging: &LoggingSettings) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let json_layer = logging
        .json
        .then(|| fmt::layer().json().with_writer(io::stderr));
    let text_layer = (!logging.json).then(|| fmt::layer().with_writer(io::stderr));
    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(text_layer)
        .init();
}

fn emit(line: &Value) {
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{}", line);
    let _ = stdout.flush();
}

fn completion_event(app: &mut App, completion: SubmissionCompletion) -> Value {
    let dialog_id = completion.dialog_id.clone();
    let ticket = completion.ticket.id();
    let outcome = match app.finish_submission(completion) {
        Some(SubmitOutcome::Saved) => json!({"status": "saved"}),
        Some(SubmitOutcome::Failed { message }) => json!({"status": "failed", "message": message}),
        Some(SubmitOutcome::Detached { succeeded }) => {
            json!({"status": "detached", "succeeded": succeeded})
        }
        None => json!({"status": "detached"}),
    };
    json!({"event": "submission", "dialogId": dialog_id, "ticket": ticket, "outcome": outcome})
}

async fn handle_line(app: &mut App, limiter: &mut RateLimiter, line: &str) -> Value {
    let req: Value = match serde_json::from_str(line) {
        Ok(v) => v,
        Err(e) => return json!({"id": null, "error": format!("parse error: {}", e)}),
    };
    let id = req.get("id").cloned().unwrap_or(Value::Null);

    if !limiter.check() {
        return json!({"id": id, "error": "rate limit exceeded"});
    }

    let method = req.get("method").and_then(|v| v.as_str()).unwrap_or("");
    let params = req.get("params").cloned().unwrap_or(json!({}));
    match handle_method(app, method, &params).await {
        Ok(val) => json!({"id": id, "result": val}),
        Err(err) => json!({"id": id, "error": err}),
    }
}

#[tokio::main]
async fn main() {
    let mut settings_engine = SettingsEngine::new(None);
    let settings = settings_engine.load();
    let logging = settings
        .as_ref()
        .map(|s| s.logging.clone())
        .unwrap_or_default();
    init_tracing(&logging);
    if let Err(e) = &settings {
        tracing::warn!(error = %e, "falling back to default settings");
    }

    let (mut app, mut events) = match App::from_settings(settings_engine) {
        Ok(pair) => pair,
        Err(e) => {
            tracing::error!(error = %e, "failed to start bookmark editor");
            emit(&json!({"event": "fatal", "error": e.to_string()}));
            std::process::exit(1);
        }
    };

    emit(&json!({"event": "ready", "version": env!("CARGO_PKG_VERSION")}));
    tracing::info!("bookmark editor rpc server ready");

    let mut rate_limiter = RateLimiter::new(200);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(l)) => l,
                    Ok(None) => break,
                    Err(e) => {
                        tracing::warn!(error = %e, "stdin read failed");
                        break;
                    }
                };
                if line.trim().is_empty() {
                    continue;
                }
                let response = handle_line(&mut app, &mut rate_limiter, &line).await;
                emit(&response);
            }
            Some(completion) = events.completions.recv() => {
                let event = completion_event(&mut app, completion);
                emit(&event);
            }
            Some(notification) = events.notifications.recv() => {
                emit(&json!({"event": "notification", "notification": notification}));
            }
        }
    }

    // Updates already sent keep running; report them before exiting.
    let pending = app.pending_submissions();
    if pending > 0 {
        tracing::info!(pending, "stdin closed, waiting for in-flight updates");
    }
    while app.pending_submissions() > 0 {
        tokio::select! {
            Some(completion) = events.completions.recv() => {
                let event = completion_event(&mut app, completion);
                emit(&event);
            }
            Some(notification) = events.notifications.recv() => {
                emit(&json!({"event": "notification", "notification": notification}));
            }
            else => break,
        }
    }
    while let Ok(notification) = events.notifications.try_recv() {
        emit(&json!({"event": "notification", "notification": notification}));
    }
    tracing::info!("stdin closed, shutting down");
}
