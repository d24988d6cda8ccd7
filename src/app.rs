//! App core for the bookmark editor host.
//!
//! Owns the settings, the bookmark backend, the open edit dialogs and the
//! channels that carry submission completions and notifications back to the
//! host's event loop.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::database::Database;
use crate::managers::edit_dialog::{EditDialog, SubmissionTicket, SubmitOutcome};
use crate::platform;
use crate::services::backend::BookmarkApi;
use crate::services::http_backend::HttpBookmarkApi;
use crate::services::local_backend::LocalBookmarkApi;
use crate::services::notifier::{ChannelNotificationSink, NotificationSink};
use crate::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use crate::services::submission::SubmissionCoordinator;
use crate::types::bookmark::{BookmarkRecord, TagUpdate};
use crate::types::errors::{AppError, UpdateError};
use crate::types::notification::Notification;
use crate::types::settings::{BackendMode, BackendSettings};

/// Result of a backend update that ran on a spawned task.
#[derive(Debug)]
pub struct SubmissionCompletion {
    pub dialog_id: String,
    pub ticket: SubmissionTicket,
    pub result: Result<BookmarkRecord, UpdateError>,
}

/// Receiving ends the host loop drains.
pub struct AppEvents {
    pub completions: UnboundedReceiver<SubmissionCompletion>,
    pub notifications: UnboundedReceiver<Notification>,
}

/// Central application struct.
pub struct App {
    pub settings_engine: SettingsEngine,
    api: Arc<dyn BookmarkApi>,
    notifier: Arc<dyn NotificationSink>,
    coordinator: SubmissionCoordinator,
    dialogs: HashMap<String, EditDialog>,
    completions: UnboundedSender<SubmissionCompletion>,
    pending: usize,
}

impl App {
    /// Creates an app over `api`. Settings must already be loaded.
    pub fn new(settings_engine: SettingsEngine, api: Arc<dyn BookmarkApi>) -> (Self, AppEvents) {
        let (notification_tx, notifications) = mpsc::unbounded_channel();
        let (completions_tx, completions) = mpsc::unbounded_channel();
        let notifier: Arc<dyn NotificationSink> =
            Arc::new(ChannelNotificationSink::new(notification_tx));
        let coordinator = SubmissionCoordinator::new(
            api.clone(),
            notifier.clone(),
            settings_engine.get_settings().notifications.clone(),
        );

        let app = Self {
            settings_engine,
            api,
            notifier,
            coordinator,
            dialogs: HashMap::new(),
            completions: completions_tx,
            pending: 0,
        };
        (
            app,
            AppEvents {
                completions,
                notifications,
            },
        )
    }

    /// Creates an app whose backend is chosen by the loaded settings.
    pub fn from_settings(settings_engine: SettingsEngine) -> Result<(Self, AppEvents), AppError> {
        let api = connect_backend(&settings_engine.get_settings().backend)?;
        Ok(Self::new(settings_engine, api))
    }

    pub fn api(&self) -> Arc<dyn BookmarkApi> {
        self.api.clone()
    }

    /// Submissions started by [`App::submit`] whose completion has not been
    /// passed to [`App::finish_submission`] yet.
    pub fn pending_submissions(&self) -> usize {
        self.pending
    }

    pub fn dialog_count(&self) -> usize {
        self.dialogs.len()
    }

    pub fn dialog(&self, dialog_id: &str) -> Result<&EditDialog, AppError> {
        self.dialogs
            .get(dialog_id)
            .ok_or_else(|| AppError::UnknownDialog(dialog_id.to_string()))
    }

    pub fn dialog_mut(&mut self, dialog_id: &str) -> Result<&mut EditDialog, AppError> {
        self.dialogs
            .get_mut(dialog_id)
            .ok_or_else(|| AppError::UnknownDialog(dialog_id.to_string()))
    }

    /// Opens the edit dialog for `bookmark_id` with a freshly fetched record.
    /// An existing dialog for the same bookmark is reused so that an update
    /// still in flight stays tracked. Returns the dialog id.
    pub async fn open_dialog(&mut self, bookmark_id: &str) -> Result<String, AppError> {
        let record = self.api.fetch_bookmark(bookmark_id).await?;
        let existing = self
            .dialogs
            .iter()
            .find(|(_, dialog)| dialog.bookmark().id == bookmark_id)
            .map(|(id, _)| id.clone());

        let dialog_id = match existing {
            Some(id) => {
                let dialog = self.dialog_mut(&id)?;
                dialog.bookmark_changed(record);
                dialog.open();
                id
            }
            None => {
                let id = Uuid::new_v4().to_string();
                let mut dialog = EditDialog::new(record);
                dialog.open();
                self.dialogs.insert(id.clone(), dialog);
                id
            }
        };
        debug!(%dialog_id, bookmark_id, "dialog ready");
        Ok(dialog_id)
    }

    /// Re-reads the dialog's bookmark from the backend and re-syncs the form.
    /// Returns whether the form was rebuilt.
    pub async fn refresh_dialog(&mut self, dialog_id: &str) -> Result<bool, AppError> {
        let bookmark_id = self.dialog(dialog_id)?.bookmark().id.clone();
        let record = self.api.fetch_bookmark(&bookmark_id).await?;
        Ok(self.dialog_mut(dialog_id)?.bookmark_changed(record))
    }

    /// Starts a submission and runs the backend update on a spawned task.
    /// The result arrives on [`AppEvents::completions`]; feed it back through
    /// [`App::finish_submission`]. Returns the ticket id.
    pub fn submit(&mut self, dialog_id: &str) -> Result<u64, AppError> {
        let coordinator = self.coordinator.clone();
        let ticket = coordinator.start(self.dialog_mut(dialog_id)?)?;
        let ticket_id = ticket.id();

        let tx = self.completions.clone();
        let dialog_id = dialog_id.to_string();
        tokio::spawn(async move {
            let result = coordinator.send(&ticket).await;
            let completion = SubmissionCompletion {
                dialog_id,
                ticket,
                result,
            };
            if tx.send(completion).is_err() {
                warn!("completion receiver dropped");
            }
        });
        self.pending += 1;
        Ok(ticket_id)
    }

    /// Applies a finished update to its dialog and emits the notification.
    /// Returns `None` when the dialog was closed and removed in the meantime.
    pub fn finish_submission(&mut self, completion: SubmissionCompletion) -> Option<SubmitOutcome> {
        let SubmissionCompletion {
            dialog_id,
            ticket,
            result,
        } = completion;
        self.pending = self.pending.saturating_sub(1);
        match self.dialogs.get_mut(&dialog_id) {
            Some(dialog) => Some(self.coordinator.finish(dialog, &ticket, result)),
            None => {
                debug!(%dialog_id, ticket = ticket.id(), "completion for removed dialog");
                self.coordinator.notify(&result);
                None
            }
        }
    }

    /// Attaches and detaches tags, then re-syncs every dialog showing the
    /// bookmark. Tag-only changes leave unsaved form edits alone.
    pub async fn update_tags(
        &mut self,
        bookmark_id: &str,
        update: TagUpdate,
    ) -> Result<BookmarkRecord, AppError> {
        let record = self.api.update_tags(bookmark_id, update).await?;
        for dialog in self
            .dialogs
            .values_mut()
            .filter(|d| d.bookmark().id == bookmark_id)
        {
            dialog.bookmark_changed(record.clone());
        }
        Ok(record)
    }

    /// Dismisses the dialog and forgets it.
    pub fn close_dialog(&mut self, dialog_id: &str) -> Result<(), AppError> {
        let mut dialog = self
            .dialogs
            .remove(dialog_id)
            .ok_or_else(|| AppError::UnknownDialog(dialog_id.to_string()))?;
        dialog.dismiss();
        debug!(%dialog_id, "dialog removed");
        Ok(())
    }

    /// Updates one setting and applies the notification texts immediately.
    /// Backend changes take effect on the next start.
    pub fn set_setting(&mut self, key: &str, value: serde_json::Value) -> Result<(), AppError> {
        self.settings_engine.set_value(key, value)?;
        self.coordinator = SubmissionCoordinator::new(
            self.api.clone(),
            self.notifier.clone(),
            self.settings_engine.get_settings().notifications.clone(),
        );
        Ok(())
    }
}

/// Builds the backend named by `settings`.
pub fn connect_backend(settings: &BackendSettings) -> Result<Arc<dyn BookmarkApi>, AppError> {
    match settings.mode {
        BackendMode::Local => {
            let path = settings
                .database_path
                .as_ref()
                .map(PathBuf::from)
                .unwrap_or_else(platform::default_database_path);
            info!(path = %path.display(), "using local bookmark database");
            Ok(Arc::new(LocalBookmarkApi::new(Database::open(&path)?)))
        }
        BackendMode::Remote => {
            info!(base_url = %settings.api_base_url, "using remote bookmark server");
            Ok(Arc::new(HttpBookmarkApi::from_settings(settings)?))
        }
    }
}
