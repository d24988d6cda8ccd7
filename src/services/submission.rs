//! Submission coordinator.
//!
//! Turns the dialog's form state into an update request, runs exactly one
//! backend update per accepted submit, reconciles the dialog with the result
//! and emits a notification either way.

use std::sync::Arc;

use tracing::{debug, error};

use crate::managers::edit_dialog::{EditDialog, SubmissionTicket, SubmitOutcome};
use crate::services::backend::BookmarkApi;
use crate::services::notifier::NotificationSink;
use crate::types::bookmark::BookmarkRecord;
use crate::types::errors::{SubmitError, UpdateError};
use crate::types::form::{EditableFormState, LinkPatch, UpdateBookmarkRequest};
use crate::types::notification::Notification;
use crate::types::settings::NotificationSettings;

/// Builds the request payload for `state`.
///
/// An empty or unset title becomes `None`, which the backend reads as "clear
/// the title". Empty link text fields become `None` as well, so the display
/// sentinel never reaches the backend. Non-link forms carry no link patch.
pub fn build_update_request(state: &EditableFormState) -> UpdateBookmarkRequest {
    UpdateBookmarkRequest {
        bookmark_id: state.bookmark_id.clone(),
        title: non_empty(state.title.as_deref()),
        created_at: state.created_at,
        link: state.link.as_ref().map(|link| LinkPatch {
            url: link.url.clone(),
            description: non_empty(Some(&link.description)),
            author: non_empty(Some(&link.author)),
            publisher: non_empty(Some(&link.publisher)),
            date_published: link.date_published,
            date_modified: link.date_modified,
        }),
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}

/// Runs dialog submissions against a [`BookmarkApi`].
#[derive(Clone)]
pub struct SubmissionCoordinator {
    api: Arc<dyn BookmarkApi>,
    notifier: Arc<dyn NotificationSink>,
    messages: NotificationSettings,
}

impl SubmissionCoordinator {
    pub fn new(
        api: Arc<dyn BookmarkApi>,
        notifier: Arc<dyn NotificationSink>,
        messages: NotificationSettings,
    ) -> Self {
        Self {
            api,
            notifier,
            messages,
        }
    }

    /// Full submit: start, await the update, finish.
    pub async fn submit(&self, dialog: &mut EditDialog) -> Result<SubmitOutcome, SubmitError> {
        let ticket = self.start(dialog)?;
        let result = self.send(&ticket).await;
        Ok(self.finish(dialog, &ticket, result))
    }

    /// Validates and claims the dialog's single submission slot.
    pub fn start(&self, dialog: &mut EditDialog) -> Result<SubmissionTicket, SubmitError> {
        dialog.begin_submit()
    }

    /// Performs the backend update for `ticket`. Does not touch any dialog, so
    /// hosts may run it on a spawned task.
    pub async fn send(&self, ticket: &SubmissionTicket) -> Result<BookmarkRecord, UpdateError> {
        debug!(bookmark_id = %ticket.bookmark_id(), "sending bookmark update");
        self.api.update_bookmark(ticket.payload().clone()).await
    }

    /// Applies the result to `dialog` and notifies. Notifications are emitted
    /// even when the dialog has moved on in the meantime.
    pub fn finish(
        &self,
        dialog: &mut EditDialog,
        ticket: &SubmissionTicket,
        result: Result<BookmarkRecord, UpdateError>,
    ) -> SubmitOutcome {
        let outcome = dialog.complete_submit(ticket, &result);
        self.notify(&result);
        outcome
    }

    /// Emits the success or failure toast for a finished update.
    pub fn notify(&self, result: &Result<BookmarkRecord, UpdateError>) {
        match result {
            Ok(_) => self
                .notifier
                .notify(Notification::success(&self.messages.success_message)),
            Err(err) => {
                error!(error = %err, "bookmark update failed");
                self.notifier.notify(Notification::error(
                    &self.messages.failure_title,
                    err.to_string(),
                ));
            }
        }
    }
}
