//! Edit dialog state machine.
//!
//! Closed -> Editing (freshly projected) -> Submitting -> Closed on success
//! (re-projected from the server record) or back to Editing on failure.
//! Cancel goes straight to Closed and discards edits.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::managers::form_state::{FormState, FormStateTrait};
use crate::services::projection::project;
use crate::services::submission::build_update_request;
use crate::services::visibility::{self, FieldDescriptor};
use crate::types::bookmark::BookmarkRecord;
use crate::types::errors::{DialogError, SubmitError, UpdateError};
use crate::types::form::{EditableFormState, FieldValue, FormField, UpdateBookmarkRequest};

/// Dialog-level phase.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum DialogPhase {
    Closed,
    Editing,
    Submitting,
}

/// Handle for one submission, returned by [`EditDialog::begin_submit`].
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionTicket {
    id: u64,
    session: u64,
    payload: UpdateBookmarkRequest,
}

impl SubmissionTicket {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn bookmark_id(&self) -> &str {
        &self.payload.bookmark_id
    }

    pub fn payload(&self) -> &UpdateBookmarkRequest {
        &self.payload
    }
}

/// How a completed submission affected the dialog.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// The update succeeded; the dialog closed with state re-projected.
    Saved,
    /// The update failed; the dialog is back in Editing with edits intact.
    Failed { message: String },
    /// The dialog was closed, reopened, or switched bookmark before the update
    /// finished; its state was left alone.
    Detached { succeeded: bool },
}

/// Serializable view of the dialog for hosts.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DialogSnapshot {
    pub phase: DialogPhase,
    pub values: EditableFormState,
    pub editable_as_link: bool,
    pub dirty: bool,
    pub dirty_fields: Vec<FormField>,
    pub errors: BTreeMap<String, String>,
    pub submitting: bool,
}

/// One edit dialog bound to one bookmark at a time.
pub struct EditDialog {
    bookmark: BookmarkRecord,
    form: FormState,
    phase: DialogPhase,
    session: u64,
    next_ticket: u64,
    in_flight: Option<u64>,
}

impl EditDialog {
    /// Creates a closed dialog for `bookmark`.
    pub fn new(bookmark: BookmarkRecord) -> Self {
        let form = FormState::new(project(&bookmark, Utc::now()));
        Self {
            bookmark,
            form,
            phase: DialogPhase::Closed,
            session: 0,
            next_ticket: 0,
            in_flight: None,
        }
    }

    pub fn bookmark(&self) -> &BookmarkRecord {
        &self.bookmark
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    pub fn phase(&self) -> DialogPhase {
        self.phase
    }

    pub fn is_open(&self) -> bool {
        self.phase != DialogPhase::Closed
    }

    /// Whether an update request is outstanding, even if the dialog was closed since.
    pub fn is_submitting(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn is_editable_as_link(&self) -> bool {
        visibility::is_editable_as_link(&self.bookmark)
    }

    pub fn visible_fields(&self) -> Vec<FieldDescriptor> {
        visibility::visible_fields(&self.bookmark)
    }

    pub fn open(&mut self) -> bool {
        self.open_at(Utc::now())
    }

    /// Opens the dialog with a freshly projected state. Returns `false` when
    /// it was already open.
    pub fn open_at(&mut self, now: DateTime<Utc>) -> bool {
        if self.is_open() {
            return false;
        }
        self.session += 1;
        self.form.replace(project(&self.bookmark, now));
        self.form.set_submitting(self.in_flight.is_some());
        self.phase = DialogPhase::Editing;
        info!(bookmark_id = %self.bookmark.id, session = self.session, "edit dialog opened");
        true
    }

    pub fn bookmark_changed(&mut self, record: BookmarkRecord) -> bool {
        self.bookmark_changed_at(record, Utc::now())
    }

    /// Re-sync event raised by the host when it observes a new version of the
    /// bookmark. Rebuilds the form when the identity or editable content
    /// changed while open; the external version wins over unsaved edits.
    /// Returns whether the form was rebuilt.
    pub fn bookmark_changed_at(&mut self, record: BookmarkRecord, now: DateTime<Utc>) -> bool {
        let identity_changed = record.id != self.bookmark.id;
        let content_changed = !self.bookmark.same_editable_source(&record);
        self.bookmark = record;

        if identity_changed {
            // Completions for the previous bookmark must not land on this one.
            self.session += 1;
            if self.phase == DialogPhase::Submitting {
                self.phase = DialogPhase::Editing;
            }
        }

        if !content_changed {
            return false;
        }

        if self.is_open() {
            if self.form.is_dirty() {
                warn!(bookmark_id = %self.bookmark.id, "discarding unsaved edits after external change");
            }
            self.form.replace(project(&self.bookmark, now));
            true
        } else {
            self.form.replace(project(&self.bookmark, now));
            false
        }
    }

    pub fn set_field(&mut self, field: FormField, value: FieldValue) -> Result<(), DialogError> {
        self.set_field_at(field, value, Utc::now())
    }

    /// Applies one user edit. Inputs stay live while a submission is pending.
    pub fn set_field_at(
        &mut self,
        field: FormField,
        value: FieldValue,
        now: DateTime<Utc>,
    ) -> Result<(), DialogError> {
        if !self.is_open() {
            return Err(DialogError::NotOpen);
        }
        self.form.set_field_at(field, value, now)?;
        Ok(())
    }

    /// Cancel button: closes and discards edits. Disabled while saving.
    pub fn cancel(&mut self) -> Result<(), DialogError> {
        if self.phase == DialogPhase::Submitting {
            return Err(DialogError::SubmissionInFlight);
        }
        self.close();
        Ok(())
    }

    /// Outside dismissal: always closes. An outstanding update keeps running.
    pub fn dismiss(&mut self) {
        if self.phase == DialogPhase::Submitting {
            debug!(bookmark_id = %self.bookmark.id, "dialog dismissed with update in flight");
        }
        self.close();
    }

    fn close(&mut self) {
        if self.is_open() {
            self.form.reset();
            self.phase = DialogPhase::Closed;
            debug!(bookmark_id = %self.bookmark.id, "edit dialog closed");
        }
    }

    /// Validates the form and, when valid, moves to Submitting and hands out
    /// the payload. Rejects while another submission is outstanding.
    pub fn begin_submit(&mut self) -> Result<SubmissionTicket, SubmitError> {
        if !self.is_open() {
            return Err(SubmitError::NotOpen);
        }
        if self.in_flight.is_some() {
            return Err(SubmitError::AlreadySubmitting(self.bookmark.id.clone()));
        }
        self.form.validate().map_err(SubmitError::Validation)?;

        self.next_ticket += 1;
        let ticket = SubmissionTicket {
            id: self.next_ticket,
            session: self.session,
            payload: build_update_request(self.form.values()),
        };
        self.in_flight = Some(ticket.id);
        self.form.set_submitting(true);
        self.phase = DialogPhase::Submitting;
        info!(bookmark_id = %ticket.bookmark_id(), ticket = ticket.id, "submission started");
        Ok(ticket)
    }

    pub fn complete_submit(
        &mut self,
        ticket: &SubmissionTicket,
        result: &Result<BookmarkRecord, UpdateError>,
    ) -> SubmitOutcome {
        self.complete_submit_at(ticket, result, Utc::now())
    }

    /// Reconciles the dialog with the result of `ticket`'s update.
    pub fn complete_submit_at(
        &mut self,
        ticket: &SubmissionTicket,
        result: &Result<BookmarkRecord, UpdateError>,
        now: DateTime<Utc>,
    ) -> SubmitOutcome {
        if self.in_flight == Some(ticket.id) {
            self.in_flight = None;
            self.form.set_submitting(false);
        }

        let attached = ticket.session == self.session
            && self.phase == DialogPhase::Submitting
            && ticket.bookmark_id() == self.bookmark.id;
        if !attached {
            debug!(ticket = ticket.id, "submission finished after dialog moved on");
            if let Ok(updated) = result {
                self.adopt_detached_save(updated, now);
            }
            return SubmitOutcome::Detached {
                succeeded: result.is_ok(),
            };
        }

        match result {
            Ok(updated) => {
                self.bookmark = updated.clone();
                self.form.replace(project(&self.bookmark, now));
                self.phase = DialogPhase::Closed;
                info!(bookmark_id = %self.bookmark.id, "bookmark details saved");
                SubmitOutcome::Saved
            }
            Err(err) => {
                self.phase = DialogPhase::Editing;
                warn!(bookmark_id = %self.bookmark.id, error = %err, "bookmark update failed");
                SubmitOutcome::Failed {
                    message: err.to_string(),
                }
            }
        }
    }

    /// Keeps the server-confirmed record of a save whose dialog moved on, so a
    /// later open projects it. A form open in a newer session keeps its edits.
    fn adopt_detached_save(&mut self, updated: &BookmarkRecord, now: DateTime<Utc>) {
        if updated.id != self.bookmark.id {
            return;
        }
        self.bookmark = updated.clone();
        if !self.is_open() {
            self.form.replace(project(&self.bookmark, now));
        }
        debug!(bookmark_id = %self.bookmark.id, "adopted record from detached save");
    }

    pub fn snapshot(&self) -> DialogSnapshot {
        DialogSnapshot {
            phase: self.phase,
            values: self.form.values().clone(),
            editable_as_link: self.is_editable_as_link(),
            dirty: self.form.is_dirty(),
            dirty_fields: self.form.dirty_fields(),
            errors: self
                .form
                .errors()
                .iter()
                .map(|(f, m)| (f.as_str().to_string(), m.to_string()))
                .collect(),
            submitting: self.is_submitting(),
        }
    }
}
