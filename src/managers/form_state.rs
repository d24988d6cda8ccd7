//! Form state container for the edit dialog.
//!
//! Owns the current field values together with the baseline they were
//! projected from, field-level validation messages, and the
//! submission-in-flight flag. Holds no backend handle.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::services::validation::{self, is_selectable_date};
use crate::types::errors::{FormError, ValidationErrors};
use crate::types::form::{EditableFormState, FieldValue, FormField};

/// Trait defining the form container interface.
pub trait FormStateTrait {
    fn values(&self) -> &EditableFormState;
    fn baseline(&self) -> &EditableFormState;
    fn replace(&mut self, state: EditableFormState);
    fn set_field(&mut self, field: FormField, value: FieldValue) -> Result<(), FormError>;
    fn reset(&mut self);
    fn is_dirty(&self) -> bool;
    fn dirty_fields(&self) -> Vec<FormField>;
    fn validate(&mut self) -> Result<(), ValidationErrors>;
    fn errors(&self) -> &ValidationErrors;
    fn is_submitting(&self) -> bool;
}

/// In-memory form state.
#[derive(Debug, Clone)]
pub struct FormState {
    values: EditableFormState,
    baseline: EditableFormState,
    errors: ValidationErrors,
    submitting: bool,
}

impl FormState {
    pub fn new(initial: EditableFormState) -> Self {
        Self {
            values: initial.clone(),
            baseline: initial,
            errors: ValidationErrors::new(),
            submitting: false,
        }
    }

    pub(crate) fn set_submitting(&mut self, submitting: bool) {
        self.submitting = submitting;
    }

    /// Like [`FormStateTrait::set_field`], checking picked dates against `now`.
    pub fn set_field_at(
        &mut self,
        field: FormField,
        value: FieldValue,
        now: DateTime<Utc>,
    ) -> Result<(), FormError> {
        if field == FormField::BookmarkId {
            return Err(FormError::ReadOnly(field));
        }
        if field.is_link_only() && self.values.link.is_none() {
            return Err(FormError::InapplicableField(field));
        }

        match value {
            FieldValue::Text(text) => self.write_text(field, text)?,
            FieldValue::Date(date) => self.write_date(field, date, now)?,
        }

        self.errors.remove(field);
        debug!(field = field.as_str(), "form field updated");
        Ok(())
    }

    fn write_text(&mut self, field: FormField, text: String) -> Result<(), FormError> {
        if field.is_date() {
            return Err(FormError::WrongValueKind {
                field,
                expected: "date",
            });
        }
        if field == FormField::Title {
            self.values.title = Some(text);
            return Ok(());
        }
        let link = self
            .values
            .link
            .as_mut()
            .ok_or(FormError::InapplicableField(field))?;
        match field {
            FormField::Url => link.url = text,
            FormField::Description => link.description = text,
            FormField::Author => link.author = text,
            FormField::Publisher => link.publisher = text,
            _ => return Err(FormError::ReadOnly(field)),
        }
        Ok(())
    }

    fn write_date(
        &mut self,
        field: FormField,
        date: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Result<(), FormError> {
        if !field.is_date() {
            return Err(FormError::WrongValueKind {
                field,
                expected: "text",
            });
        }
        if let Some(d) = date {
            if !is_selectable_date(d, now) {
                return Err(FormError::DateOutOfRange(field));
            }
        }

        match field {
            FormField::CreatedAt => {
                self.values.created_at = date.ok_or(FormError::RequiredField(field))?;
            }
            FormField::DatePublished | FormField::DateModified => {
                let link = self
                    .values
                    .link
                    .as_mut()
                    .ok_or(FormError::InapplicableField(field))?;
                if field == FormField::DatePublished {
                    link.date_published = date;
                } else {
                    link.date_modified = date;
                }
            }
            _ => {
                return Err(FormError::WrongValueKind {
                    field,
                    expected: "text",
                })
            }
        }
        Ok(())
    }

    fn field_differs(&self, field: FormField) -> bool {
        let (v, b) = (&self.values, &self.baseline);
        match field {
            FormField::BookmarkId => v.bookmark_id != b.bookmark_id,
            FormField::Title => v.title != b.title,
            FormField::CreatedAt => v.created_at != b.created_at,
            FormField::Url => v.url() != b.url(),
            FormField::Description => v.description() != b.description(),
            FormField::Author => v.author() != b.author(),
            FormField::Publisher => v.publisher() != b.publisher(),
            FormField::DatePublished => v.date_published() != b.date_published(),
            FormField::DateModified => v.date_modified() != b.date_modified(),
        }
    }
}

impl FormStateTrait for FormState {
    fn values(&self) -> &EditableFormState {
        &self.values
    }

    fn baseline(&self) -> &EditableFormState {
        &self.baseline
    }

    /// Overwrites every tracked field, including clearing link-only fields
    /// for non-link bookmarks. Never merges with the previous values.
    fn replace(&mut self, state: EditableFormState) {
        debug!(bookmark_id = %state.bookmark_id, "form state replaced");
        self.values = state.clone();
        self.baseline = state;
        self.errors = ValidationErrors::new();
    }

    fn set_field(&mut self, field: FormField, value: FieldValue) -> Result<(), FormError> {
        self.set_field_at(field, value, Utc::now())
    }

    /// Discards edits, returning to the last replaced state.
    fn reset(&mut self) {
        self.values = self.baseline.clone();
        self.errors = ValidationErrors::new();
    }

    fn is_dirty(&self) -> bool {
        self.values != self.baseline
    }

    fn dirty_fields(&self) -> Vec<FormField> {
        FormField::ALL
            .iter()
            .copied()
            .filter(|f| self.field_differs(*f))
            .collect()
    }

    /// Validates the current values. Messages are kept for display; values are
    /// never touched.
    fn validate(&mut self) -> Result<(), ValidationErrors> {
        match validation::validate(&self.values) {
            Ok(()) => {
                self.errors = ValidationErrors::new();
                Ok(())
            }
            Err(errors) => {
                self.errors = errors.clone();
                Err(errors)
            }
        }
    }

    fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    fn is_submitting(&self) -> bool {
        self.submitting
    }
}
