use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

use super::form::FormField;

// === FormError ===

/// Errors raised when a single field update is rejected.
#[derive(Debug, Error, PartialEq)]
pub enum FormError {
    /// The field only exists for link bookmarks.
    #[error("Field '{}' is not editable for this bookmark", .0.as_str())]
    InapplicableField(FormField),
    /// A text value was given for a date field or the reverse.
    #[error("Field '{}' expects a {expected} value", .field.as_str())]
    WrongValueKind {
        field: FormField,
        expected: &'static str,
    },
    /// The field is fixed for the lifetime of the form.
    #[error("Field '{}' is read-only", .0.as_str())]
    ReadOnly(FormField),
    /// The field cannot be cleared.
    #[error("Field '{}' is required", .0.as_str())]
    RequiredField(FormField),
    /// The chosen date is outside the selectable range.
    #[error("Date for '{}' must be between 1900-01-01 and today", .0.as_str())]
    DateOutOfRange(FormField),
}

// === ValidationErrors ===

/// Field-level validation messages; non-empty whenever returned as an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    fields: BTreeMap<FormField, String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: FormField, message: impl Into<String>) {
        self.fields.entry(field).or_insert_with(|| message.into());
    }

    pub fn remove(&mut self, field: FormField) {
        self.fields.remove(&field);
    }

    pub fn get(&self, field: FormField) -> Option<&str> {
        self.fields.get(&field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FormField, &str)> {
        self.fields.iter().map(|(f, m)| (*f, m.as_str()))
    }

    pub fn fields(&self) -> Vec<FormField> {
        self.fields.keys().copied().collect()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .fields
            .iter()
            .map(|(field, msg)| format!("{}: {}", field.as_str(), msg))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

// === SubmitError ===

/// Reasons a submission could not be started.
#[derive(Debug, Error, PartialEq)]
pub enum SubmitError {
    #[error("Edit dialog is not open")]
    NotOpen,
    #[error("A submission is already in flight for bookmark {0}")]
    AlreadySubmitting(String),
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),
}

// === DialogError ===

/// Errors related to dialog transitions.
#[derive(Debug, Error, PartialEq)]
pub enum DialogError {
    #[error("Cannot cancel while a submission is in flight")]
    SubmissionInFlight,
    #[error("Edit dialog is not open")]
    NotOpen,
    #[error(transparent)]
    Field(#[from] FormError),
}

// === UpdateError ===

/// Failures of the backend operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum UpdateError {
    #[error("Bookmark not found: {0}")]
    NotFound(String),
    #[error("{message}")]
    Rejected { status: u16, message: String },
    #[error("{0}")]
    Network(String),
    #[error("Bookmark storage error: {0}")]
    Storage(String),
    #[error("Malformed backend response: {0}")]
    Decode(String),
    #[error("Invalid update request: {0}")]
    InvalidRequest(String),
}

// === StoreError ===

/// Errors related to the local bookmark store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Bookmark not found: {0}")]
    NotFound(String),
    #[error("Bookmark {0} is not a link; link fields cannot be updated")]
    NotALink(String),
    #[error("Bookmark database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),
    #[error("Corrupt bookmark row {id}: {reason}")]
    CorruptRow { id: String, reason: String },
}

impl From<StoreError> for UpdateError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => UpdateError::NotFound(id),
            StoreError::NotALink(id) => {
                UpdateError::InvalidRequest(format!("bookmark {} is not a link", id))
            }
            other => UpdateError::Storage(other.to_string()),
        }
    }
}

// === SettingsError ===

/// Errors related to settings management.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Settings I/O error: {0}")]
    IoError(String),
    #[error("Settings serialization error: {0}")]
    SerializationError(String),
    #[error("Invalid settings key: {0}")]
    InvalidKey(String),
    #[error("Invalid settings value: {0}")]
    InvalidValue(String),
}

// === AppError ===

/// Errors surfaced by the host application layer.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("No edit dialog with id: {0}")]
    UnknownDialog(String),
    #[error(transparent)]
    Dialog(#[from] DialogError),
    #[error(transparent)]
    Submit(#[from] SubmitError),
    #[error(transparent)]
    Backend(#[from] UpdateError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error("Failed to open bookmark database: {0}")]
    Database(#[from] rusqlite::Error),
}
