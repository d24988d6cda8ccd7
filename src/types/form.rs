use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Flat editable representation of a bookmark, as bound to the dialog's inputs.
///
/// Optional text fields of a link use the empty string for "no value yet";
/// that sentinel never leaves this type (see `UpdateBookmarkRequest`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EditableFormState {
    pub bookmark_id: String,
    pub title: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Present only for link bookmarks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<LinkFormFields>,
}

impl EditableFormState {
    pub fn is_link(&self) -> bool {
        self.link.is_some()
    }

    pub fn url(&self) -> Option<&str> {
        self.link.as_ref().map(|l| l.url.as_str())
    }

    pub fn description(&self) -> Option<&str> {
        self.link.as_ref().map(|l| l.description.as_str())
    }

    pub fn author(&self) -> Option<&str> {
        self.link.as_ref().map(|l| l.author.as_str())
    }

    pub fn publisher(&self) -> Option<&str> {
        self.link.as_ref().map(|l| l.publisher.as_str())
    }

    pub fn date_published(&self) -> Option<DateTime<Utc>> {
        self.link.as_ref().and_then(|l| l.date_published)
    }

    pub fn date_modified(&self) -> Option<DateTime<Utc>> {
        self.link.as_ref().and_then(|l| l.date_modified)
    }
}

/// Link-only fields of the form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct LinkFormFields {
    pub url: String,
    pub description: String,
    pub author: String,
    pub publisher: String,
    pub date_published: Option<DateTime<Utc>>,
    pub date_modified: Option<DateTime<Utc>>,
}

/// Identifies one editable field of the dialog.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "camelCase")]
pub enum FormField {
    BookmarkId,
    Title,
    Url,
    Description,
    Author,
    Publisher,
    CreatedAt,
    DatePublished,
    DateModified,
}

impl FormField {
    pub const ALL: [FormField; 9] = [
        FormField::BookmarkId,
        FormField::Title,
        FormField::Url,
        FormField::Description,
        FormField::Author,
        FormField::Publisher,
        FormField::CreatedAt,
        FormField::DatePublished,
        FormField::DateModified,
    ];

    /// Wire name, matching the request payload's keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            FormField::BookmarkId => "bookmarkId",
            FormField::Title => "title",
            FormField::Url => "url",
            FormField::Description => "description",
            FormField::Author => "author",
            FormField::Publisher => "publisher",
            FormField::CreatedAt => "createdAt",
            FormField::DatePublished => "datePublished",
            FormField::DateModified => "dateModified",
        }
    }

    pub fn parse(name: &str) -> Option<FormField> {
        FormField::ALL.iter().copied().find(|f| f.as_str() == name)
    }

    /// Fields that only exist for link bookmarks.
    pub fn is_link_only(&self) -> bool {
        !matches!(
            self,
            FormField::BookmarkId | FormField::Title | FormField::CreatedAt
        )
    }

    pub fn is_date(&self) -> bool {
        matches!(
            self,
            FormField::CreatedAt | FormField::DatePublished | FormField::DateModified
        )
    }
}

/// A value written into a single field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum FieldValue {
    Text(String),
    Date(Option<DateTime<Utc>>),
}

/// Payload sent to the update operation.
///
/// `title` is always serialized; `null` asks the backend to clear it. The link
/// patch is omitted entirely for non-link bookmarks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBookmarkRequest {
    pub bookmark_id: String,
    pub title: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(flatten, default, skip_serializing_if = "Option::is_none")]
    pub link: Option<LinkPatch>,
}

/// Link-only part of [`UpdateBookmarkRequest`]. Empty text is `None`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct LinkPatch {
    pub url: String,
    pub description: Option<String>,
    pub author: Option<String>,
    pub publisher: Option<String>,
    pub date_published: Option<DateTime<Utc>>,
    pub date_modified: Option<DateTime<Utc>>,
}
