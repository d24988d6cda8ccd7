//! Field projection: bookmark record -> editable form state.
//!
//! The projection is a pure function of the record plus the time used to
//! default a missing creation date. It is run when the dialog opens, when the
//! bookmark changes underneath an open dialog, and on the record returned by a
//! successful update.

use chrono::{DateTime, Utc};

use crate::types::bookmark::{BookmarkContent, BookmarkRecord, LinkContent};
use crate::types::form::{EditableFormState, LinkFormFields};

/// Projects `record` into a fresh form state, defaulting `created_at` to `now`.
pub fn project(record: &BookmarkRecord, now: DateTime<Utc>) -> EditableFormState {
    let (native_title, link) = match &record.content {
        BookmarkContent::Link(content) => (content.title.clone(), Some(link_fields(content))),
        BookmarkContent::Text(_) | BookmarkContent::Asset(_) | BookmarkContent::Unknown => {
            (None, None)
        }
    };

    EditableFormState {
        bookmark_id: record.id.clone(),
        title: record.title.clone().or(native_title),
        created_at: record.created_at.unwrap_or(now),
        link,
    }
}

/// [`project`] using the current wall-clock time.
pub fn project_now(record: &BookmarkRecord) -> EditableFormState {
    project(record, Utc::now())
}

fn link_fields(content: &LinkContent) -> LinkFormFields {
    LinkFormFields {
        url: content.url.clone(),
        description: content.description.clone().unwrap_or_default(),
        author: content.author.clone().unwrap_or_default(),
        publisher: content.publisher.clone().unwrap_or_default(),
        // Dates stay absent: an empty picker means "no date chosen".
        date_published: content.date_published,
        date_modified: content.date_modified,
    }
}
