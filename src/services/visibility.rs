//! Visibility policy: which fields the dialog shows for a given bookmark.

use serde::Serialize;

use crate::types::bookmark::{BookmarkRecord, ContentKind};
use crate::types::form::FormField;

/// Input widget a host should render for a field.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Widget {
    Input,
    TextArea,
    DatePicker,
}

/// Presentation metadata for one visible field.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub field: FormField,
    pub label: &'static str,
    pub placeholder: Option<&'static str>,
    pub widget: Widget,
}

/// Whether the link-only fields are shown and validated for `bookmark`.
pub fn is_editable_as_link(bookmark: &BookmarkRecord) -> bool {
    bookmark.kind() == ContentKind::Link
}

/// Whether `field` exists on forms for bookmarks of `kind`.
pub fn field_applies(kind: ContentKind, field: FormField) -> bool {
    !field.is_link_only() || kind == ContentKind::Link
}

/// Ordered field descriptors in dialog order, filtered for `bookmark`.
pub fn visible_fields(bookmark: &BookmarkRecord) -> Vec<FieldDescriptor> {
    let kind = bookmark.kind();
    DIALOG_ORDER
        .iter()
        .copied()
        .filter(|field| field_applies(kind, *field))
        .map(describe)
        .collect()
}

const DIALOG_ORDER: [FormField; 8] = [
    FormField::Title,
    FormField::Url,
    FormField::Description,
    FormField::Author,
    FormField::Publisher,
    FormField::CreatedAt,
    FormField::DatePublished,
    FormField::DateModified,
];

fn describe(field: FormField) -> FieldDescriptor {
    let (label, placeholder, widget) = match field {
        FormField::BookmarkId => ("Bookmark", None, Widget::Input),
        FormField::Title => ("Title", Some("Bookmark title"), Widget::Input),
        FormField::Url => ("URL", Some("https://example.com"), Widget::Input),
        FormField::Description => (
            "Description",
            Some("Bookmark description"),
            Widget::TextArea,
        ),
        FormField::Author => ("Author", Some("Author name"), Widget::Input),
        FormField::Publisher => ("Publisher", Some("Publisher name"), Widget::Input),
        FormField::CreatedAt => ("Created At", Some("Pick a date"), Widget::DatePicker),
        FormField::DatePublished => ("Date Published", Some("Pick a date"), Widget::DatePicker),
        FormField::DateModified => ("Date Modified", Some("Pick a date"), Widget::DatePicker),
    };
    FieldDescriptor {
        field,
        label,
        placeholder,
        widget,
    }
}
