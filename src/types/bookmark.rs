use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A saved bookmark as supplied by the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BookmarkRecord {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tags: Vec<BookmarkTag>,
    pub content: BookmarkContent,
}

impl BookmarkRecord {
    /// Returns the content variant of this bookmark.
    pub fn kind(&self) -> ContentKind {
        self.content.kind()
    }

    /// Whether `other` carries the same identity and editable metadata.
    ///
    /// Tags are edited outside the form and are ignored here.
    pub fn same_editable_source(&self, other: &BookmarkRecord) -> bool {
        self.id == other.id
            && self.title == other.title
            && self.created_at == other.created_at
            && self.content == other.content
    }
}

/// Bookmark content, tagged by `type` on the wire.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookmarkContent {
    Link(LinkContent),
    Text(TextContent),
    Asset(AssetContent),
    Unknown,
}

impl BookmarkContent {
    pub fn kind(&self) -> ContentKind {
        match self {
            BookmarkContent::Link(_) => ContentKind::Link,
            BookmarkContent::Text(_) => ContentKind::Text,
            BookmarkContent::Asset(_) => ContentKind::Asset,
            BookmarkContent::Unknown => ContentKind::Unknown,
        }
    }

    pub fn as_link(&self) -> Option<&LinkContent> {
        match self {
            BookmarkContent::Link(link) => Some(link),
            _ => None,
        }
    }
}

/// Discriminant of [`BookmarkContent`] without its payload.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContentKind {
    Link,
    Text,
    Asset,
    Unknown,
}

impl ContentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Link => "LINK",
            ContentKind::Text => "TEXT",
            ContentKind::Asset => "ASSET",
            ContentKind::Unknown => "UNKNOWN",
        }
    }
}

/// Metadata of a link bookmark.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct LinkContent {
    pub url: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub publisher: Option<String>,
    #[serde(default)]
    pub date_published: Option<DateTime<Utc>>,
    #[serde(default)]
    pub date_modified: Option<DateTime<Utc>>,
}

/// A free-form note bookmark.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct TextContent {
    pub text: String,
}

/// An uploaded file bookmark.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AssetContent {
    pub asset_type: AssetType,
    pub asset_id: String,
    #[serde(default)]
    pub file_name: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AssetType {
    Image,
    Pdf,
}

/// A tag attached to a bookmark.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BookmarkTag {
    pub id: String,
    pub name: String,
}

/// Tag changes requested by the tag editor, applied independently of the form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct TagUpdate {
    #[serde(default)]
    pub attach: Vec<String>,
    #[serde(default)]
    pub detach: Vec<String>,
}
