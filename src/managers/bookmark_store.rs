//! Local bookmark store.
//!
//! Implements `BookmarkStoreTrait` on top of SQLite via `rusqlite`. Acts as
//! the authoritative side of an update: it normalizes incoming text (trims
//! whitespace, stores empty text as NULL) and returns the record as stored.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;
use uuid::Uuid;

use crate::types::bookmark::{
    AssetContent, AssetType, BookmarkContent, BookmarkRecord, BookmarkTag, LinkContent,
    TagUpdate, TextContent,
};
use crate::types::errors::StoreError;
use crate::types::form::UpdateBookmarkRequest;

/// Trait defining bookmark store operations.
pub trait BookmarkStoreTrait {
    fn create_bookmark(
        &mut self,
        title: Option<&str>,
        content: BookmarkContent,
    ) -> Result<BookmarkRecord, StoreError>;
    fn insert_bookmark(&mut self, record: &BookmarkRecord) -> Result<(), StoreError>;
    fn get_bookmark(&self, id: &str) -> Result<BookmarkRecord, StoreError>;
    fn list_bookmarks(&self) -> Result<Vec<BookmarkRecord>, StoreError>;
    fn apply_update(&mut self, request: &UpdateBookmarkRequest) -> Result<BookmarkRecord, StoreError>;
    fn update_tags(&mut self, id: &str, update: &TagUpdate) -> Result<BookmarkRecord, StoreError>;
    fn remove_bookmark(&mut self, id: &str) -> Result<(), StoreError>;
}

/// Bookmark store backed by a SQLite connection.
pub struct BookmarkStore<'a> {
    conn: &'a Connection,
}

const SELECT_COLUMNS: &str = "SELECT id, title, created_at, content_type, url, link_title, \
     description, author, publisher, date_published, date_modified, text_content, \
     asset_type, asset_id, file_name FROM bookmarks";

/// Columns of one `bookmarks` row, before tags are attached.
struct BookmarkRow {
    id: String,
    title: Option<String>,
    created_at: Option<i64>,
    content_type: String,
    url: Option<String>,
    link_title: Option<String>,
    description: Option<String>,
    author: Option<String>,
    publisher: Option<String>,
    date_published: Option<i64>,
    date_modified: Option<i64>,
    text_content: Option<String>,
    asset_type: Option<String>,
    asset_id: Option<String>,
    file_name: Option<String>,
}

impl<'a> BookmarkStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn now_millis() -> i64 {
        Utc::now().timestamp_millis()
    }

    fn read_row(row: &rusqlite::Row) -> rusqlite::Result<BookmarkRow> {
        Ok(BookmarkRow {
            id: row.get(0)?,
            title: row.get(1)?,
            created_at: row.get(2)?,
            content_type: row.get(3)?,
            url: row.get(4)?,
            link_title: row.get(5)?,
            description: row.get(6)?,
            author: row.get(7)?,
            publisher: row.get(8)?,
            date_published: row.get(9)?,
            date_modified: row.get(10)?,
            text_content: row.get(11)?,
            asset_type: row.get(12)?,
            asset_id: row.get(13)?,
            file_name: row.get(14)?,
        })
    }

    fn build_record(&self, row: BookmarkRow) -> Result<BookmarkRecord, StoreError> {
        let corrupt = |reason: &str| StoreError::CorruptRow {
            id: row.id.clone(),
            reason: reason.to_string(),
        };

        let content = match row.content_type.as_str() {
            "LINK" => BookmarkContent::Link(LinkContent {
                url: row.url.clone().ok_or_else(|| corrupt("link without url"))?,
                title: row.link_title.clone(),
                description: row.description.clone(),
                author: row.author.clone(),
                publisher: row.publisher.clone(),
                date_published: from_millis(row.date_published, &row.id)?,
                date_modified: from_millis(row.date_modified, &row.id)?,
            }),
            "TEXT" => BookmarkContent::Text(TextContent {
                text: row.text_content.clone().unwrap_or_default(),
            }),
            "ASSET" => BookmarkContent::Asset(AssetContent {
                asset_type: match row.asset_type.as_deref() {
                    Some("image") => AssetType::Image,
                    Some("pdf") => AssetType::Pdf,
                    _ => return Err(corrupt("unknown asset type")),
                },
                asset_id: row.asset_id.clone().ok_or_else(|| corrupt("asset without id"))?,
                file_name: row.file_name.clone(),
            }),
            "UNKNOWN" => BookmarkContent::Unknown,
            other => return Err(corrupt(&format!("unknown content type {}", other))),
        };

        Ok(BookmarkRecord {
            tags: self.tags_for(&row.id)?,
            created_at: from_millis(row.created_at, &row.id)?,
            id: row.id,
            title: row.title,
            content,
        })
    }

    fn tags_for(&self, bookmark_id: &str) -> Result<Vec<BookmarkTag>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT t.id, t.name FROM tags t \
             JOIN bookmark_tags bt ON bt.tag_id = t.id \
             WHERE bt.bookmark_id = ?1 ORDER BY t.name",
        )?;
        let rows = stmt.query_map(params![bookmark_id], |row| {
            Ok(BookmarkTag {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })?;
        let mut tags = Vec::new();
        for row in rows {
            tags.push(row?);
        }
        Ok(tags)
    }

    fn tag_id_for(&self, name: &str) -> Result<String, StoreError> {
        let existing: Option<String> = self
            .conn
            .query_row("SELECT id FROM tags WHERE name = ?1", params![name], |row| {
                row.get(0)
            })
            .optional()?;
        if let Some(id) = existing {
            return Ok(id);
        }
        let id = Uuid::new_v4().to_string();
        self.conn
            .execute("INSERT INTO tags (id, name) VALUES (?1, ?2)", params![id, name])?;
        Ok(id)
    }
}

impl<'a> BookmarkStoreTrait for BookmarkStore<'a> {
    /// Creates a bookmark with a generated id and the current time as creation date.
    fn create_bookmark(
        &mut self,
        title: Option<&str>,
        content: BookmarkContent,
    ) -> Result<BookmarkRecord, StoreError> {
        let record = BookmarkRecord {
            id: Uuid::new_v4().to_string(),
            title: title.and_then(normalize_text),
            created_at: DateTime::from_timestamp_millis(Self::now_millis()),
            tags: vec![],
            content,
        };
        self.insert_bookmark(&record)?;
        Ok(record)
    }

    /// Inserts `record` as given. Tags on the record are not stored.
    fn insert_bookmark(&mut self, record: &BookmarkRecord) -> Result<(), StoreError> {
        let link = record.content.as_link();
        let (text, asset) = match &record.content {
            BookmarkContent::Text(t) => (Some(t.text.as_str()), None),
            BookmarkContent::Asset(a) => (None, Some(a)),
            BookmarkContent::Link(_) | BookmarkContent::Unknown => (None, None),
        };

        self.conn.execute(
            "INSERT INTO bookmarks (id, title, created_at, updated_at, content_type, url, \
             link_title, description, author, publisher, date_published, date_modified, \
             text_content, asset_type, asset_id, file_name) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
            params![
                record.id,
                record.title,
                record.created_at.map(|d| d.timestamp_millis()),
                Self::now_millis(),
                record.kind().as_str(),
                link.map(|l| l.url.as_str()),
                link.and_then(|l| l.title.as_deref()),
                link.and_then(|l| l.description.as_deref()),
                link.and_then(|l| l.author.as_deref()),
                link.and_then(|l| l.publisher.as_deref()),
                link.and_then(|l| l.date_published).map(|d| d.timestamp_millis()),
                link.and_then(|l| l.date_modified).map(|d| d.timestamp_millis()),
                text,
                asset.map(|a| match a.asset_type {
                    AssetType::Image => "image",
                    AssetType::Pdf => "pdf",
                }),
                asset.map(|a| a.asset_id.as_str()),
                asset.and_then(|a| a.file_name.as_deref()),
            ],
        )?;
        debug!(bookmark_id = %record.id, "bookmark inserted");
        Ok(())
    }

    fn get_bookmark(&self, id: &str) -> Result<BookmarkRecord, StoreError> {
        let row = self
            .conn
            .query_row(
                &format!("{} WHERE id = ?1", SELECT_COLUMNS),
                params![id],
                Self::read_row,
            )
            .optional()?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        self.build_record(row)
    }

    fn list_bookmarks(&self) -> Result<Vec<BookmarkRecord>, StoreError> {
        let mut stmt = self
            .conn
            .prepare(&format!("{} ORDER BY created_at DESC, id", SELECT_COLUMNS))?;
        let rows = stmt.query_map([], Self::read_row)?;

        let mut raw = Vec::new();
        for row in rows {
            raw.push(row?);
        }
        raw.into_iter().map(|row| self.build_record(row)).collect()
    }

    /// Applies an edit-form update and returns the stored record.
    ///
    /// A `None` title clears it. Link text is trimmed and empty text is stored
    /// as NULL. Requests carrying link fields for a non-link bookmark are rejected.
    fn apply_update(&mut self, request: &UpdateBookmarkRequest) -> Result<BookmarkRecord, StoreError> {
        let current = self.get_bookmark(&request.bookmark_id)?;
        if request.link.is_some() && current.content.as_link().is_none() {
            return Err(StoreError::NotALink(request.bookmark_id.clone()));
        }

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "UPDATE bookmarks SET title = ?1, created_at = ?2, updated_at = ?3 WHERE id = ?4",
            params![
                request.title.as_deref().and_then(normalize_text),
                request.created_at.timestamp_millis(),
                Self::now_millis(),
                request.bookmark_id,
            ],
        )?;

        if let Some(link) = &request.link {
            tx.execute(
                "UPDATE bookmarks SET url = ?1, description = ?2, author = ?3, publisher = ?4, \
                 date_published = ?5, date_modified = ?6 WHERE id = ?7",
                params![
                    link.url.trim(),
                    link.description.as_deref().and_then(normalize_text),
                    link.author.as_deref().and_then(normalize_text),
                    link.publisher.as_deref().and_then(normalize_text),
                    link.date_published.map(|d| d.timestamp_millis()),
                    link.date_modified.map(|d| d.timestamp_millis()),
                    request.bookmark_id,
                ],
            )?;
        }
        tx.commit()?;

        debug!(bookmark_id = %request.bookmark_id, "bookmark updated");
        self.get_bookmark(&request.bookmark_id)
    }

    /// Attaches tags by name (creating them when new), then detaches by name.
    /// All or nothing: a failing statement leaves the tags as they were.
    fn update_tags(&mut self, id: &str, update: &TagUpdate) -> Result<BookmarkRecord, StoreError> {
        // Existence check so unknown ids fail with NotFound rather than a FK error.
        self.get_bookmark(id)?;

        let tx = self.conn.unchecked_transaction()?;
        for name in update.attach.iter().filter_map(|n| normalize_text(n)) {
            let tag_id = self.tag_id_for(&name)?;
            self.conn.execute(
                "INSERT OR IGNORE INTO bookmark_tags (bookmark_id, tag_id) VALUES (?1, ?2)",
                params![id, tag_id],
            )?;
        }
        for name in update.detach.iter().filter_map(|n| normalize_text(n)) {
            self.conn.execute(
                "DELETE FROM bookmark_tags WHERE bookmark_id = ?1 \
                 AND tag_id IN (SELECT id FROM tags WHERE name = ?2)",
                params![id, name],
            )?;
        }
        tx.commit()?;
        self.get_bookmark(id)
    }

    fn remove_bookmark(&mut self, id: &str) -> Result<(), StoreError> {
        let affected = self
            .conn
            .execute("DELETE FROM bookmarks WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }
}

/// Trims `text`; whitespace-only text becomes `None`.
fn normalize_text(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn from_millis(millis: Option<i64>, id: &str) -> Result<Option<DateTime<Utc>>, StoreError> {
    match millis {
        None => Ok(None),
        Some(ms) => DateTime::from_timestamp_millis(ms)
            .map(Some)
            .ok_or_else(|| StoreError::CorruptRow {
                id: id.to_string(),
                reason: format!("timestamp out of range: {}", ms),
            }),
    }
}
