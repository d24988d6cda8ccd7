//! Backend seam: the external operations the editor depends on.

use async_trait::async_trait;

use crate::types::bookmark::{BookmarkRecord, TagUpdate};
use crate::types::errors::UpdateError;
use crate::types::form::UpdateBookmarkRequest;

/// Bookmark reader, updater and tag editor.
///
/// Implementations must fail with a descriptive message; that message is what
/// the user sees in the error notification.
#[async_trait]
pub trait BookmarkApi: Send + Sync {
    /// Fetches the current version of a bookmark.
    async fn fetch_bookmark(&self, bookmark_id: &str) -> Result<BookmarkRecord, UpdateError>;

    /// Applies `request` and returns the authoritative updated record.
    async fn update_bookmark(
        &self,
        request: UpdateBookmarkRequest,
    ) -> Result<BookmarkRecord, UpdateError>;

    /// Attaches and detaches tags by name, independently of the edit form.
    async fn update_tags(
        &self,
        bookmark_id: &str,
        update: TagUpdate,
    ) -> Result<BookmarkRecord, UpdateError>;
}
