//! [`BookmarkApi`] backed by the local SQLite store.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use crate::database::Database;
use crate::managers::bookmark_store::{BookmarkStore, BookmarkStoreTrait};
use crate::services::backend::BookmarkApi;
use crate::types::bookmark::{BookmarkRecord, TagUpdate};
use crate::types::errors::UpdateError;
use crate::types::form::UpdateBookmarkRequest;

/// Shares one database between the host and spawned update tasks.
#[derive(Clone)]
pub struct LocalBookmarkApi {
    db: Arc<Mutex<Database>>,
}

impl LocalBookmarkApi {
    pub fn new(db: Database) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
        }
    }

    /// Runs `f` with a store over the locked connection.
    pub fn with_store<T>(
        &self,
        f: impl FnOnce(&mut BookmarkStore<'_>) -> Result<T, UpdateError>,
    ) -> Result<T, UpdateError> {
        let guard = self.lock()?;
        let mut store = BookmarkStore::new(guard.connection());
        f(&mut store)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Database>, UpdateError> {
        self.db
            .lock()
            .map_err(|e| UpdateError::Storage(format!("database lock poisoned: {}", e)))
    }
}

#[async_trait]
impl BookmarkApi for LocalBookmarkApi {
    async fn fetch_bookmark(&self, bookmark_id: &str) -> Result<BookmarkRecord, UpdateError> {
        self.with_store(|store| Ok(store.get_bookmark(bookmark_id)?))
    }

    async fn update_bookmark(
        &self,
        request: UpdateBookmarkRequest,
    ) -> Result<BookmarkRecord, UpdateError> {
        self.with_store(|store| Ok(store.apply_update(&request)?))
    }

    async fn update_tags(
        &self,
        bookmark_id: &str,
        update: TagUpdate,
    ) -> Result<BookmarkRecord, UpdateError> {
        self.with_store(|store| Ok(store.update_tags(bookmark_id, &update)?))
    }
}
