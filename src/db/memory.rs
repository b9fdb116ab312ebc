use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{
    group_entries, PlatformRepository, PlatformWithEntries, ReviewRepository, StoreError,
    StoreResult, WatchlistRepository,
};
use crate::models::{
    Platform, PlatformInput, RecordId, Review, ReviewInput, WatchlistEntry, WatchlistEntryInput,
};

/// In-process store backed by ordered maps.
///
/// All three tables sit behind one lock so that a parent check and the
/// write that depends on it happen atomically, and cascades never leave
/// orphans visible to readers.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Tables>>,
}

#[derive(Default)]
struct Tables {
    platforms: Table<Platform>,
    entries: Table<WatchlistEntry>,
    reviews: Table<Review>,
}

/// Rows keyed by id. Ids come from a counter and are never handed out twice.
struct Table<T> {
    rows: BTreeMap<RecordId, T>,
    last_id: RecordId,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            last_id: 0,
        }
    }
}

impl<T: Clone> Table<T> {
    fn next_id(&mut self) -> RecordId {
        self.last_id += 1;
        self.last_id
    }

    fn all(&self) -> Vec<T> {
        self.rows.values().cloned().collect()
    }
}

impl Tables {
    /// Removes an entry together with its reviews
    fn remove_entry(&mut self, id: RecordId) -> bool {
        if self.entries.rows.remove(&id).is_none() {
            return false;
        }
        self.reviews.rows.retain(|_, review| review.watchlist_id != id);
        true
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PlatformRepository for MemoryStore {
    async fn create(&self, input: PlatformInput) -> StoreResult<Platform> {
        let mut tables = self.inner.write().await;
        let id = tables.platforms.next_id();
        let platform = Platform::new(id, input);
        tables.platforms.rows.insert(id, platform.clone());
        Ok(platform)
    }

    async fn get(&self, id: RecordId) -> StoreResult<Option<Platform>> {
        let tables = self.inner.read().await;
        Ok(tables.platforms.rows.get(&id).cloned())
    }

    async fn list(&self) -> StoreResult<Vec<Platform>> {
        Ok(self.inner.read().await.platforms.all())
    }

    async fn list_with_entries(&self) -> StoreResult<Vec<PlatformWithEntries>> {
        let tables = self.inner.read().await;
        Ok(group_entries(tables.platforms.all(), tables.entries.all()))
    }

    async fn update(&self, id: RecordId, input: PlatformInput) -> StoreResult<Option<Platform>> {
        let mut tables = self.inner.write().await;
        Ok(tables.platforms.rows.get_mut(&id).map(|platform| {
            platform.apply(input);
            platform.clone()
        }))
    }

    async fn delete(&self, id: RecordId) -> StoreResult<bool> {
        let mut tables = self.inner.write().await;
        if tables.platforms.rows.remove(&id).is_none() {
            return Ok(false);
        }

        let orphaned: Vec<RecordId> = tables
            .entries
            .rows
            .values()
            .filter(|entry| entry.platform_id == id)
            .map(|entry| entry.id)
            .collect();
        for entry_id in &orphaned {
            tables.remove_entry(*entry_id);
        }

        tracing::debug!(platform_id = id, entries_removed = orphaned.len(), "Platform deleted");
        Ok(true)
    }
}

#[async_trait]
impl WatchlistRepository for MemoryStore {
    async fn create(&self, input: WatchlistEntryInput) -> StoreResult<WatchlistEntry> {
        let mut tables = self.inner.write().await;
        if !tables.platforms.rows.contains_key(&input.platform_id) {
            return Err(StoreError::MissingParent {
                field: "platform",
                id: input.platform_id,
            });
        }

        let id = tables.entries.next_id();
        let entry = WatchlistEntry::new(id, input, Utc::now());
        tables.entries.rows.insert(id, entry.clone());
        Ok(entry)
    }

    async fn get(&self, id: RecordId) -> StoreResult<Option<WatchlistEntry>> {
        let tables = self.inner.read().await;
        Ok(tables.entries.rows.get(&id).cloned())
    }

    async fn list(&self) -> StoreResult<Vec<WatchlistEntry>> {
        Ok(self.inner.read().await.entries.all())
    }

    async fn list_by_platform(&self, platform_id: RecordId) -> StoreResult<Vec<WatchlistEntry>> {
        let tables = self.inner.read().await;
        Ok(tables
            .entries
            .rows
            .values()
            .filter(|entry| entry.platform_id == platform_id)
            .cloned()
            .collect())
    }

    async fn update(
        &self,
        id: RecordId,
        input: WatchlistEntryInput,
    ) -> StoreResult<Option<WatchlistEntry>> {
        let mut tables = self.inner.write().await;
        if !tables.entries.rows.contains_key(&id) {
            return Ok(None);
        }
        if !tables.platforms.rows.contains_key(&input.platform_id) {
            return Err(StoreError::MissingParent {
                field: "platform",
                id: input.platform_id,
            });
        }

        Ok(tables.entries.rows.get_mut(&id).map(|entry| {
            entry.apply(input);
            entry.clone()
        }))
    }

    async fn delete(&self, id: RecordId) -> StoreResult<bool> {
        Ok(self.inner.write().await.remove_entry(id))
    }
}

#[async_trait]
impl ReviewRepository for MemoryStore {
    async fn create(&self, input: ReviewInput) -> StoreResult<Review> {
        let mut tables = self.inner.write().await;
        if !tables.entries.rows.contains_key(&input.watchlist_id) {
            return Err(StoreError::MissingParent {
                field: "watchlist",
                id: input.watchlist_id,
            });
        }

        let id = tables.reviews.next_id();
        let review = Review::new(id, input, Utc::now());
        tables.reviews.rows.insert(id, review.clone());
        Ok(review)
    }

    async fn get(&self, id: RecordId) -> StoreResult<Option<Review>> {
        let tables = self.inner.read().await;
        Ok(tables.reviews.rows.get(&id).cloned())
    }

    async fn list(&self) -> StoreResult<Vec<Review>> {
        Ok(self.inner.read().await.reviews.all())
    }

    async fn update(&self, id: RecordId, input: ReviewInput) -> StoreResult<Option<Review>> {
        let mut tables = self.inner.write().await;
        if !tables.reviews.rows.contains_key(&id) {
            return Ok(None);
        }
        if !tables.entries.rows.contains_key(&input.watchlist_id) {
            return Err(StoreError::MissingParent {
                field: "watchlist",
                id: input.watchlist_id,
            });
        }

        Ok(tables.reviews.rows.get_mut(&id).map(|review| {
            review.apply(input, Utc::now());
            review.clone()
        }))
    }

    async fn delete(&self, id: RecordId) -> StoreResult<bool> {
        let mut tables = self.inner.write().await;
        Ok(tables.reviews.rows.remove(&id).is_some())
    }
}
