//! Persistence for platforms, watchlist entries and reviews.
//!
//! Handlers only see the per-entity repository traits. Two stores implement
//! all three: [`MemoryStore`] for development and tests, [`PgStore`] for
//! PostgreSQL.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::models::{
    Platform, PlatformInput, RecordId, Review, ReviewInput, WatchlistEntry, WatchlistEntryInput,
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::{create_pool, PgStore};

/// Errors raised by a store
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A reference names a parent record that does not exist
    #[error("{field} {id} does not exist")]
    MissingParent { field: &'static str, id: RecordId },
}

pub type StoreResult<T> = Result<T, StoreError>;

/// A platform paired with the entries that reference it
pub type PlatformWithEntries = (Platform, Vec<WatchlistEntry>);

/// Attaches each entry to its platform, keeping the platform order.
/// Entries whose platform is not in `platforms` are dropped.
pub(crate) fn group_entries(
    platforms: Vec<Platform>,
    entries: Vec<WatchlistEntry>,
) -> Vec<PlatformWithEntries> {
    let mut by_platform: HashMap<RecordId, Vec<WatchlistEntry>> = HashMap::new();
    for entry in entries {
        by_platform.entry(entry.platform_id).or_default().push(entry);
    }

    platforms
        .into_iter()
        .map(|platform| {
            let entries = by_platform.remove(&platform.id).unwrap_or_default();
            (platform, entries)
        })
        .collect()
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlatformRepository: Send + Sync {
    async fn create(&self, input: PlatformInput) -> StoreResult<Platform>;

    async fn get(&self, id: RecordId) -> StoreResult<Option<Platform>>;

    async fn list(&self) -> StoreResult<Vec<Platform>>;

    /// Every platform with its entries, read from one consistent snapshot
    async fn list_with_entries(&self) -> StoreResult<Vec<PlatformWithEntries>>;

    /// Returns `None` when no platform has this id
    async fn update(&self, id: RecordId, input: PlatformInput) -> StoreResult<Option<Platform>>;

    /// Deletes the platform, its entries and their reviews.
    /// Returns `false` when no platform has this id.
    async fn delete(&self, id: RecordId) -> StoreResult<bool>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WatchlistRepository: Send + Sync {
    /// Fails with [`StoreError::MissingParent`] if the platform is gone
    async fn create(&self, input: WatchlistEntryInput) -> StoreResult<WatchlistEntry>;

    async fn get(&self, id: RecordId) -> StoreResult<Option<WatchlistEntry>>;

    async fn list(&self) -> StoreResult<Vec<WatchlistEntry>>;

    async fn list_by_platform(&self, platform_id: RecordId) -> StoreResult<Vec<WatchlistEntry>>;

    /// `created` is left untouched
    async fn update(
        &self,
        id: RecordId,
        input: WatchlistEntryInput,
    ) -> StoreResult<Option<WatchlistEntry>>;

    /// Deletes the entry and its reviews
    async fn delete(&self, id: RecordId) -> StoreResult<bool>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReviewRepository: Send + Sync {
    /// Fails with [`StoreError::MissingParent`] if the entry is gone
    async fn create(&self, input: ReviewInput) -> StoreResult<Review>;

    async fn get(&self, id: RecordId) -> StoreResult<Option<Review>>;

    async fn list(&self) -> StoreResult<Vec<Review>>;

    /// Advances `updated` past its previous value
    async fn update(&self, id: RecordId, input: ReviewInput) -> StoreResult<Option<Review>>;

    async fn delete(&self, id: RecordId) -> StoreResult<bool>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn platform(id: RecordId) -> Platform {
        Platform {
            id,
            name: format!("Platform {id}"),
            about: "streaming".to_string(),
            website: "https://example.com".to_string(),
        }
    }

    fn entry(id: RecordId, platform_id: RecordId) -> WatchlistEntry {
        WatchlistEntry {
            id,
            title: format!("Entry {id}"),
            platform_id,
            storyline: "plot".to_string(),
            active: true,
            created: Utc::now(),
        }
    }

    #[test]
    fn test_group_entries() {
        let grouped = group_entries(
            vec![platform(2), platform(1)],
            vec![entry(1, 1), entry(2, 2), entry(3, 1), entry(4, 9)],
        );

        let ids: Vec<(RecordId, Vec<RecordId>)> = grouped
            .iter()
            .map(|(p, entries)| (p.id, entries.iter().map(|e| e.id).collect()))
            .collect();
        assert_eq!(ids, vec![(2, vec![2]), (1, vec![1, 3])]);
    }
}
