use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier type shared by every persisted record
pub type RecordId = i64;

// ============================================================================
// Platform
// ============================================================================

/// A streaming service that watchlist entries are tracked against
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Platform {
    pub id: RecordId,
    pub name: String,
    pub about: String,
    pub website: String,
}

/// Validated fields for creating or replacing a platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformInput {
    pub name: String,
    pub about: String,
    pub website: String,
}

impl Platform {
    pub fn new(id: RecordId, input: PlatformInput) -> Self {
        Self {
            id,
            name: input.name,
            about: input.about,
            website: input.website,
        }
    }

    /// Overwrites every mutable field
    pub fn apply(&mut self, input: PlatformInput) {
        self.name = input.name;
        self.about = input.about;
        self.website = input.website;
    }
}

// ============================================================================
// Watchlist entries
// ============================================================================

/// A movie or show tracked against a platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct WatchlistEntry {
    pub id: RecordId,
    pub title: String,
    pub platform_id: RecordId,
    pub storyline: String,
    pub active: bool,
    /// Set once when the entry is stored, never touched again
    pub created: DateTime<Utc>,
}

/// Validated fields for creating or replacing a watchlist entry.
///
/// `active` is optional: a new entry defaults to `true`, a replaced entry
/// keeps its previous value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchlistEntryInput {
    pub title: String,
    pub platform_id: RecordId,
    pub storyline: String,
    pub active: Option<bool>,
}

impl WatchlistEntry {
    pub fn new(id: RecordId, input: WatchlistEntryInput, created: DateTime<Utc>) -> Self {
        Self {
            id,
            title: input.title,
            platform_id: input.platform_id,
            storyline: input.storyline,
            active: input.active.unwrap_or(true),
            created,
        }
    }

    pub fn apply(&mut self, input: WatchlistEntryInput) {
        self.title = input.title;
        self.platform_id = input.platform_id;
        self.storyline = input.storyline;
        if let Some(active) = input.active {
            self.active = active;
        }
    }
}

// ============================================================================
// Reviews
// ============================================================================

/// A rating and comment attached to a watchlist entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Review {
    pub id: RecordId,
    /// Intended to be 1-5, only non-negativity is checked
    pub rating: i64,
    pub description: String,
    pub watchlist_id: RecordId,
    pub active: bool,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

/// Validated fields for creating or replacing a review
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewInput {
    pub rating: i64,
    pub description: String,
    pub watchlist_id: RecordId,
    pub active: Option<bool>,
}

impl Review {
    pub fn new(id: RecordId, input: ReviewInput, now: DateTime<Utc>) -> Self {
        Self {
            id,
            rating: input.rating,
            description: input.description,
            watchlist_id: input.watchlist_id,
            active: input.active.unwrap_or(true),
            created: now,
            updated: now,
        }
    }

    /// Overwrites the mutable fields and advances `updated`
    pub fn apply(&mut self, input: ReviewInput, now: DateTime<Utc>) {
        self.rating = input.rating;
        self.description = input.description;
        self.watchlist_id = input.watchlist_id;
        if let Some(active) = input.active {
            self.active = active;
        }
        self.updated = next_timestamp(self.updated, now);
    }
}

/// Returns `now`, or one microsecond past `previous` when the clock has not
/// moved past it. Keeps `updated` strictly increasing per record.
pub fn next_timestamp(previous: DateTime<Utc>, now: DateTime<Utc>) -> DateTime<Utc> {
    if now > previous {
        now
    } else {
        previous + chrono::Duration::microseconds(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry_input(active: Option<bool>) -> WatchlistEntryInput {
        WatchlistEntryInput {
            title: "Dark".to_string(),
            platform_id: 1,
            storyline: "Time travel in a small town".to_string(),
            active,
        }
    }

    #[test]
    fn test_new_entry_defaults_to_active() {
        let entry = WatchlistEntry::new(1, entry_input(None), Utc::now());
        assert!(entry.active);
    }

    #[test]
    fn test_entry_apply_keeps_active_when_absent() {
        let mut entry = WatchlistEntry::new(1, entry_input(Some(false)), Utc::now());
        let created = entry.created;

        entry.apply(WatchlistEntryInput {
            title: "Dark (2017)".to_string(),
            ..entry_input(None)
        });

        assert_eq!(entry.title, "Dark (2017)");
        assert!(!entry.active);
        assert_eq!(entry.created, created);
    }

    #[test]
    fn test_review_apply_advances_updated_on_frozen_clock() {
        let now = Utc::now();
        let mut review = Review::new(
            1,
            ReviewInput {
                rating: 4,
                description: "Good".to_string(),
                watchlist_id: 1,
                active: None,
            },
            now,
        );

        review.apply(
            ReviewInput {
                rating: 5,
                description: "Great".to_string(),
                watchlist_id: 1,
                active: None,
            },
            now,
        );

        assert!(review.updated > now);
        assert_eq!(review.created, now);
        assert_eq!(review.rating, 5);
    }

    #[test]
    fn test_next_timestamp() {
        let earlier = Utc::now();
        let later = earlier + chrono::Duration::seconds(1);
        assert_eq!(next_timestamp(earlier, later), later);
        assert_eq!(
            next_timestamp(later, earlier),
            later + chrono::Duration::microseconds(1)
        );
    }
}
