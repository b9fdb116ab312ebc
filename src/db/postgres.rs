use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};

use super::{
    group_entries, PlatformRepository, PlatformWithEntries, ReviewRepository, StoreError,
    StoreResult, WatchlistRepository,
};
use crate::models::{
    Platform, PlatformInput, RecordId, Review, ReviewInput, WatchlistEntry, WatchlistEntryInput,
};

/// PostgreSQL SQLSTATE for foreign key violations
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Creates a PostgreSQL connection pool
pub async fn create_pool(database_url: &str, max_connections: u32) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    Ok(pool)
}

/// Store backed by the tables in `migrations/`.
///
/// Cascades are enforced by `ON DELETE CASCADE` foreign keys; a dangling
/// reference on insert or update surfaces as [`StoreError::MissingParent`].
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Applies pending migrations
    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        tracing::info!("Database migrations applied");
        Ok(())
    }
}

/// Maps a foreign key violation to the parent that was referenced
fn missing_parent(err: sqlx::Error, field: &'static str, id: RecordId) -> StoreError {
    match &err {
        sqlx::Error::Database(db_err)
            if db_err.code().as_deref() == Some(FOREIGN_KEY_VIOLATION) =>
        {
            StoreError::MissingParent { field, id }
        }
        _ => StoreError::Database(err),
    }
}

const ENTRY_COLUMNS: &str = "id, title, platform_id, storyline, active, created";
const REVIEW_COLUMNS: &str = "id, rating, description, watchlist_id, active, created, updated";

#[async_trait]
impl PlatformRepository for PgStore {
    async fn create(&self, input: PlatformInput) -> StoreResult<Platform> {
        let platform = sqlx::query_as::<_, Platform>(
            "INSERT INTO platforms (name, about, website) VALUES ($1, $2, $3)
             RETURNING id, name, about, website",
        )
        .bind(&input.name)
        .bind(&input.about)
        .bind(&input.website)
        .fetch_one(&self.pool)
        .await?;

        Ok(platform)
    }

    async fn get(&self, id: RecordId) -> StoreResult<Option<Platform>> {
        let platform = sqlx::query_as::<_, Platform>(
            "SELECT id, name, about, website FROM platforms WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(platform)
    }

    async fn list(&self) -> StoreResult<Vec<Platform>> {
        let platforms = sqlx::query_as::<_, Platform>(
            "SELECT id, name, about, website FROM platforms ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(platforms)
    }

    async fn list_with_entries(&self) -> StoreResult<Vec<PlatformWithEntries>> {
        // Both reads see the same snapshot
        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await?;

        let platforms = sqlx::query_as::<_, Platform>(
            "SELECT id, name, about, website FROM platforms ORDER BY id",
        )
        .fetch_all(&mut *tx)
        .await?;
        let query = format!("SELECT {ENTRY_COLUMNS} FROM watchlist_entries ORDER BY id");
        let entries = sqlx::query_as::<_, WatchlistEntry>(&query)
            .fetch_all(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(group_entries(platforms, entries))
    }

    async fn update(&self, id: RecordId, input: PlatformInput) -> StoreResult<Option<Platform>> {
        let platform = sqlx::query_as::<_, Platform>(
            "UPDATE platforms SET name = $2, about = $3, website = $4 WHERE id = $1
             RETURNING id, name, about, website",
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.about)
        .bind(&input.website)
        .fetch_optional(&self.pool)
        .await?;

        Ok(platform)
    }

    async fn delete(&self, id: RecordId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM platforms WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl WatchlistRepository for PgStore {
    async fn create(&self, input: WatchlistEntryInput) -> StoreResult<WatchlistEntry> {
        let query = format!(
            "INSERT INTO watchlist_entries (title, platform_id, storyline, active)
             VALUES ($1, $2, $3, $4) RETURNING {ENTRY_COLUMNS}"
        );
        sqlx::query_as::<_, WatchlistEntry>(&query)
            .bind(&input.title)
            .bind(input.platform_id)
            .bind(&input.storyline)
            .bind(input.active.unwrap_or(true))
            .fetch_one(&self.pool)
            .await
            .map_err(|e| missing_parent(e, "platform", input.platform_id))
    }

    async fn get(&self, id: RecordId) -> StoreResult<Option<WatchlistEntry>> {
        let query = format!("SELECT {ENTRY_COLUMNS} FROM watchlist_entries WHERE id = $1");
        let entry = sqlx::query_as::<_, WatchlistEntry>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(entry)
    }

    async fn list(&self) -> StoreResult<Vec<WatchlistEntry>> {
        let query = format!("SELECT {ENTRY_COLUMNS} FROM watchlist_entries ORDER BY id");
        let entries = sqlx::query_as::<_, WatchlistEntry>(&query)
            .fetch_all(&self.pool)
            .await?;

        Ok(entries)
    }

    async fn list_by_platform(&self, platform_id: RecordId) -> StoreResult<Vec<WatchlistEntry>> {
        let query = format!(
            "SELECT {ENTRY_COLUMNS} FROM watchlist_entries WHERE platform_id = $1 ORDER BY id"
        );
        let entries = sqlx::query_as::<_, WatchlistEntry>(&query)
            .bind(platform_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(entries)
    }

    async fn update(
        &self,
        id: RecordId,
        input: WatchlistEntryInput,
    ) -> StoreResult<Option<WatchlistEntry>> {
        let query = format!(
            "UPDATE watchlist_entries
             SET title = $2, platform_id = $3, storyline = $4, active = COALESCE($5, active)
             WHERE id = $1 RETURNING {ENTRY_COLUMNS}"
        );
        sqlx::query_as::<_, WatchlistEntry>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(input.platform_id)
            .bind(&input.storyline)
            .bind(input.active)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| missing_parent(e, "platform", input.platform_id))
    }

    async fn delete(&self, id: RecordId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM watchlist_entries WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl ReviewRepository for PgStore {
    async fn create(&self, input: ReviewInput) -> StoreResult<Review> {
        let query = format!(
            "INSERT INTO reviews (rating, description, watchlist_id, active)
             VALUES ($1, $2, $3, $4) RETURNING {REVIEW_COLUMNS}"
        );
        sqlx::query_as::<_, Review>(&query)
            .bind(input.rating)
            .bind(&input.description)
            .bind(input.watchlist_id)
            .bind(input.active.unwrap_or(true))
            .fetch_one(&self.pool)
            .await
            .map_err(|e| missing_parent(e, "watchlist", input.watchlist_id))
    }

    async fn get(&self, id: RecordId) -> StoreResult<Option<Review>> {
        let query = format!("SELECT {REVIEW_COLUMNS} FROM reviews WHERE id = $1");
        let review = sqlx::query_as::<_, Review>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(review)
    }

    async fn list(&self) -> StoreResult<Vec<Review>> {
        let query = format!("SELECT {REVIEW_COLUMNS} FROM reviews ORDER BY id");
        let reviews = sqlx::query_as::<_, Review>(&query)
            .fetch_all(&self.pool)
            .await?;

        Ok(reviews)
    }

    async fn update(&self, id: RecordId, input: ReviewInput) -> StoreResult<Option<Review>> {
        // `updated` must move forward even if the clock has not
        let query = format!(
            "UPDATE reviews
             SET rating = $2, description = $3, watchlist_id = $4, active = COALESCE($5, active),
                 updated = GREATEST(now(), updated + interval '1 microsecond')
             WHERE id = $1 RETURNING {REVIEW_COLUMNS}"
        );
        sqlx::query_as::<_, Review>(&query)
            .bind(id)
            .bind(input.rating)
            .bind(&input.description)
            .bind(input.watchlist_id)
            .bind(input.active)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| missing_parent(e, "watchlist", input.watchlist_id))
    }

    async fn delete(&self, id: RecordId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
