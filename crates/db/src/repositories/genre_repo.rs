//! Repository for the `genres` table and genre lookups for titles.

use sqlx::PgPool;
use yamdb_core::pagination::PageRequest;
use yamdb_core::types::DbId;

use crate::like_pattern;
use crate::models::genre::{CreateGenre, Genre, TitleGenre};

const COLUMNS: &str = "id, name, slug";

/// Provides CRUD operations for genres.
pub struct GenreRepo;

impl GenreRepo {
    /// Insert a new genre, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateGenre) -> Result<Genre, sqlx::Error> {
        let query = format!("INSERT INTO genres (name, slug) VALUES ($1, $2) RETURNING {COLUMNS}");
        sqlx::query_as::<_, Genre>(&query)
            .bind(&input.name)
            .bind(&input.slug)
            .fetch_one(pool)
            .await
    }

    /// Find every genre whose slug is in `slugs`. Unknown slugs are skipped.
    pub async fn find_by_slugs(pool: &PgPool, slugs: &[String]) -> Result<Vec<Genre>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM genres WHERE slug = ANY($1) ORDER BY name DESC");
        sqlx::query_as::<_, Genre>(&query)
            .bind(slugs)
            .fetch_all(pool)
            .await
    }

    /// List genres by name descending, optionally filtered by a name substring.
    pub async fn list(
        pool: &PgPool,
        search: Option<&str>,
        page: PageRequest,
    ) -> Result<Vec<Genre>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM genres
             WHERE ($1::TEXT IS NULL OR name ILIKE $1)
             ORDER BY name DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Genre>(&query)
            .bind(search.map(like_pattern))
            .bind(page.limit)
            .bind(page.offset)
            .fetch_all(pool)
            .await
    }

    pub async fn count(pool: &PgPool, search: Option<&str>) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM genres WHERE ($1::TEXT IS NULL OR name ILIKE $1)")
            .bind(search.map(like_pattern))
            .fetch_one(pool)
            .await
    }

    /// Genres attached to any of `title_ids`, for assembling title pages in
    /// one round trip.
    pub async fn list_for_titles(
        pool: &PgPool,
        title_ids: &[DbId],
    ) -> Result<Vec<TitleGenre>, sqlx::Error> {
        sqlx::query_as::<_, TitleGenre>(
            "SELECT gt.title_id, g.id, g.name, g.slug
             FROM genre_title gt
             JOIN genres g ON g.id = gt.genre_id
             WHERE gt.title_id = ANY($1)
             ORDER BY g.name DESC",
        )
        .bind(title_ids)
        .fetch_all(pool)
        .await
    }

    /// Delete a genre by slug. Its title associations go with it.
    ///
    /// Returns `true` if a row was deleted.
    pub async fn delete_by_slug(pool: &PgPool, slug: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM genres WHERE slug = $1")
            .bind(slug)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
