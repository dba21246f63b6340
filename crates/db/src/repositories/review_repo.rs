//! Repository for the `reviews` table.

use sqlx::{PgConnection, PgPool};
use yamdb_core::pagination::PageRequest;
use yamdb_core::types::DbId;

use crate::models::review::{CreateReview, Review, UpdateReview};

/// Review columns with the author's username; expects `r` and `u` aliases.
const COLUMNS: &str = "r.id, r.title_id, r.author_id, u.username AS author, r.text, r.score, r.pub_date";

/// Provides CRUD operations for reviews.
pub struct ReviewRepo;

impl ReviewRepo {
    /// Id of `author_id`'s review of `title_id`, if one exists.
    ///
    /// Runs on the caller's transaction so the check and the insert share a
    /// snapshot.
    pub async fn find_id_by_author(
        conn: &mut PgConnection,
        title_id: DbId,
        author_id: DbId,
    ) -> Result<Option<DbId>, sqlx::Error> {
        sqlx::query_scalar("SELECT id FROM reviews WHERE title_id = $1 AND author_id = $2")
            .bind(title_id)
            .bind(author_id)
            .fetch_optional(conn)
            .await
    }

    /// Insert a review on the caller's transaction.
    ///
    /// A second review by the same author for the same title violates
    /// `uq_reviews_author_title`.
    pub async fn insert(conn: &mut PgConnection, input: &CreateReview) -> Result<Review, sqlx::Error> {
        let query = format!(
            "WITH r AS (
                INSERT INTO reviews (title_id, author_id, text, score)
                VALUES ($1, $2, $3, $4)
                RETURNING *
             )
             SELECT {COLUMNS} FROM r JOIN users u ON u.id = r.author_id"
        );
        sqlx::query_as::<_, Review>(&query)
            .bind(input.title_id)
            .bind(input.author_id)
            .bind(&input.text)
            .bind(input.score)
            .fetch_one(conn)
            .await
    }

    /// Find a review of a specific title.
    pub async fn find(
        pool: &PgPool,
        title_id: DbId,
        id: DbId,
    ) -> Result<Option<Review>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM reviews r JOIN users u ON u.id = r.author_id
             WHERE r.title_id = $1 AND r.id = $2"
        );
        sqlx::query_as::<_, Review>(&query)
            .bind(title_id)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a title's reviews newest first.
    pub async fn list_for_title(
        pool: &PgPool,
        title_id: DbId,
        page: PageRequest,
    ) -> Result<Vec<Review>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM reviews r JOIN users u ON u.id = r.author_id
             WHERE r.title_id = $1
             ORDER BY r.id DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Review>(&query)
            .bind(title_id)
            .bind(page.limit)
            .bind(page.offset)
            .fetch_all(pool)
            .await
    }

    pub async fn count_for_title(pool: &PgPool, title_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM reviews WHERE title_id = $1")
            .bind(title_id)
            .fetch_one(pool)
            .await
    }

    /// Patch a review. Returns `None` if it does not exist under `title_id`.
    pub async fn update(
        pool: &PgPool,
        title_id: DbId,
        id: DbId,
        input: &UpdateReview,
    ) -> Result<Option<Review>, sqlx::Error> {
        let query = format!(
            "WITH r AS (
                UPDATE reviews SET
                    text = COALESCE($3, text),
                    score = COALESCE($4, score)
                WHERE title_id = $1 AND id = $2
                RETURNING *
             )
             SELECT {COLUMNS} FROM r JOIN users u ON u.id = r.author_id"
        );
        sqlx::query_as::<_, Review>(&query)
            .bind(title_id)
            .bind(id)
            .bind(&input.text)
            .bind(input.score)
            .fetch_optional(pool)
            .await
    }

    /// Delete a review and its comments. Returns `true` if a row was deleted.
    pub async fn delete(pool: &PgPool, title_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM reviews WHERE title_id = $1 AND id = $2")
            .bind(title_id)
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
