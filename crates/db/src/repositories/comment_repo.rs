//! Repository for the `comments` table.

use sqlx::PgPool;
use yamdb_core::pagination::PageRequest;
use yamdb_core::types::DbId;

use crate::models::comment::{Comment, CreateComment};

/// Comment columns with the author's username; expects `c` and `u` aliases.
const COLUMNS: &str = "c.id, c.review_id, c.author_id, u.username AS author, c.text, c.pub_date";

/// Provides CRUD operations for comments.
pub struct CommentRepo;

impl CommentRepo {
    /// Insert a comment, returning it with the author's username.
    pub async fn create(pool: &PgPool, input: &CreateComment) -> Result<Comment, sqlx::Error> {
        let query = format!(
            "WITH c AS (
                INSERT INTO comments (review_id, author_id, text)
                VALUES ($1, $2, $3)
                RETURNING *
             )
             SELECT {COLUMNS} FROM c JOIN users u ON u.id = c.author_id"
        );
        sqlx::query_as::<_, Comment>(&query)
            .bind(input.review_id)
            .bind(input.author_id)
            .bind(&input.text)
            .fetch_one(pool)
            .await
    }

    /// Find a comment on a specific review.
    pub async fn find(
        pool: &PgPool,
        review_id: DbId,
        id: DbId,
    ) -> Result<Option<Comment>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM comments c JOIN users u ON u.id = c.author_id
             WHERE c.review_id = $1 AND c.id = $2"
        );
        sqlx::query_as::<_, Comment>(&query)
            .bind(review_id)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a review's comments newest first.
    pub async fn list_for_review(
        pool: &PgPool,
        review_id: DbId,
        page: PageRequest,
    ) -> Result<Vec<Comment>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM comments c JOIN users u ON u.id = c.author_id
             WHERE c.review_id = $1
             ORDER BY c.id DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Comment>(&query)
            .bind(review_id)
            .bind(page.limit)
            .bind(page.offset)
            .fetch_all(pool)
            .await
    }

    pub async fn count_for_review(pool: &PgPool, review_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM comments WHERE review_id = $1")
            .bind(review_id)
            .fetch_one(pool)
            .await
    }

    /// Replace a comment's text. Returns `None` if it does not exist under `review_id`.
    pub async fn update_text(
        pool: &PgPool,
        review_id: DbId,
        id: DbId,
        text: &str,
    ) -> Result<Option<Comment>, sqlx::Error> {
        let query = format!(
            "WITH c AS (
                UPDATE comments SET text = $3
                WHERE review_id = $1 AND id = $2
                RETURNING *
             )
             SELECT {COLUMNS} FROM c JOIN users u ON u.id = c.author_id"
        );
        sqlx::query_as::<_, Comment>(&query)
            .bind(review_id)
            .bind(id)
            .bind(text)
            .fetch_optional(pool)
            .await
    }

    /// Delete a comment. Returns `true` if a row was deleted.
    pub async fn delete(pool: &PgPool, review_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM comments WHERE review_id = $1 AND id = $2")
            .bind(review_id)
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
