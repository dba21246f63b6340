//! Repository for the `categories` table.

use sqlx::PgPool;
use yamdb_core::pagination::PageRequest;

use crate::like_pattern;
use crate::models::category::{Category, CreateCategory};

const COLUMNS: &str = "id, name, slug";

/// Provides CRUD operations for categories.
pub struct CategoryRepo;

impl CategoryRepo {
    /// Insert a new category, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateCategory) -> Result<Category, sqlx::Error> {
        let query = format!("INSERT INTO categories (name, slug) VALUES ($1, $2) RETURNING {COLUMNS}");
        sqlx::query_as::<_, Category>(&query)
            .bind(&input.name)
            .bind(&input.slug)
            .fetch_one(pool)
            .await
    }

    /// Find a category by slug.
    pub async fn find_by_slug(pool: &PgPool, slug: &str) -> Result<Option<Category>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM categories WHERE slug = $1");
        sqlx::query_as::<_, Category>(&query)
            .bind(slug)
            .fetch_optional(pool)
            .await
    }

    /// List categories by slug descending, optionally filtered by a name substring.
    pub async fn list(
        pool: &PgPool,
        search: Option<&str>,
        page: PageRequest,
    ) -> Result<Vec<Category>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM categories
             WHERE ($1::TEXT IS NULL OR name ILIKE $1)
             ORDER BY slug DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Category>(&query)
            .bind(search.map(like_pattern))
            .bind(page.limit)
            .bind(page.offset)
            .fetch_all(pool)
            .await
    }

    pub async fn count(pool: &PgPool, search: Option<&str>) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM categories WHERE ($1::TEXT IS NULL OR name ILIKE $1)")
            .bind(search.map(like_pattern))
            .fetch_one(pool)
            .await
    }

    /// Delete a category by slug. Titles in it keep existing with no category.
    ///
    /// Returns `true` if a row was deleted.
    pub async fn delete_by_slug(pool: &PgPool, slug: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM categories WHERE slug = $1")
            .bind(slug)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
