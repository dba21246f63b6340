//! Repository for the `titles` and `genre_title` tables.

use std::collections::HashMap;

use sqlx::{PgConnection, PgPool};
use yamdb_core::pagination::PageRequest;
use yamdb_core::types::DbId;

use crate::like_pattern;
use crate::models::genre::Genre;
use crate::models::title::{CreateTitle, Title, TitleDetail, TitleFilter, TitleRow, UpdateTitle};
use crate::repositories::GenreRepo;

const COLUMNS: &str = "id, name, year, description, category_id";

/// Title joined with its category and rounded mean score.
const DETAIL_SELECT: &str = "\
    SELECT t.id, t.name, t.year, t.description, \
           (SELECT ROUND(AVG(r.score))::INTEGER FROM reviews r WHERE r.title_id = t.id) AS rating, \
           c.id AS category_id, c.name AS category_name, c.slug AS category_slug \
    FROM titles t \
    LEFT JOIN categories c ON c.id = t.category_id";

/// `$1` genre slug, `$2` category slug, `$3` year, `$4` name. `NULL` skips a filter.
const FILTER_CLAUSE: &str = "\
    WHERE ($1::TEXT IS NULL OR EXISTS ( \
              SELECT 1 FROM genre_title gt JOIN genres g ON g.id = gt.genre_id \
              WHERE gt.title_id = t.id AND g.slug ILIKE $1)) \
      AND ($2::TEXT IS NULL OR c.slug ILIKE $2) \
      AND ($3::INTEGER IS NULL OR t.year = $3) \
      AND ($4::TEXT IS NULL OR t.name ILIKE $4)";

/// Provides CRUD operations for titles and their genre links.
pub struct TitleRepo;

impl TitleRepo {
    /// Insert a title and its genre links in one transaction.
    pub async fn create(pool: &PgPool, input: &CreateTitle) -> Result<Title, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO titles (name, year, description, category_id)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        let title = sqlx::query_as::<_, Title>(&query)
            .bind(&input.name)
            .bind(input.year)
            .bind(&input.description)
            .bind(input.category_id)
            .fetch_one(&mut *tx)
            .await?;

        Self::set_genres_inner(&mut tx, title.id, &input.genre_ids).await?;

        tx.commit().await?;
        Ok(title)
    }

    /// Find the bare title row.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Title>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM titles WHERE id = $1");
        sqlx::query_as::<_, Title>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a title with its genres, category and rating.
    pub async fn find_detail(pool: &PgPool, id: DbId) -> Result<Option<TitleDetail>, sqlx::Error> {
        let query = format!("{DETAIL_SELECT} WHERE t.id = $1");
        let row = sqlx::query_as::<_, TitleRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;
        match row {
            Some(row) => Ok(Self::attach_genres(pool, vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    /// List titles by name descending, filtered per [`TitleFilter`].
    pub async fn list(
        pool: &PgPool,
        filter: &TitleFilter,
        page: PageRequest,
    ) -> Result<Vec<TitleDetail>, sqlx::Error> {
        let query = format!("{DETAIL_SELECT} {FILTER_CLAUSE} ORDER BY t.name DESC, t.id DESC LIMIT $5 OFFSET $6");
        let rows = sqlx::query_as::<_, TitleRow>(&query)
            .bind(filter.genre.as_deref().map(like_pattern))
            .bind(filter.category.as_deref().map(like_pattern))
            .bind(filter.year)
            .bind(filter.name.as_deref().map(like_pattern))
            .bind(page.limit)
            .bind(page.offset)
            .fetch_all(pool)
            .await?;
        Self::attach_genres(pool, rows).await
    }

    /// Count titles matching the same filter as [`TitleRepo::list`].
    pub async fn count(pool: &PgPool, filter: &TitleFilter) -> Result<i64, sqlx::Error> {
        let query = format!(
            "SELECT COUNT(*) FROM titles t LEFT JOIN categories c ON c.id = t.category_id {FILTER_CLAUSE}"
        );
        sqlx::query_scalar(&query)
            .bind(filter.genre.as_deref().map(like_pattern))
            .bind(filter.category.as_deref().map(like_pattern))
            .bind(filter.year)
            .bind(filter.name.as_deref().map(like_pattern))
            .fetch_one(pool)
            .await
    }

    /// Patch a title. `genre_ids = Some(..)` replaces the whole genre set;
    /// `Some(None)` clears the description or category.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateTitle,
    ) -> Result<Option<Title>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE titles SET
                name = COALESCE($2, name),
                year = COALESCE($3, year),
                description = CASE WHEN $4 THEN $5 ELSE description END,
                category_id = CASE WHEN $6 THEN $7 ELSE category_id END
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let title = sqlx::query_as::<_, Title>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(input.year)
            .bind(input.description.is_some())
            .bind(input.description.as_ref().and_then(|d| d.as_deref()))
            .bind(input.category_id.is_some())
            .bind(input.category_id.flatten())
            .fetch_optional(&mut *tx)
            .await?;

        if let (Some(title), Some(genre_ids)) = (&title, &input.genre_ids) {
            Self::set_genres_inner(&mut tx, title.id, genre_ids).await?;
        }

        tx.commit().await?;
        Ok(title)
    }

    /// Delete a title together with its reviews and comments.
    ///
    /// Returns `true` if a row was deleted.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM titles WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Replace the genre links of a title within the caller's transaction.
    pub async fn set_genres_inner(
        conn: &mut PgConnection,
        title_id: DbId,
        genre_ids: &[DbId],
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM genre_title WHERE title_id = $1")
            .bind(title_id)
            .execute(&mut *conn)
            .await?;

        if !genre_ids.is_empty() {
            sqlx::query(
                "INSERT INTO genre_title (title_id, genre_id)
                 SELECT $1, UNNEST($2::BIGINT[])
                 ON CONFLICT (title_id, genre_id) DO NOTHING",
            )
            .bind(title_id)
            .bind(genre_ids)
            .execute(&mut *conn)
            .await?;
        }
        Ok(())
    }

    async fn attach_genres(
        pool: &PgPool,
        rows: Vec<TitleRow>,
    ) -> Result<Vec<TitleDetail>, sqlx::Error> {
        let ids: Vec<DbId> = rows.iter().map(|r| r.id).collect();
        let mut by_title: HashMap<DbId, Vec<Genre>> = HashMap::new();
        for link in GenreRepo::list_for_titles(pool, &ids).await? {
            by_title.entry(link.title_id).or_default().push(link.into());
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let genres = by_title.remove(&row.id).unwrap_or_default();
                TitleDetail::from_row(row, genres)
            })
            .collect())
    }
}
