//! Replaces the catalogue, accounts and reviews in one transaction.

use sqlx::{PgConnection, PgPool};

use crate::dataset::Dataset;
use crate::error::LoadError;

/// Tables in delete order: children before parents.
const TABLES: &[&str] = &[
    "comments",
    "reviews",
    "genre_title",
    "titles",
    "categories",
    "genres",
    "users",
];

/// Row counts written by [`replace_all`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub genres: usize,
    pub categories: usize,
    pub titles: usize,
    pub genre_titles: usize,
    pub users: usize,
    pub reviews: usize,
    pub comments: usize,
}

/// Delete the existing rows, insert `data` with its own ids and move each
/// id sequence past the highest id. Nothing is kept on error.
pub async fn replace_all(pool: &PgPool, data: &Dataset) -> Result<LoadSummary, LoadError> {
    let mut tx = pool.begin().await?;

    for table in TABLES {
        let deleted = sqlx::query(&format!("DELETE FROM {table}"))
            .execute(&mut *tx)
            .await?
            .rows_affected();
        tracing::debug!(table, deleted, "Existing rows removed");
    }

    insert_rows(&mut *tx, data).await?;

    for table in TABLES {
        reset_sequence(&mut *tx, table).await?;
    }

    tx.commit().await?;

    Ok(LoadSummary {
        genres: data.genres.len(),
        categories: data.categories.len(),
        titles: data.titles.len(),
        genre_titles: data.genre_titles.len(),
        users: data.users.len(),
        reviews: data.reviews.len(),
        comments: data.comments.len(),
    })
}

async fn insert_rows(conn: &mut PgConnection, data: &Dataset) -> Result<(), sqlx::Error> {
    for genre in &data.genres {
        sqlx::query("INSERT INTO genres (id, name, slug) VALUES ($1, $2, $3)")
            .bind(genre.id)
            .bind(&genre.name)
            .bind(&genre.slug)
            .execute(&mut *conn)
            .await?;
    }

    for category in &data.categories {
        sqlx::query("INSERT INTO categories (id, name, slug) VALUES ($1, $2, $3)")
            .bind(category.id)
            .bind(&category.name)
            .bind(&category.slug)
            .execute(&mut *conn)
            .await?;
    }

    for title in &data.titles {
        sqlx::query(
            "INSERT INTO titles (id, name, year, description, category_id)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(title.id)
        .bind(&title.name)
        .bind(title.year)
        .bind(&title.description)
        .bind(title.category_id)
        .execute(&mut *conn)
        .await?;
    }

    for link in &data.genre_titles {
        sqlx::query("INSERT INTO genre_title (id, title_id, genre_id) VALUES ($1, $2, $3)")
            .bind(link.id)
            .bind(link.title_id)
            .bind(link.genre_id)
            .execute(&mut *conn)
            .await?;
    }

    for user in &data.users {
        sqlx::query(
            "INSERT INTO users (id, username, email, role, bio, first_name, last_name)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(user.role.as_str())
        .bind(&user.bio)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .execute(&mut *conn)
        .await?;
    }

    for review in &data.reviews {
        sqlx::query(
            "INSERT INTO reviews (id, title_id, author_id, text, score, pub_date)
             VALUES ($1, $2, $3, $4, $5, COALESCE($6, NOW()))",
        )
        .bind(review.id)
        .bind(review.title_id)
        .bind(review.author_id)
        .bind(&review.text)
        .bind(review.score)
        .bind(review.pub_date)
        .execute(&mut *conn)
        .await?;
    }

    for comment in &data.comments {
        sqlx::query(
            "INSERT INTO comments (id, review_id, author_id, text, pub_date)
             VALUES ($1, $2, $3, $4, COALESCE($5, NOW()))",
        )
        .bind(comment.id)
        .bind(comment.review_id)
        .bind(comment.author_id)
        .bind(&comment.text)
        .bind(comment.pub_date)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

/// Point the `id` sequence at `max(id) + 1` (or 1 for an empty table).
async fn reset_sequence(conn: &mut PgConnection, table: &str) -> Result<(), sqlx::Error> {
    sqlx::query(&format!(
        "SELECT setval(pg_get_serial_sequence('{table}', 'id'),
                       COALESCE((SELECT MAX(id) FROM {table}), 0) + 1,
                       false)"
    ))
    .execute(&mut *conn)
    .await?;
    Ok(())
}
