//! Title model, read projection and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use yamdb_core::types::DbId;

use super::category::Category;
use super::genre::Genre;

/// A row from the `titles` table.
#[derive(Debug, Clone, FromRow)]
pub struct Title {
    pub id: DbId,
    pub name: String,
    pub year: i32,
    pub description: Option<String>,
    pub category_id: Option<DbId>,
}

/// Flat read row: title joined with its category and average score.
#[derive(Debug, Clone, FromRow)]
pub struct TitleRow {
    pub id: DbId,
    pub name: String,
    pub year: i32,
    pub description: Option<String>,
    pub rating: Option<i32>,
    pub category_id: Option<DbId>,
    pub category_name: Option<String>,
    pub category_slug: Option<String>,
}

/// Title as returned by list/retrieve: nested genres and category plus the
/// rounded mean review score (`None` until reviewed).
#[derive(Debug, Clone, Serialize)]
pub struct TitleDetail {
    pub id: DbId,
    pub name: String,
    pub year: i32,
    pub rating: Option<i32>,
    pub description: Option<String>,
    pub genre: Vec<Genre>,
    pub category: Option<Category>,
}

impl TitleDetail {
    pub fn from_row(row: TitleRow, genre: Vec<Genre>) -> Self {
        let category = match (row.category_id, row.category_name, row.category_slug) {
            (Some(id), Some(name), Some(slug)) => Some(Category { id, name, slug }),
            _ => None,
        };
        Self {
            id: row.id,
            name: row.name,
            year: row.year,
            rating: row.rating,
            description: row.description,
            genre,
            category,
        }
    }
}

/// Filters accepted by the title list (`?genre=&category=&year=&name=`).
///
/// `genre` and `category` match slugs, `name` matches the title name; all
/// three are case-insensitive substring matches. `year` is exact.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TitleFilter {
    pub genre: Option<String>,
    pub category: Option<String>,
    pub year: Option<i32>,
    pub name: Option<String>,
}

/// DTO for inserting a title with genre and category ids already resolved.
#[derive(Debug, Clone)]
pub struct CreateTitle {
    pub name: String,
    pub year: i32,
    pub description: Option<String>,
    pub category_id: Option<DbId>,
    pub genre_ids: Vec<DbId>,
}

/// DTO for patching a title. `genre_ids = Some(..)` replaces the genre set.
///
/// `description` and `category_id` are `Option<Option<_>>`: `Some(None)`
/// clears the column, `None` keeps it.
#[derive(Debug, Clone, Default)]
pub struct UpdateTitle {
    pub name: Option<String>,
    pub year: Option<i32>,
    pub description: Option<Option<String>>,
    pub category_id: Option<Option<DbId>>,
    pub genre_ids: Option<Vec<DbId>>,
}
