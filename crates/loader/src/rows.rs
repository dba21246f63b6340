//! One builder per entity: CSV row in, checked insert row out.
//!
//! Builders see only rows of files loaded before theirs (through
//! [`Known`]), which fixes the load order: genres, categories, titles,
//! genre links, users, reviews, comments.

use std::collections::HashSet;
use std::str::FromStr;

use yamdb_core::clock::Clock;
use yamdb_core::roles::Role;
use yamdb_core::types::{DbId, Timestamp};
use yamdb_core::validation::{
    validate_score, validate_slug, validate_text, validate_username, validate_username_format,
    validate_year, MAX_NAME_LENGTH,
};

use crate::error::LoadError;
use crate::table::Row;

pub const CATALOGUE_COLUMNS: &[&str] = &["id", "name", "slug"];
pub const TITLE_COLUMNS: &[&str] = &["id", "name", "year", "description", "category"];
pub const GENRE_TITLE_COLUMNS: &[&str] = &["id", "title", "genre"];
pub const USER_COLUMNS: &[&str] = &[
    "id",
    "username",
    "email",
    "role",
    "bio",
    "first_name",
    "last_name",
];
pub const REVIEW_COLUMNS: &[&str] = &["id", "title", "author", "text", "score", "pub_date"];
pub const COMMENT_COLUMNS: &[&str] = &["id", "review", "author", "text", "pub_date"];

/// Ids already accepted, per entity.
#[derive(Debug, Default)]
pub struct Known {
    pub genres: HashSet<DbId>,
    pub categories: HashSet<DbId>,
    pub titles: HashSet<DbId>,
    pub users: HashSet<DbId>,
    pub reviews: HashSet<DbId>,
}

/// A genre or category.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogueRow {
    pub id: DbId,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TitleRow {
    pub id: DbId,
    pub name: String,
    pub year: i32,
    pub description: Option<String>,
    pub category_id: Option<DbId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenreTitleRow {
    pub id: DbId,
    pub title_id: DbId,
    pub genre_id: DbId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UserRow {
    pub id: DbId,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub bio: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReviewRow {
    pub id: DbId,
    pub title_id: DbId,
    pub author_id: DbId,
    pub text: String,
    pub score: i32,
    pub pub_date: Option<Timestamp>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommentRow {
    pub id: DbId,
    pub review_id: DbId,
    pub author_id: DbId,
    pub text: String,
    pub pub_date: Option<Timestamp>,
}

pub fn catalogue_row(row: &Row) -> Result<CatalogueRow, LoadError> {
    let name = name_cell(row, "name")?;
    let slug = row.text("slug")?;
    row.check("slug", slug, validate_slug(slug))?;
    Ok(CatalogueRow {
        id: row.parse("id")?,
        name,
        slug: slug.to_string(),
    })
}

pub fn title_row(row: &Row, known: &Known, clock: &dyn Clock) -> Result<TitleRow, LoadError> {
    let year: i32 = row.parse("year")?;
    row.check("year", row.text("year")?, validate_year(year, clock))?;
    let category_id = match row.optional("category") {
        Some(_) => Some(row.reference("category", &known.categories)?),
        None => None,
    };
    Ok(TitleRow {
        id: row.parse("id")?,
        name: name_cell(row, "name")?,
        year,
        description: row.optional("description").map(str::to_string),
        category_id,
    })
}

pub fn genre_title_row(row: &Row, known: &Known) -> Result<GenreTitleRow, LoadError> {
    Ok(GenreTitleRow {
        id: row.parse("id")?,
        title_id: row.reference("title", &known.titles)?,
        genre_id: row.reference("genre", &known.genres)?,
    })
}

/// Blank `role` means the default role.
pub fn user_row(row: &Row) -> Result<UserRow, LoadError> {
    let username = row.text("username")?;
    row.check("username", username, validate_username(username))?;
    row.check("username", username, validate_username_format(username))?;

    let email = row.text("email")?.trim();
    if !email.contains('@') {
        return Err(row.invalid("email", email, "not an email address"));
    }

    let role = match row.optional("role") {
        Some(value) => row.check("role", value, Role::from_str(value.trim()))?,
        None => Role::default(),
    };

    Ok(UserRow {
        id: row.parse("id")?,
        username: username.to_string(),
        email: email.to_string(),
        role,
        bio: row.optional("bio").map(str::to_string),
        first_name: row.optional("first_name").map(str::to_string),
        last_name: row.optional("last_name").map(str::to_string),
    })
}

pub fn review_row(row: &Row, known: &Known) -> Result<ReviewRow, LoadError> {
    let score: i64 = row.parse("score")?;
    row.check("score", row.text("score")?, validate_score(score))?;
    Ok(ReviewRow {
        id: row.parse("id")?,
        title_id: row.reference("title", &known.titles)?,
        author_id: row.reference("author", &known.users)?,
        text: text_cell(row)?,
        // In range after validate_score.
        score: score as i32,
        pub_date: pub_date(row)?,
    })
}

pub fn comment_row(row: &Row, known: &Known) -> Result<CommentRow, LoadError> {
    Ok(CommentRow {
        id: row.parse("id")?,
        review_id: row.reference("review", &known.reviews)?,
        author_id: row.reference("author", &known.users)?,
        text: text_cell(row)?,
        pub_date: pub_date(row)?,
    })
}

fn name_cell(row: &Row, column: &str) -> Result<String, LoadError> {
    let value = row.text(column)?;
    let length = value.chars().count();
    if length == 0 || length > MAX_NAME_LENGTH {
        return Err(row.invalid(
            column,
            value,
            format!("must be 1-{MAX_NAME_LENGTH} characters"),
        ));
    }
    Ok(value.to_string())
}

fn text_cell(row: &Row) -> Result<String, LoadError> {
    let value = row.text("text")?;
    row.check("text", value, validate_text("text", value))
        .map(str::to_string)
}

/// Missing dates fall back to the database default.
fn pub_date(row: &Row) -> Result<Option<Timestamp>, LoadError> {
    row.optional("pub_date")
        .map(|_| row.parse::<Timestamp>("pub_date"))
        .transpose()
}
