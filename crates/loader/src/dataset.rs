//! Reads every import file and resolves foreign keys before any write.

use std::path::Path;

use yamdb_core::clock::Clock;

use crate::error::LoadError;
use crate::rows::{
    catalogue_row, comment_row, genre_title_row, review_row, title_row, user_row, CatalogueRow,
    CommentRow, GenreTitleRow, Known, ReviewRow, TitleRow, UserRow, CATALOGUE_COLUMNS,
    COMMENT_COLUMNS, GENRE_TITLE_COLUMNS, REVIEW_COLUMNS, TITLE_COLUMNS, USER_COLUMNS,
};
use crate::table::{CsvTable, Row};

pub const GENRE_FILE: &str = "genre.csv";
pub const CATEGORY_FILE: &str = "category.csv";
pub const TITLE_FILE: &str = "titles.csv";
pub const GENRE_TITLE_FILE: &str = "genre_title.csv";
pub const USER_FILE: &str = "users.csv";
pub const REVIEW_FILE: &str = "review.csv";
pub const COMMENT_FILE: &str = "comments.csv";

/// The full import, checked and ready to insert.
#[derive(Debug, Default)]
pub struct Dataset {
    pub genres: Vec<CatalogueRow>,
    pub categories: Vec<CatalogueRow>,
    pub titles: Vec<TitleRow>,
    pub genre_titles: Vec<GenreTitleRow>,
    pub users: Vec<UserRow>,
    pub reviews: Vec<ReviewRow>,
    pub comments: Vec<CommentRow>,
}

impl Dataset {
    /// Read the seven files from `dir` in dependency order.
    pub fn read(dir: &Path, clock: &dyn Clock) -> Result<Self, LoadError> {
        let mut known = Known::default();

        let genres = read_file(
            dir,
            GENRE_FILE,
            CATALOGUE_COLUMNS,
            CATALOGUE_COLUMNS,
            catalogue_row,
        )?;
        known.genres.extend(genres.iter().map(|r| r.id));

        let categories = read_file(
            dir,
            CATEGORY_FILE,
            CATALOGUE_COLUMNS,
            CATALOGUE_COLUMNS,
            catalogue_row,
        )?;
        known.categories.extend(categories.iter().map(|r| r.id));

        let titles = read_file(dir, TITLE_FILE, TITLE_COLUMNS, &["id", "name", "year"], |row| {
            title_row(row, &known, clock)
        })?;
        known.titles.extend(titles.iter().map(|r| r.id));

        let genre_titles = read_file(
            dir,
            GENRE_TITLE_FILE,
            GENRE_TITLE_COLUMNS,
            GENRE_TITLE_COLUMNS,
            |row| genre_title_row(row, &known),
        )?;

        let users = read_file(
            dir,
            USER_FILE,
            USER_COLUMNS,
            &["id", "username", "email"],
            user_row,
        )?;
        known.users.extend(users.iter().map(|r| r.id));

        let reviews = read_file(
            dir,
            REVIEW_FILE,
            REVIEW_COLUMNS,
            &["id", "title", "author", "text", "score"],
            |row| review_row(row, &known),
        )?;
        known.reviews.extend(reviews.iter().map(|r| r.id));

        let comments = read_file(
            dir,
            COMMENT_FILE,
            COMMENT_COLUMNS,
            &["id", "review", "author", "text"],
            |row| comment_row(row, &known),
        )?;

        Ok(Self {
            genres,
            categories,
            titles,
            genre_titles,
            users,
            reviews,
            comments,
        })
    }
}

fn read_file<T>(
    dir: &Path,
    file: &'static str,
    allowed: &[&str],
    required: &[&str],
    build: impl Fn(&Row) -> Result<T, LoadError>,
) -> Result<Vec<T>, LoadError> {
    let table = CsvTable::read(dir, file, allowed)?;
    table.require(required)?;
    table.rows().map(|row| build(&row)).collect()
}
