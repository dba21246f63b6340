//! Bulk CSV import for the YaMDb database.
//!
//! [`load`] reads `genre.csv`, `category.csv`, `titles.csv`,
//! `genre_title.csv`, `users.csv`, `review.csv` and `comments.csv`, checks
//! every row and reference, then replaces the existing rows in a single
//! transaction.
//!
//! [`create_superuser`] adds the first admin account to an empty database.

pub mod dataset;
pub mod error;
pub mod prompt;
pub mod rows;
pub mod store;
pub mod superuser;
pub mod table;

use std::path::Path;

use yamdb_core::clock::Clock;
use yamdb_db::DbPool;

pub use dataset::Dataset;
pub use error::LoadError;
pub use store::LoadSummary;
pub use superuser::create_superuser;

/// Read, check and store the import found in `dir`.
pub async fn load(pool: &DbPool, dir: &Path, clock: &dyn Clock) -> Result<LoadSummary, LoadError> {
    let data = Dataset::read(dir, clock)?;
    tracing::info!(dir = %dir.display(), "Import files read and checked");

    let summary = store::replace_all(pool, &data).await?;
    tracing::info!(
        genres = summary.genres,
        categories = summary.categories,
        titles = summary.titles,
        genre_titles = summary.genre_titles,
        users = summary.users,
        reviews = summary.reviews,
        comments = summary.comments,
        "Import committed"
    );
    Ok(summary)
}
