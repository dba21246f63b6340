//! Genre model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use yamdb_core::types::DbId;

/// A row from the `genres` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Genre {
    #[serde(skip_serializing)]
    pub id: DbId,
    pub name: String,
    pub slug: String,
}

/// A genre together with the title it is attached to, for batch loading.
#[derive(Debug, Clone, FromRow)]
pub struct TitleGenre {
    pub title_id: DbId,
    pub id: DbId,
    pub name: String,
    pub slug: String,
}

impl From<TitleGenre> for Genre {
    fn from(row: TitleGenre) -> Self {
        Self {
            id: row.id,
            name: row.name,
            slug: row.slug,
        }
    }
}

/// DTO for creating a genre.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateGenre {
    pub name: String,
    pub slug: String,
}
