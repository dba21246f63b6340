//! Input shared by the category and genre endpoints.

use serde::Deserialize;
use validator::Validate;
use yamdb_core::validation::{validate_slug, validate_text};

use crate::error::AppResult;

/// Request body for creating a category or genre.
#[derive(Debug, Deserialize, Validate)]
pub struct CatalogueEntryInput {
    #[validate(length(max = 256, message = "Name must be at most 256 characters"))]
    pub name: String,
    pub slug: String,
}

impl CatalogueEntryInput {
    /// Check every field, returning `(name, slug)`.
    pub fn into_parts(self) -> AppResult<(String, String)> {
        validate_text("name", &self.name)?;
        self.validate()?;
        validate_slug(&self.slug)?;
        Ok((self.name, self.slug))
    }
}
