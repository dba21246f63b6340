//! One-review-per-title rule.
//!
//! The database constraint `uq_reviews_author_title` is the authoritative
//! guard. This pre-check runs inside the insert transaction so the common
//! case gets a clean field error instead of a constraint violation.

use crate::error::ValidationError;
use crate::permissions::Action;
use crate::types::DbId;

/// Name of the unique constraint on `reviews (author_id, title_id)`.
pub const REVIEW_UNIQUE_CONSTRAINT: &str = "uq_reviews_author_title";

/// Reject a second review by the same author for the same title.
///
/// `existing` is the id of the author's current review of the title, if
/// any. Updating that review is always allowed.
pub fn ensure_single_review(existing: Option<DbId>, action: Action) -> Result<(), ValidationError> {
    match (existing, action) {
        (Some(_), Action::Create) => Err(ValidationError::DuplicateReview),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_review_is_accepted() {
        assert!(ensure_single_review(None, Action::Create).is_ok());
    }

    #[test]
    fn second_create_is_a_duplicate() {
        assert_eq!(
            ensure_single_review(Some(7), Action::Create),
            Err(ValidationError::DuplicateReview)
        );
    }

    #[test]
    fn updating_the_existing_review_is_accepted() {
        assert!(ensure_single_review(Some(7), Action::Update).is_ok());
    }
}
