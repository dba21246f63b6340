//! Single-field validators.
//!
//! Every validator is pure and returns its input unchanged on success.

use std::sync::LazyLock;

use regex::Regex;

use crate::clock::Clock;
use crate::error::ValidationError;

/// Username that would collide with the `/users/me` route.
pub const RESERVED_USERNAME: &str = "me";

pub const MIN_SCORE: i64 = 0;
pub const MAX_SCORE: i64 = 10;

pub const MAX_NAME_LENGTH: usize = 256;
pub const MAX_SLUG_LENGTH: usize = 50;
pub const MAX_USERNAME_LENGTH: usize = 150;
pub const MAX_EMAIL_LENGTH: usize = 254;

static SLUG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-a-zA-Z0-9_]+$").expect("valid regex"));

static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w.@+-]+$").expect("valid regex"));

/// Release year must be positive and not in the future.
pub fn validate_year(value: i32, clock: &dyn Clock) -> Result<i32, ValidationError> {
    let current_year = clock.current_year();
    if value <= 0 || value > current_year {
        return Err(ValidationError::YearOutOfRange {
            year: value,
            current_year,
        });
    }
    Ok(value)
}

/// Review score must lie in `[0, 10]`.
pub fn validate_score(value: i64) -> Result<i64, ValidationError> {
    if !(MIN_SCORE..=MAX_SCORE).contains(&value) {
        return Err(ValidationError::ScoreOutOfRange);
    }
    Ok(value)
}

/// Extract a score from raw JSON.
///
/// Floats (`7.5`), strings (`"7"`) and other non-integers are rejected with
/// the same error as out-of-range integers.
pub fn score_from_json(value: &serde_json::Value) -> Result<i32, ValidationError> {
    let score = value.as_i64().ok_or(ValidationError::ScoreOutOfRange)?;
    // In range, so the narrowing cast is lossless.
    validate_score(score).map(|s| s as i32)
}

/// Reject the reserved username.
pub fn validate_username(value: &str) -> Result<&str, ValidationError> {
    if value == RESERVED_USERNAME {
        return Err(ValidationError::ReservedUsername);
    }
    Ok(value)
}

/// Letters, digits and `@.+-_`, at most 150 characters.
pub fn validate_username_format(value: &str) -> Result<&str, ValidationError> {
    if value.chars().count() > MAX_USERNAME_LENGTH || !USERNAME_RE.is_match(value) {
        return Err(ValidationError::invalid(
            "username",
            format!(
                "Username must be 1-{MAX_USERNAME_LENGTH} characters of letters, digits and @/./+/-/_"
            ),
        ));
    }
    Ok(value)
}

/// Category and genre slugs.
pub fn validate_slug(value: &str) -> Result<&str, ValidationError> {
    if value.len() > MAX_SLUG_LENGTH || !SLUG_RE.is_match(value) {
        return Err(ValidationError::InvalidSlug(value.to_string()));
    }
    Ok(value)
}

/// Required free text (review and comment bodies).
pub fn validate_text<'a>(field: &str, value: &'a str) -> Result<&'a str, ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::invalid(
            field,
            format!("The {field} field must not be blank"),
        ));
    }
    Ok(value)
}
