use std::fmt::Display;

/// Field-scoped rejection of client input.
///
/// These represent expected rejections, not faults. Every variant maps to a
/// single request field (or `detail` for object-level rules) and a stable
/// machine-readable code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("The username \"me\" is reserved")]
    ReservedUsername,

    #[error("Year {year} must be greater than 0 and not later than {current_year}")]
    YearOutOfRange { year: i32, current_year: i32 },

    #[error("Score must be an integer from 0 to 10")]
    ScoreOutOfRange,

    #[error("A review for this title has already been left")]
    DuplicateReview,

    #[error("Invalid confirmation code")]
    InvalidConfirmationCode,

    #[error("Slug '{0}' must be 1-50 characters of letters, digits, hyphens or underscores")]
    InvalidSlug(String),

    #[error("This {field} is already taken")]
    AlreadyTaken { field: &'static str },

    #[error("{message}")]
    Invalid { field: String, message: String },
}

impl ValidationError {
    /// Build a generic field error.
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.into(),
            message: message.into(),
        }
    }

    /// The request field this error belongs to.
    pub fn field(&self) -> &str {
        match self {
            Self::ReservedUsername => "username",
            Self::YearOutOfRange { .. } => "year",
            Self::ScoreOutOfRange => "score",
            Self::DuplicateReview => "detail",
            Self::InvalidConfirmationCode => "confirmation_code",
            Self::InvalidSlug(_) => "slug",
            Self::AlreadyTaken { field } => field,
            Self::Invalid { field, .. } => field,
        }
    }

    /// Stable machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::ReservedUsername => "RESERVED_USERNAME",
            Self::YearOutOfRange { .. } => "YEAR_OUT_OF_RANGE",
            Self::ScoreOutOfRange => "SCORE_OUT_OF_RANGE",
            Self::DuplicateReview => "DUPLICATE_REVIEW",
            Self::InvalidConfirmationCode => "INVALID_CONFIRMATION_CODE",
            Self::InvalidSlug(_) => "INVALID_SLUG",
            Self::AlreadyTaken { .. } => "ALREADY_TAKEN",
            Self::Invalid { .. } => "VALIDATION_ERROR",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} '{key}'")]
    NotFound { entity: &'static str, key: String },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub fn not_found(entity: &'static str, key: impl Display) -> Self {
        Self::NotFound {
            entity,
            key: key.to_string(),
        }
    }
}
