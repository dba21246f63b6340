use std::fmt::Display;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use yamdb_core::error::{CoreError, ValidationError};
use yamdb_core::review::REVIEW_UNIQUE_CONSTRAINT;

const UNIQUE_VIOLATION: &str = "23505";
const CHECK_VIOLATION: &str = "23514";
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Suffix of the foreign keys tying reviews and comments to their author.
const AUTHOR_FOREIGN_KEY_SUFFIX: &str = "_author_id_fkey";

/// Error type returned by every handler.
///
/// Validation failures (including unique violations on known constraints)
/// render as `{"error", "code", "field"}` with 400; everything else as
/// `{"error", "code"}`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::Core(CoreError::Validation(err))
    }
}

/// Report the first failing field of a `#[derive(Validate)]` request body.
impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
        fields.sort_by(|a, b| a.0.cmp(&b.0));

        let Some((field, errs)) = fields.into_iter().next() else {
            return AppError::BadRequest("Invalid request body".into());
        };
        let message = errs
            .first()
            .and_then(|e| e.message.as_ref())
            .map(|m| m.to_string())
            .unwrap_or_else(|| format!("Invalid value for '{field}'"));

        ValidationError::invalid(field.to_string(), message).into()
    }
}

type Rendered = (StatusCode, &'static str, String);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let validation = match &self {
            AppError::Core(CoreError::Validation(err)) => Some(err.clone()),
            AppError::Database(err) => unique_violation(err),
            _ => None,
        };
        if let Some(err) = validation {
            let body = json!({
                "error": err.to_string(),
                "code": err.code(),
                "field": err.field(),
            });
            return (StatusCode::BAD_REQUEST, axum::Json(body)).into_response();
        }

        let (status, code, message): Rendered = match &self {
            AppError::Core(CoreError::NotFound { entity, key }) => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                format!("{entity} '{key}' not found"),
            ),
            AppError::Core(CoreError::Validation(err)) => {
                (StatusCode::BAD_REQUEST, err.code(), err.to_string())
            }
            AppError::Core(CoreError::Unauthorized(msg)) => {
                (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
            }
            AppError::Core(CoreError::PermissionDenied(msg)) => {
                (StatusCode::FORBIDDEN, "PERMISSION_DENIED", msg.clone())
            }
            AppError::Core(CoreError::Internal(msg)) | AppError::InternalError(msg) => {
                internal(msg)
            }
            AppError::Database(err) => classify_sqlx_error(err),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
        };

        (status, axum::Json(json!({ "error": message, "code": code }))).into_response()
    }
}

/// Log the detail, answer with a generic 500.
fn internal(detail: &dyn Display) -> Rendered {
    tracing::error!(error = %detail, "Internal error");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}

/// The field-scoped error a pre-check would have raised for a unique
/// violation on a known constraint.
fn unique_violation(err: &sqlx::Error) -> Option<ValidationError> {
    let sqlx::Error::Database(db_err) = err else {
        return None;
    };
    if db_err.code().as_deref() != Some(UNIQUE_VIOLATION) {
        return None;
    }
    let field = match db_err.constraint()? {
        REVIEW_UNIQUE_CONSTRAINT => return Some(ValidationError::DuplicateReview),
        "uq_users_username" => "username",
        "uq_users_email" => "email",
        "uq_categories_slug" | "uq_genres_slug" => "slug",
        _ => return None,
    };
    Some(ValidationError::AlreadyTaken { field })
}

/// Remaining sqlx errors: other unique constraints are 409, check
/// constraints 400, a missing author 401, anything else 500.
fn classify_sqlx_error(err: &sqlx::Error) -> Rendered {
    let sqlx::Error::Database(db_err) = err else {
        return internal(err);
    };
    let constraint = db_err.constraint().unwrap_or("unknown");
    match db_err.code().as_deref() {
        Some(UNIQUE_VIOLATION) => (
            StatusCode::CONFLICT,
            "CONFLICT",
            format!("Duplicate value violates unique constraint: {constraint}"),
        ),
        Some(CHECK_VIOLATION) => (
            StatusCode::BAD_REQUEST,
            "VALIDATION_ERROR",
            format!("Value violates constraint: {constraint}"),
        ),
        // A token can outlive the account it was issued for.
        Some(FOREIGN_KEY_VIOLATION) if constraint.ends_with(AUTHOR_FOREIGN_KEY_SUFFIX) => (
            StatusCode::UNAUTHORIZED,
            "UNAUTHORIZED",
            "User no longer exists".to_string(),
        ),
        _ => internal(db_err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use validator::Validate;

    async fn into_parts(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn validation_errors_are_field_scoped_400s() {
        let (status, body) = into_parts(ValidationError::ScoreOutOfRange.into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "SCORE_OUT_OF_RANGE");
        assert_eq!(body["field"], "score");
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn authorization_errors_map_to_401_and_403() {
        let (status, body) =
            into_parts(CoreError::Unauthorized("no token".into()).into()).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "UNAUTHORIZED");

        let (status, body) =
            into_parts(CoreError::PermissionDenied("nope".into()).into()).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["code"], "PERMISSION_DENIED");
        assert!(body.get("field").is_none());
    }

    #[tokio::test]
    async fn not_found_maps_to_404() {
        let (status, body) = into_parts(CoreError::not_found("Title", 7).into()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Title '7' not found");
    }

    #[tokio::test]
    async fn internal_errors_are_sanitized() {
        let (status, body) =
            into_parts(AppError::InternalError("secret detail".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "An internal error occurred");
    }

    #[derive(Validate)]
    struct EmailBody {
        #[validate(email(message = "Enter a valid email address"))]
        email: String,
    }

    #[tokio::test]
    async fn derive_validation_reports_first_field() {
        let errors = EmailBody {
            email: "nope".into(),
        }
        .validate()
        .unwrap_err();
        let (status, body) = into_parts(errors.into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["field"], "email");
        assert_eq!(body["error"], "Enter a valid email address");
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }
}
