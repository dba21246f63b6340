//! Handlers for `/titles/{title_id}/reviews`.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use yamdb_core::error::CoreError;
use yamdb_core::pagination::Page;
use yamdb_core::permissions::{Action, AUTHOR_OR_READ_ONLY};
use yamdb_core::review::ensure_single_review;
use yamdb_core::types::DbId;
use yamdb_core::validation::{score_from_json, validate_text};
use yamdb_db::models::review::{CreateReview, Review, UpdateReview};
use yamdb_db::repositories::{ReviewRepo, TitleRepo};
use yamdb_db::DbPool;

use crate::error::AppResult;
use crate::middleware::auth::MaybeAuthUser;
use crate::middleware::rbac::guard;
use crate::query::PaginationParams;
use crate::state::AppState;

/// Request body for `POST /reviews`.
///
/// `score` is taken as raw JSON so floats and strings are reported as an
/// out-of-range score rather than a deserialization failure.
#[derive(Debug, Deserialize)]
pub struct CreateReviewRequest {
    pub text: String,
    pub score: serde_json::Value,
}

/// Request body for `PATCH /reviews/{id}`.
#[derive(Debug, Deserialize)]
pub struct UpdateReviewRequest {
    pub text: Option<String>,
    pub score: Option<serde_json::Value>,
}

/// GET /api/v1/titles/{title_id}/reviews
pub async fn list(
    State(state): State<AppState>,
    user: MaybeAuthUser,
    Path(title_id): Path<DbId>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<Page<Review>>> {
    guard(AUTHOR_OR_READ_ONLY, &user, Action::List, None)?;
    ensure_title(&state.pool, title_id).await?;

    let results = ReviewRepo::list_for_title(&state.pool, title_id, params.page()).await?;
    let count = ReviewRepo::count_for_title(&state.pool, title_id).await?;
    Ok(Json(Page { count, results }))
}

/// GET /api/v1/titles/{title_id}/reviews/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    user: MaybeAuthUser,
    Path((title_id, id)): Path<(DbId, DbId)>,
) -> AppResult<Json<Review>> {
    let review = find_review(&state.pool, title_id, id).await?;
    guard(AUTHOR_OR_READ_ONLY, &user, Action::Retrieve, Some(&review))?;
    Ok(Json(review))
}

/// POST /api/v1/titles/{title_id}/reviews
///
/// The existing-review lookup and the insert share a transaction; the
/// `uq_reviews_author_title` constraint catches whatever races past it.
pub async fn create(
    State(state): State<AppState>,
    user: MaybeAuthUser,
    Path(title_id): Path<DbId>,
    Json(input): Json<CreateReviewRequest>,
) -> AppResult<(StatusCode, Json<Review>)> {
    guard(AUTHOR_OR_READ_ONLY, &user, Action::Create, None)?;
    let author = user.require()?;
    ensure_title(&state.pool, title_id).await?;

    let text = validate_text("text", &input.text)?.to_string();
    let score = score_from_json(&input.score)?;

    let mut tx = state.pool.begin().await?;
    let existing = ReviewRepo::find_id_by_author(&mut *tx, title_id, author.user_id).await?;
    ensure_single_review(existing, Action::Create)?;
    let review = ReviewRepo::insert(
        &mut *tx,
        &CreateReview {
            title_id,
            author_id: author.user_id,
            text,
            score,
        },
    )
    .await?;
    tx.commit().await?;

    tracing::info!(review_id = review.id, title_id, author_id = author.user_id, "Review created");
    Ok((StatusCode::CREATED, Json(review)))
}

/// PATCH /api/v1/titles/{title_id}/reviews/{id}
pub async fn update(
    State(state): State<AppState>,
    user: MaybeAuthUser,
    Path((title_id, id)): Path<(DbId, DbId)>,
    Json(input): Json<UpdateReviewRequest>,
) -> AppResult<Json<Review>> {
    guard(AUTHOR_OR_READ_ONLY, &user, Action::Update, None)?;
    let review = find_review(&state.pool, title_id, id).await?;
    guard(AUTHOR_OR_READ_ONLY, &user, Action::Update, Some(&review))?;

    let text = input
        .text
        .as_deref()
        .map(|t| validate_text("text", t).map(str::to_string))
        .transpose()?;
    let score = input.score.as_ref().map(score_from_json).transpose()?;

    let updated = ReviewRepo::update(&state.pool, title_id, id, &UpdateReview { text, score })
        .await?
        .ok_or_else(|| CoreError::not_found("Review", id))?;
    Ok(Json(updated))
}

/// DELETE /api/v1/titles/{title_id}/reviews/{id}
pub async fn delete(
    State(state): State<AppState>,
    user: MaybeAuthUser,
    Path((title_id, id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    guard(AUTHOR_OR_READ_ONLY, &user, Action::Destroy, None)?;
    let review = find_review(&state.pool, title_id, id).await?;
    guard(AUTHOR_OR_READ_ONLY, &user, Action::Destroy, Some(&review))?;

    if ReviewRepo::delete(&state.pool, title_id, id).await? {
        tracing::info!(review_id = id, title_id, "Review deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(CoreError::not_found("Review", id).into())
    }
}

async fn ensure_title(pool: &DbPool, title_id: DbId) -> AppResult<()> {
    TitleRepo::find_by_id(pool, title_id)
        .await?
        .map(|_| ())
        .ok_or_else(|| CoreError::not_found("Title", title_id).into())
}

/// A review of `title_id`, or 404 when either does not exist.
pub(crate) async fn find_review(pool: &DbPool, title_id: DbId, id: DbId) -> AppResult<Review> {
    ReviewRepo::find(pool, title_id, id)
        .await?
        .ok_or_else(|| CoreError::not_found("Review", id).into())
}
