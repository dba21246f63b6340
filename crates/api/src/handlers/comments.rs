//! Handlers for `/titles/{title_id}/reviews/{review_id}/comments`.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use yamdb_core::error::CoreError;
use yamdb_core::pagination::Page;
use yamdb_core::permissions::{Action, AUTHOR_OR_READ_ONLY};
use yamdb_core::types::DbId;
use yamdb_core::validation::validate_text;
use yamdb_db::models::comment::{Comment, CreateComment};
use yamdb_db::repositories::CommentRepo;
use yamdb_db::DbPool;

use super::reviews::find_review;
use crate::error::AppResult;
use crate::middleware::auth::MaybeAuthUser;
use crate::middleware::rbac::guard;
use crate::query::PaginationParams;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCommentRequest {
    pub text: Option<String>,
}

/// GET /api/v1/titles/{title_id}/reviews/{review_id}/comments
pub async fn list(
    State(state): State<AppState>,
    user: MaybeAuthUser,
    Path((title_id, review_id)): Path<(DbId, DbId)>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<Page<Comment>>> {
    guard(AUTHOR_OR_READ_ONLY, &user, Action::List, None)?;
    find_review(&state.pool, title_id, review_id).await?;

    let results = CommentRepo::list_for_review(&state.pool, review_id, params.page()).await?;
    let count = CommentRepo::count_for_review(&state.pool, review_id).await?;
    Ok(Json(Page { count, results }))
}

/// GET /api/v1/titles/{title_id}/reviews/{review_id}/comments/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    user: MaybeAuthUser,
    Path((title_id, review_id, id)): Path<(DbId, DbId, DbId)>,
) -> AppResult<Json<Comment>> {
    find_review(&state.pool, title_id, review_id).await?;
    let comment = find_comment(&state.pool, review_id, id).await?;
    guard(AUTHOR_OR_READ_ONLY, &user, Action::Retrieve, Some(&comment))?;
    Ok(Json(comment))
}

/// POST /api/v1/titles/{title_id}/reviews/{review_id}/comments
pub async fn create(
    State(state): State<AppState>,
    user: MaybeAuthUser,
    Path((title_id, review_id)): Path<(DbId, DbId)>,
    Json(input): Json<CreateCommentRequest>,
) -> AppResult<(StatusCode, Json<Comment>)> {
    guard(AUTHOR_OR_READ_ONLY, &user, Action::Create, None)?;
    let author = user.require()?;
    find_review(&state.pool, title_id, review_id).await?;

    let text = validate_text("text", &input.text)?.to_string();
    let comment = CommentRepo::create(
        &state.pool,
        &CreateComment {
            review_id,
            author_id: author.user_id,
            text,
        },
    )
    .await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

/// PATCH /api/v1/titles/{title_id}/reviews/{review_id}/comments/{id}
pub async fn update(
    State(state): State<AppState>,
    user: MaybeAuthUser,
    Path((title_id, review_id, id)): Path<(DbId, DbId, DbId)>,
    Json(input): Json<UpdateCommentRequest>,
) -> AppResult<Json<Comment>> {
    guard(AUTHOR_OR_READ_ONLY, &user, Action::Update, None)?;
    find_review(&state.pool, title_id, review_id).await?;
    let comment = find_comment(&state.pool, review_id, id).await?;
    guard(AUTHOR_OR_READ_ONLY, &user, Action::Update, Some(&comment))?;

    let Some(text) = input.text else {
        return Ok(Json(comment));
    };
    validate_text("text", &text)?;

    let updated = CommentRepo::update_text(&state.pool, review_id, id, &text)
        .await?
        .ok_or_else(|| CoreError::not_found("Comment", id))?;
    Ok(Json(updated))
}

/// DELETE /api/v1/titles/{title_id}/reviews/{review_id}/comments/{id}
pub async fn delete(
    State(state): State<AppState>,
    user: MaybeAuthUser,
    Path((title_id, review_id, id)): Path<(DbId, DbId, DbId)>,
) -> AppResult<StatusCode> {
    guard(AUTHOR_OR_READ_ONLY, &user, Action::Destroy, None)?;
    find_review(&state.pool, title_id, review_id).await?;
    let comment = find_comment(&state.pool, review_id, id).await?;
    guard(AUTHOR_OR_READ_ONLY, &user, Action::Destroy, Some(&comment))?;

    if CommentRepo::delete(&state.pool, review_id, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(CoreError::not_found("Comment", id).into())
    }
}

async fn find_comment(pool: &DbPool, review_id: DbId, id: DbId) -> AppResult<Comment> {
    CommentRepo::find(pool, review_id, id)
        .await?
        .ok_or_else(|| CoreError::not_found("Comment", id).into())
}
