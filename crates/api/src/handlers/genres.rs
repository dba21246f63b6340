//! Handlers for the `/genres` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use yamdb_core::error::CoreError;
use yamdb_core::pagination::Page;
use yamdb_core::permissions::{Action, ADMIN_OR_READ_ONLY};
use yamdb_db::models::genre::{CreateGenre, Genre};
use yamdb_db::repositories::GenreRepo;

use super::catalogue::CatalogueEntryInput;
use crate::error::AppResult;
use crate::middleware::auth::MaybeAuthUser;
use crate::middleware::rbac::guard;
use crate::query::SearchParams;
use crate::state::AppState;

/// GET /api/v1/genres
pub async fn list(
    State(state): State<AppState>,
    user: MaybeAuthUser,
    Query(params): Query<SearchParams>,
) -> AppResult<Json<Page<Genre>>> {
    guard(ADMIN_OR_READ_ONLY, &user, Action::List, None)?;

    let results = GenreRepo::list(&state.pool, params.term(), params.page()).await?;
    let count = GenreRepo::count(&state.pool, params.term()).await?;
    Ok(Json(Page { count, results }))
}

/// POST /api/v1/genres
pub async fn create(
    State(state): State<AppState>,
    user: MaybeAuthUser,
    Json(input): Json<CatalogueEntryInput>,
) -> AppResult<(StatusCode, Json<Genre>)> {
    guard(ADMIN_OR_READ_ONLY, &user, Action::Create, None)?;

    let (name, slug) = input.into_parts()?;
    let genre = GenreRepo::create(&state.pool, &CreateGenre { name, slug }).await?;
    tracing::info!(slug = %genre.slug, "Genre created");
    Ok((StatusCode::CREATED, Json(genre)))
}

/// DELETE /api/v1/genres/{slug}
///
/// Titles lose the genre; they are not deleted.
pub async fn delete(
    State(state): State<AppState>,
    user: MaybeAuthUser,
    Path(slug): Path<String>,
) -> AppResult<StatusCode> {
    guard(ADMIN_OR_READ_ONLY, &user, Action::Destroy, None)?;

    if GenreRepo::delete_by_slug(&state.pool, &slug).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(CoreError::not_found("Genre", slug).into())
    }
}
