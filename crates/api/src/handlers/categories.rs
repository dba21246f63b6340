//! Handlers for the `/categories` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use yamdb_core::error::CoreError;
use yamdb_core::pagination::Page;
use yamdb_core::permissions::{Action, ADMIN_OR_READ_ONLY};
use yamdb_db::models::category::{Category, CreateCategory};
use yamdb_db::repositories::CategoryRepo;

use super::catalogue::CatalogueEntryInput;
use crate::error::AppResult;
use crate::middleware::auth::MaybeAuthUser;
use crate::middleware::rbac::guard;
use crate::query::SearchParams;
use crate::state::AppState;

/// GET /api/v1/categories
pub async fn list(
    State(state): State<AppState>,
    user: MaybeAuthUser,
    Query(params): Query<SearchParams>,
) -> AppResult<Json<Page<Category>>> {
    guard(ADMIN_OR_READ_ONLY, &user, Action::List, None)?;

    let results = CategoryRepo::list(&state.pool, params.term(), params.page()).await?;
    let count = CategoryRepo::count(&state.pool, params.term()).await?;
    Ok(Json(Page { count, results }))
}

/// POST /api/v1/categories
pub async fn create(
    State(state): State<AppState>,
    user: MaybeAuthUser,
    Json(input): Json<CatalogueEntryInput>,
) -> AppResult<(StatusCode, Json<Category>)> {
    guard(ADMIN_OR_READ_ONLY, &user, Action::Create, None)?;

    let (name, slug) = input.into_parts()?;
    let category = CategoryRepo::create(&state.pool, &CreateCategory { name, slug }).await?;
    tracing::info!(slug = %category.slug, "Category created");
    Ok((StatusCode::CREATED, Json(category)))
}

/// DELETE /api/v1/categories/{slug}
///
/// Titles in the category keep existing with no category.
pub async fn delete(
    State(state): State<AppState>,
    user: MaybeAuthUser,
    Path(slug): Path<String>,
) -> AppResult<StatusCode> {
    guard(ADMIN_OR_READ_ONLY, &user, Action::Destroy, None)?;

    if CategoryRepo::delete_by_slug(&state.pool, &slug).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(CoreError::not_found("Category", slug).into())
    }
}
