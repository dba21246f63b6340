//! Handlers for the `/titles` resource.
//!
//! Reads embed genre and category objects plus the rating; writes refer to
//! genres and the category by slug.

use std::collections::BTreeSet;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Deserializer};
use validator::Validate;
use yamdb_core::error::{CoreError, ValidationError};
use yamdb_core::pagination::{Page, PageRequest};
use yamdb_core::permissions::{Action, ADMIN_OR_READ_ONLY};
use yamdb_core::types::DbId;
use yamdb_core::validation::{validate_text, validate_year};
use yamdb_db::models::title::{CreateTitle, TitleDetail, TitleFilter, UpdateTitle};
use yamdb_db::repositories::{CategoryRepo, GenreRepo, TitleRepo};
use yamdb_db::DbPool;

use crate::error::AppResult;
use crate::middleware::auth::MaybeAuthUser;
use crate::middleware::rbac::guard;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Query parameters for `GET /titles`.
#[derive(Debug, Default, Deserialize)]
pub struct TitleListParams {
    pub genre: Option<String>,
    pub category: Option<String>,
    pub year: Option<i32>,
    pub name: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl TitleListParams {
    fn split(self) -> (TitleFilter, PageRequest) {
        let page = PageRequest::new(self.limit, self.offset);
        let filter = TitleFilter {
            genre: self.genre.filter(|s| !s.is_empty()),
            category: self.category.filter(|s| !s.is_empty()),
            year: self.year,
            name: self.name.filter(|s| !s.is_empty()),
        };
        (filter, page)
    }
}

/// Request body for `POST /titles`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTitleRequest {
    #[validate(length(max = 256, message = "Name must be at most 256 characters"))]
    pub name: String,
    pub year: i32,
    pub description: Option<String>,
    /// Genre slugs.
    #[serde(default)]
    pub genre: Vec<String>,
    /// Category slug.
    pub category: Option<String>,
}

/// Request body for `PATCH /titles/{id}`.
///
/// An explicit `null` clears `description` or `category`; an absent key
/// leaves it unchanged.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTitleRequest {
    #[validate(length(max = 256, message = "Name must be at most 256 characters"))]
    pub name: Option<String>,
    pub year: Option<i32>,
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Option<String>>,
    pub genre: Option<Vec<String>>,
    #[serde(default, deserialize_with = "present")]
    pub category: Option<Option<String>>,
}

/// Map a present key to `Some`, including `null`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/titles
pub async fn list(
    State(state): State<AppState>,
    user: MaybeAuthUser,
    Query(params): Query<TitleListParams>,
) -> AppResult<Json<Page<TitleDetail>>> {
    guard(ADMIN_OR_READ_ONLY, &user, Action::List, None)?;

    let (filter, page) = params.split();
    let results = TitleRepo::list(&state.pool, &filter, page).await?;
    let count = TitleRepo::count(&state.pool, &filter).await?;
    Ok(Json(Page { count, results }))
}

/// GET /api/v1/titles/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    user: MaybeAuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<TitleDetail>> {
    guard(ADMIN_OR_READ_ONLY, &user, Action::Retrieve, None)?;
    Ok(Json(load_detail(&state.pool, id).await?))
}

/// POST /api/v1/titles
pub async fn create(
    State(state): State<AppState>,
    user: MaybeAuthUser,
    Json(input): Json<CreateTitleRequest>,
) -> AppResult<(StatusCode, Json<TitleDetail>)> {
    guard(ADMIN_OR_READ_ONLY, &user, Action::Create, None)?;

    validate_text("name", &input.name)?;
    input.validate()?;
    let year = validate_year(input.year, state.clock.as_ref())?;
    let genre_ids = resolve_genres(&state.pool, &input.genre).await?;
    let category_id = match input.category.as_deref() {
        Some(slug) => Some(resolve_category(&state.pool, slug).await?),
        None => None,
    };

    let title = TitleRepo::create(
        &state.pool,
        &CreateTitle {
            name: input.name,
            year,
            description: input.description,
            category_id,
            genre_ids,
        },
    )
    .await?;
    tracing::info!(title_id = title.id, name = %title.name, "Title created");

    let detail = load_detail(&state.pool, title.id).await?;
    Ok((StatusCode::CREATED, Json(detail)))
}

/// PATCH /api/v1/titles/{id}
pub async fn update(
    State(state): State<AppState>,
    user: MaybeAuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateTitleRequest>,
) -> AppResult<Json<TitleDetail>> {
    guard(ADMIN_OR_READ_ONLY, &user, Action::Update, None)?;

    if let Some(name) = &input.name {
        validate_text("name", name)?;
    }
    input.validate()?;
    let year = input
        .year
        .map(|y| validate_year(y, state.clock.as_ref()))
        .transpose()?;
    let genre_ids = match &input.genre {
        Some(slugs) => Some(resolve_genres(&state.pool, slugs).await?),
        None => None,
    };
    let category_id = match &input.category {
        Some(Some(slug)) => Some(Some(resolve_category(&state.pool, slug).await?)),
        Some(None) => Some(None),
        None => None,
    };

    let update = UpdateTitle {
        name: input.name,
        year,
        description: input.description,
        category_id,
        genre_ids,
    };
    TitleRepo::update(&state.pool, id, &update)
        .await?
        .ok_or_else(|| CoreError::not_found("Title", id))?;

    Ok(Json(load_detail(&state.pool, id).await?))
}

/// DELETE /api/v1/titles/{id}
pub async fn delete(
    State(state): State<AppState>,
    user: MaybeAuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    guard(ADMIN_OR_READ_ONLY, &user, Action::Destroy, None)?;

    if TitleRepo::delete(&state.pool, id).await? {
        tracing::info!(title_id = id, "Title deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(CoreError::not_found("Title", id).into())
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn load_detail(pool: &DbPool, id: DbId) -> AppResult<TitleDetail> {
    TitleRepo::find_detail(pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("Title", id).into())
}

/// Map genre slugs to ids. Duplicates collapse; any unknown slug fails.
async fn resolve_genres(pool: &DbPool, slugs: &[String]) -> AppResult<Vec<DbId>> {
    let wanted: BTreeSet<&str> = slugs.iter().map(String::as_str).collect();
    if wanted.is_empty() {
        return Ok(Vec::new());
    }

    let unique: Vec<String> = wanted.iter().map(|s| s.to_string()).collect();
    let found = GenreRepo::find_by_slugs(pool, &unique).await?;

    if let Some(missing) = wanted
        .iter()
        .find(|slug| !found.iter().any(|g| g.slug == **slug))
    {
        return Err(
            ValidationError::invalid("genre", format!("Genre '{missing}' does not exist")).into(),
        );
    }
    Ok(found.into_iter().map(|g| g.id).collect())
}

async fn resolve_category(pool: &DbPool, slug: &str) -> AppResult<DbId> {
    CategoryRepo::find_by_slug(pool, slug)
        .await?
        .map(|c| c.id)
        .ok_or_else(|| {
            ValidationError::invalid("category", format!("Category '{slug}' does not exist"))
                .into()
        })
}
