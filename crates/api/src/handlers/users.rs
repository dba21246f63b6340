//! Handlers for the `/users` resource (admin account management and `/users/me`).

use std::str::FromStr;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use validator::Validate;
use yamdb_core::error::{CoreError, ValidationError};
use yamdb_core::pagination::Page;
use yamdb_core::roles::Role;
use yamdb_core::types::DbId;
use yamdb_db::models::user::{CreateUser, UpdateUser, User, UserResponse};
use yamdb_db::repositories::UserRepo;
use yamdb_db::DbPool;

use super::auth::check_new_username;
use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::query::SearchParams;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `POST /users`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    pub username: String,
    #[validate(
        email(message = "Enter a valid email address"),
        length(max = 254, message = "Email must be at most 254 characters")
    )]
    pub email: String,
    #[validate(length(max = 150, message = "First name must be at most 150 characters"))]
    pub first_name: Option<String>,
    #[validate(length(max = 150, message = "Last name must be at most 150 characters"))]
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub role: Option<String>,
}

/// Request body for `PATCH /users/{username}` and `PATCH /users/me`.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    #[validate(
        email(message = "Enter a valid email address"),
        length(max = 254, message = "Email must be at most 254 characters")
    )]
    pub email: Option<String>,
    #[validate(length(max = 150, message = "First name must be at most 150 characters"))]
    pub first_name: Option<String>,
    #[validate(length(max = 150, message = "Last name must be at most 150 characters"))]
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub role: Option<String>,
}

impl UpdateUserRequest {
    /// Validate and convert. `allow_role = false` drops any `role` field,
    /// which is how `/users/me` keeps role read-only.
    fn into_update(self, allow_role: bool) -> AppResult<UpdateUser> {
        if let Some(username) = &self.username {
            check_new_username(username)?;
        }
        self.validate()?;
        let role = match self.role.filter(|_| allow_role) {
            Some(role) => Some(Role::from_str(&role)?),
            None => None,
        };
        Ok(UpdateUser {
            username: self.username,
            email: self.email,
            first_name: self.first_name,
            last_name: self.last_name,
            bio: self.bio,
            role,
        })
    }
}

// ---------------------------------------------------------------------------
// Admin handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/users
pub async fn list(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(params): Query<SearchParams>,
) -> AppResult<Json<Page<UserResponse>>> {
    let users = UserRepo::list(&state.pool, params.term(), params.page()).await?;
    let count = UserRepo::count(&state.pool, params.term()).await?;
    Ok(Json(Page {
        count,
        results: users.into_iter().map(UserResponse::from).collect(),
    }))
}

/// POST /api/v1/users
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(input): Json<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    check_new_username(&input.username)?;
    input.validate()?;
    let role = match input.role.as_deref() {
        Some(role) => Role::from_str(role)?,
        None => Role::default(),
    };
    ensure_available(&state.pool, Some(&input.username), Some(&input.email), None).await?;

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            username: input.username,
            email: input.email,
            first_name: input.first_name,
            last_name: input.last_name,
            bio: input.bio,
            role,
            is_superuser: false,
        },
    )
    .await?;
    tracing::info!(user_id = user.id, role = %user.role, admin_id = admin.user_id, "Account created by admin");
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// GET /api/v1/users/{username}
pub async fn get_by_username(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(username): Path<String>,
) -> AppResult<Json<UserResponse>> {
    let user = find_by_username(&state.pool, &username).await?;
    Ok(Json(user.into()))
}

/// PATCH /api/v1/users/{username}
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(username): Path<String>,
    Json(input): Json<UpdateUserRequest>,
) -> AppResult<Json<UserResponse>> {
    let user = find_by_username(&state.pool, &username).await?;
    let update = input.into_update(true)?;
    apply_update(&state.pool, &user, &update).await
}

/// DELETE /api/v1/users/{username}
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(username): Path<String>,
) -> AppResult<StatusCode> {
    let user = find_by_username(&state.pool, &username).await?;
    UserRepo::delete(&state.pool, user.id).await?;
    tracing::info!(user_id = user.id, admin_id = admin.user_id, "Account deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Self-service handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/users/me
pub async fn get_me(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<UserResponse>> {
    let user = find_by_id(&state.pool, auth_user.user_id).await?;
    Ok(Json(user.into()))
}

/// PATCH /api/v1/users/me
///
/// `role` is read-only here and ignored if present.
pub async fn update_me(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(input): Json<UpdateUserRequest>,
) -> AppResult<Json<UserResponse>> {
    let user = find_by_id(&state.pool, auth_user.user_id).await?;
    let update = input.into_update(false)?;
    apply_update(&state.pool, &user, &update).await
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn find_by_username(pool: &DbPool, username: &str) -> AppResult<User> {
    UserRepo::find_by_username(pool, username)
        .await?
        .ok_or_else(|| CoreError::not_found("User", username).into())
}

async fn find_by_id(pool: &DbPool, id: DbId) -> AppResult<User> {
    UserRepo::find_by_id(pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("User", id).into())
}

async fn apply_update(pool: &DbPool, user: &User, update: &UpdateUser) -> AppResult<Json<UserResponse>> {
    ensure_available(
        pool,
        update.username.as_deref(),
        update.email.as_deref(),
        Some(user.id),
    )
    .await?;
    let updated = UserRepo::update(pool, user.id, update)
        .await?
        .ok_or_else(|| CoreError::not_found("User", user.id))?;
    Ok(Json(updated.into()))
}

/// Reject a username or email held by an account other than `owner`.
async fn ensure_available(
    pool: &DbPool,
    username: Option<&str>,
    email: Option<&str>,
    owner: Option<DbId>,
) -> AppResult<()> {
    let taken_by_other = |found: Option<User>| found.is_some_and(|u| Some(u.id) != owner);

    if let Some(username) = username {
        if taken_by_other(UserRepo::find_by_username(pool, username).await?) {
            return Err(ValidationError::AlreadyTaken { field: "username" }.into());
        }
    }
    if let Some(email) = email {
        if taken_by_other(UserRepo::find_by_email(pool, email).await?) {
            return Err(ValidationError::AlreadyTaken { field: "email" }.into());
        }
    }
    Ok(())
}
