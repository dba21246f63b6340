//! Bearer-token extractors: [`AuthUser`] for endpoints that need a caller,
//! [`MaybeAuthUser`] for endpoints that also serve anonymous readers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use yamdb_core::error::CoreError;
use yamdb_core::roles::{Actor, Role};
use yamdb_core::types::DbId;

use crate::auth::jwt::decode_access_token;
use crate::error::AppError;
use crate::state::AppState;

/// Caller identity taken from the access token. The role is the one the
/// token was issued with.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: DbId,
    pub role: Role,
    pub is_superuser: bool,
}

impl AuthUser {
    pub fn actor(&self) -> Actor {
        Actor {
            user_id: self.user_id,
            role: self.role,
            is_superuser: self.is_superuser,
        }
    }
}

impl From<Actor> for AuthUser {
    fn from(actor: Actor) -> Self {
        Self {
            user_id: actor.user_id,
            role: actor.role,
            is_superuser: actor.is_superuser,
        }
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        MaybeAuthUser::from_request_parts(parts, state)
            .await?
            .0
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(
                    "Missing Authorization header".into(),
                ))
            })
    }
}

/// Optional authentication for endpoints that also serve anonymous readers.
///
/// A missing `Authorization` header yields `MaybeAuthUser(None)`; a header
/// that is present but malformed or carries an invalid token is still
/// rejected with 401.
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<AuthUser>);

impl MaybeAuthUser {
    pub fn actor(&self) -> Option<Actor> {
        self.0.as_ref().map(AuthUser::actor)
    }

    /// The authenticated user, or 401 for anonymous callers.
    pub fn require(&self) -> Result<&AuthUser, AppError> {
        self.0.as_ref().ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Authentication credentials were not provided".into(),
            ))
        })
    }
}

impl FromRequestParts<AppState> for MaybeAuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(auth_header) = parts.headers.get("authorization") else {
            return Ok(MaybeAuthUser(None));
        };

        let token = auth_header
            .to_str()
            .ok()
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(
                    "Invalid Authorization format. Expected: Bearer <token>".into(),
                ))
            })?;

        let claims = decode_access_token(token, &state.config.jwt).map_err(|_| {
            AppError::Core(CoreError::Unauthorized("Invalid or expired token".into()))
        })?;

        Ok(MaybeAuthUser(Some(AuthUser::from(claims.actor()))))
    }
}
