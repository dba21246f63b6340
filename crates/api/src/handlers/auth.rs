//! Handlers for the `/auth` resource (signup, token, refresh, logout).

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use validator::Validate;
use yamdb_core::error::{CoreError, ValidationError};
use yamdb_core::validation::{validate_username, validate_username_format};
use yamdb_db::models::session::CreateSession;
use yamdb_db::models::user::{CreateUser, User, UserResponse};
use yamdb_db::repositories::{SessionRepo, UserRepo};

use crate::auth::jwt::{issue_access_token, RefreshToken};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

const CONFIRMATION_SUBJECT: &str = "Your YaMDb confirmation code";

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/signup`.
#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    pub username: String,
    #[validate(
        email(message = "Enter a valid email address"),
        length(max = 254, message = "Email must be at most 254 characters")
    )]
    pub email: String,
}

/// Echo of the accepted signup.
#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub username: String,
    pub email: String,
}

/// Request body for `POST /auth/token`.
#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub username: String,
    pub confirmation_code: String,
}

/// Request body for `POST /auth/token/refresh`.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Successful authentication response returned by token and refresh.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub user: UserResponse,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/signup
///
/// Register `(username, email)` or, for an existing identical pair, resend
/// the confirmation code. Always answers 200 with the submitted pair.
pub async fn signup(
    State(state): State<AppState>,
    Json(input): Json<SignupRequest>,
) -> AppResult<Json<SignupResponse>> {
    check_new_username(&input.username)?;
    input.validate()?;

    let user = match UserRepo::find_by_username(&state.pool, &input.username).await? {
        Some(existing) if existing.email == input.email => existing,
        Some(_) => return Err(ValidationError::AlreadyTaken { field: "username" }.into()),
        None => {
            if UserRepo::find_by_email(&state.pool, &input.email)
                .await?
                .is_some()
            {
                return Err(ValidationError::AlreadyTaken { field: "email" }.into());
            }
            let created = UserRepo::create(
                &state.pool,
                &CreateUser::signup(input.username.clone(), input.email.clone()),
            )
            .await?;
            tracing::info!(user_id = created.id, username = %created.username, "Account registered");
            created
        }
    };

    send_confirmation_code(&state, &user).await;

    Ok(Json(SignupResponse {
        username: user.username,
        email: user.email,
    }))
}

/// POST /api/v1/auth/token
///
/// Exchange a confirmation code for an access/refresh token pair. A
/// successful exchange stamps `last_login_at`, which retires the code.
pub async fn token(
    State(state): State<AppState>,
    Json(input): Json<TokenRequest>,
) -> AppResult<Json<AuthResponse>> {
    let user = UserRepo::find_by_username(&state.pool, &input.username)
        .await?
        .ok_or_else(|| CoreError::not_found("User", &input.username))?;

    let now = state.clock.now();
    if !state
        .codes
        .verify(&user.code_subject(), input.confirmation_code.trim(), now)
    {
        tracing::debug!(user_id = user.id, "Rejected confirmation code");
        return Err(ValidationError::InvalidConfirmationCode.into());
    }

    let user = UserRepo::record_login(&state.pool, user.id)
        .await?
        .ok_or_else(|| CoreError::not_found("User", &input.username))?;

    let response = create_auth_response(&state, user).await?;
    Ok(Json(response))
}

/// POST /api/v1/auth/token/refresh
///
/// Exchange a valid refresh token for new access + refresh tokens.
pub async fn refresh(
    State(state): State<AppState>,
    Json(input): Json<RefreshRequest>,
) -> AppResult<Json<AuthResponse>> {
    let user_id = SessionRepo::consume(&state.pool, &RefreshToken::digest(&input.refresh_token))
        .await?
        .ok_or_else(invalid_refresh_token)?;

    let user = UserRepo::find_by_id(&state.pool, user_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("User no longer exists".into())))?;

    let response = create_auth_response(&state, user).await?;
    Ok(Json(response))
}

/// POST /api/v1/auth/logout
///
/// Revoke all sessions for the authenticated user. Returns 204 No Content.
pub async fn logout(State(state): State<AppState>, auth_user: AuthUser) -> AppResult<StatusCode> {
    let revoked = SessionRepo::revoke_all_for_user(&state.pool, auth_user.user_id).await?;
    tracing::info!(user_id = auth_user.user_id, revoked, "Logged out");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Username rules shared by signup and account administration.
pub(crate) fn check_new_username(username: &str) -> Result<(), ValidationError> {
    validate_username(username)?;
    validate_username_format(username)?;
    Ok(())
}

fn invalid_refresh_token() -> AppError {
    AppError::Core(CoreError::Unauthorized(
        "Invalid or expired refresh token".into(),
    ))
}

/// Issue a fresh code and mail it. Delivery failures are logged, not retried.
async fn send_confirmation_code(state: &AppState, user: &User) {
    let code = state.codes.issue(&user.code_subject(), state.clock.now());
    let body = format!(
        "Hello, {}!\n\nYour confirmation code: {code}\n\n\
         Exchange it for a token at /api/v1/auth/token.",
        user.username
    );

    if let Err(e) = state
        .mailer
        .send(&user.email, CONFIRMATION_SUBJECT, &body)
        .await
    {
        tracing::error!(user_id = user.id, error = %e, "Failed to send confirmation code");
    }
}

/// Issue an access token and a refresh session for `user`.
async fn create_auth_response(state: &AppState, user: User) -> AppResult<AuthResponse> {
    let access = issue_access_token(&user.actor(), &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;
    let refresh = RefreshToken::generate(&state.config.jwt);

    SessionRepo::create(
        &state.pool,
        &CreateSession {
            user_id: user.id,
            refresh_token_hash: refresh.hash,
            expires_at: refresh.expires_at,
        },
    )
    .await?;

    Ok(AuthResponse {
        access_token: access.token,
        refresh_token: refresh.plaintext,
        expires_in: access.expires_in,
        user: user.into(),
    })
}
