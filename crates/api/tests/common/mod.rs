//! Shared helpers for API integration tests.
//!
//! Each test binary uses a different subset of these.
#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::PgPool;
use tower::ServiceExt;

use yamdb_api::auth::jwt::{issue_access_token, JwtConfig};
use yamdb_api::config::{ConfirmationConfig, ServerConfig};
use yamdb_api::router::build_app_router;
use yamdb_api::state::AppState;
use yamdb_core::clock::FixedClock;
use yamdb_core::roles::Role;
use yamdb_db::models::user::{CreateUser, User};
use yamdb_db::repositories::UserRepo;
use yamdb_mail::MemoryMailer;

/// Year the test clock is pinned to.
pub const TEST_YEAR: i32 = 2024;

pub fn test_jwt_config() -> JwtConfig {
    JwtConfig {
        secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
        access_token_expiry_mins: 15,
        refresh_token_expiry_days: 7,
    }
}

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        jwt: test_jwt_config(),
        confirmation: ConfirmationConfig {
            secret: "test-confirmation-secret".to_string(),
            ttl_days: 3,
        },
    }
}

/// Build the full application router over `pool`, returning the mailer so
/// tests can read confirmation codes.
pub fn build_test_app_with_mailer(pool: PgPool) -> (Router, MemoryMailer) {
    let mailer = MemoryMailer::new();
    let state = AppState::new(
        pool,
        test_config(),
        Arc::new(FixedClock::at_year(TEST_YEAR)),
        Arc::new(mailer.clone()),
    );
    (build_app_router(state), mailer)
}

/// Build the full application router with all middleware layers.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with_mailer(pool).0
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

pub async fn send(
    app: Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
    token: Option<&str>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap();

    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, Some(token)).await
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    send(app, Method::POST, uri, Some(body), None).await
}

pub async fn post_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response<Body> {
    send(app, Method::POST, uri, Some(body), Some(token)).await
}

pub async fn patch_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response<Body> {
    send(app, Method::PATCH, uri, Some(body), Some(token)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, None, Some(token)).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Assert a field-scoped 400 and return its body.
pub async fn assert_validation_error(response: Response<Body>, code: &str, field: &str) -> Value {
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], code, "unexpected body: {json}");
    assert_eq!(json["field"], field, "unexpected body: {json}");
    json
}

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

/// Insert an account directly in the database.
pub async fn create_user(pool: &PgPool, username: &str, role: Role) -> User {
    let input = CreateUser {
        role,
        ..CreateUser::signup(username, format!("{username}@example.com"))
    };
    UserRepo::create(pool, &input)
        .await
        .expect("user creation should succeed")
}

/// Insert a superuser whose role is plain `user`.
pub async fn create_superuser(pool: &PgPool, username: &str) -> User {
    let input = CreateUser {
        is_superuser: true,
        ..CreateUser::signup(username, format!("{username}@example.com"))
    };
    UserRepo::create(pool, &input)
        .await
        .expect("user creation should succeed")
}

/// Access token for `user` signed with the test secret.
pub fn token_for(user: &User) -> String {
    issue_access_token(&user.actor(), &test_jwt_config())
        .expect("token generation")
        .token
}

/// Create a user of the given role and return it with an access token.
pub async fn user_with_token(pool: &PgPool, username: &str, role: Role) -> (User, String) {
    let user = create_user(pool, username, role).await;
    let token = token_for(&user);
    (user, token)
}
