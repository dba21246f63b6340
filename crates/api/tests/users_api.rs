//! HTTP-level integration tests for `/users` account management.

mod common;

use axum::http::StatusCode;
use common::{
    assert_validation_error, body_json, delete_auth, get, get_auth, patch_json_auth,
    post_json_auth, user_with_token,
};
use serde_json::json;
use sqlx::PgPool;
use yamdb_core::roles::Role;
use yamdb_db::repositories::UserRepo;

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_user_management_requires_admin(pool: PgPool) {
    let (_, user) = user_with_token(&pool, "plain", Role::User).await;
    let (_, moderator) = user_with_token(&pool, "mod", Role::Moderator).await;
    let app = common::build_test_app(pool);

    assert_eq!(get(app.clone(), "/api/v1/users").await.status(), StatusCode::UNAUTHORIZED);
    for token in [&user, &moderator] {
        let response = get_auth(app.clone(), "/api/v1/users", token).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let response = get_auth(app.clone(), "/api/v1/users/plain", token).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_admin_lists_and_searches(pool: PgPool) {
    let (_, admin) = user_with_token(&pool, "admin", Role::Admin).await;
    common::create_user(&pool, "alice", Role::User).await;
    common::create_user(&pool, "bob", Role::Moderator).await;
    let superuser = common::token_for(&common::create_superuser(&pool, "root").await);
    let app = common::build_test_app(pool);

    let json = body_json(get_auth(app.clone(), "/api/v1/users", &admin).await).await;
    assert_eq!(json["count"], 4);
    assert_eq!(json["results"][0]["username"], "root");
    assert!(json["results"][0].get("id").is_none());

    let json = body_json(get_auth(app.clone(), "/api/v1/users?search=ALI", &admin).await).await;
    assert_eq!(json["count"], 1);
    assert_eq!(json["results"][0]["username"], "alice");

    let json = body_json(get_auth(app.clone(), "/api/v1/users?limit=2", &superuser).await).await;
    assert_eq!(json["count"], 4);
    assert_eq!(json["results"].as_array().unwrap().len(), 2);

    let json = body_json(get_auth(app, "/api/v1/users/bob", &admin).await).await;
    assert_eq!(json["role"], "moderator");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_admin_creates_account(pool: PgPool) {
    let (_, admin) = user_with_token(&pool, "admin", Role::Admin).await;
    let app = common::build_test_app(pool.clone());

    let response = post_json_auth(
        app.clone(),
        "/api/v1/users",
        json!({ "username": "newbie", "email": "newbie@example.com", "bio": "hi" }),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["role"], "user");
    assert_eq!(json["bio"], "hi");

    let response = post_json_auth(
        app.clone(),
        "/api/v1/users",
        json!({ "username": "newbie", "email": "other@example.com" }),
        &admin,
    )
    .await;
    assert_validation_error(response, "ALREADY_TAKEN", "username").await;

    let response = post_json_auth(
        app.clone(),
        "/api/v1/users",
        json!({ "username": "me", "email": "me@example.com" }),
        &admin,
    )
    .await;
    assert_validation_error(response, "RESERVED_USERNAME", "username").await;

    let response = post_json_auth(
        app,
        "/api/v1/users",
        json!({ "username": "x", "email": "x@example.com", "role": "overlord" }),
        &admin,
    )
    .await;
    assert_validation_error(response, "VALIDATION_ERROR", "role").await;

    assert!(UserRepo::find_by_username(&pool, "x").await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_admin_changes_role(pool: PgPool) {
    let (_, admin) = user_with_token(&pool, "admin", Role::Admin).await;
    common::create_user(&pool, "alice", Role::User).await;
    let app = common::build_test_app(pool.clone());

    let response = patch_json_auth(
        app.clone(),
        "/api/v1/users/alice",
        json!({ "role": "moderator", "first_name": "Alice" }),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["role"], "moderator");
    assert_eq!(json["first_name"], "Alice");

    let stored = UserRepo::find_by_username(&pool, "alice").await.unwrap().unwrap();
    assert_eq!(stored.role, Role::Moderator);

    let response = patch_json_auth(app, "/api/v1/users/ghost", json!({ "bio": "?" }), &admin).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_me_cannot_change_own_role(pool: PgPool) {
    let (_, token) = user_with_token(&pool, "alice", Role::User).await;
    let app = common::build_test_app(pool);

    let response = patch_json_auth(
        app.clone(),
        "/api/v1/users/me",
        json!({ "role": "admin", "bio": "Film buff" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["role"], "user");
    assert_eq!(json["bio"], "Film buff");

    let response = patch_json_auth(
        app,
        "/api/v1/users/me",
        json!({ "email": "not-an-email" }),
        &token,
    )
    .await;
    assert_validation_error(response, "VALIDATION_ERROR", "email").await;
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_me_rename_conflict(pool: PgPool) {
    let (_, token) = user_with_token(&pool, "alice", Role::User).await;
    common::create_user(&pool, "bob", Role::User).await;
    let app = common::build_test_app(pool);

    let response = patch_json_auth(
        app.clone(),
        "/api/v1/users/me",
        json!({ "username": "bob" }),
        &token,
    )
    .await;
    assert_validation_error(response, "ALREADY_TAKEN", "username").await;

    // Keeping one's own username is not a conflict.
    let response =
        patch_json_auth(app, "/api/v1/users/me", json!({ "username": "alice" }), &token).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_admin_deletes_account(pool: PgPool) {
    let (_, admin) = user_with_token(&pool, "admin", Role::Admin).await;
    common::create_user(&pool, "alice", Role::User).await;
    let app = common::build_test_app(pool.clone());

    let response = delete_auth(app.clone(), "/api/v1/users/alice", &admin).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(UserRepo::find_by_username(&pool, "alice").await.unwrap().is_none());

    let response = delete_auth(app, "/api/v1/users/alice", &admin).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
