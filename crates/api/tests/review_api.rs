//! HTTP-level integration tests for reviews and comments.
//!
//! Covers the one-review-per-title rule, score validation, the title
//! rating aggregate and author-or-moderator write access.

mod common;

use axum::http::StatusCode;
use common::{
    assert_validation_error, body_json, delete_auth, get, patch_json_auth, post_json,
    post_json_auth, user_with_token,
};
use serde_json::json;
use sqlx::PgPool;
use yamdb_core::roles::Role;
use yamdb_core::types::DbId;
use yamdb_db::models::title::CreateTitle;
use yamdb_db::repositories::{TitleRepo, UserRepo};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn seed_title(pool: &PgPool, name: &str) -> DbId {
    TitleRepo::create(
        pool,
        &CreateTitle {
            name: name.to_string(),
            year: 1999,
            description: None,
            category_id: None,
            genre_ids: Vec::new(),
        },
    )
    .await
    .unwrap()
    .id
}

async fn post_review(
    app: axum::Router,
    title_id: DbId,
    token: &str,
    score: serde_json::Value,
) -> axum::response::Response {
    post_json_auth(
        app,
        &format!("/api/v1/titles/{title_id}/reviews"),
        json!({ "text": "Worth a watch", "score": score }),
        token,
    )
    .await
}

async fn create_review(app: axum::Router, title_id: DbId, token: &str, score: i64) -> DbId {
    let response = post_review(app, title_id, token, json!(score)).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["id"].as_i64().unwrap()
}

// ---------------------------------------------------------------------------
// Reviews
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_review_reports_author_and_score(pool: PgPool) {
    let title_id = seed_title(&pool, "Heat").await;
    let (_, token) = user_with_token(&pool, "critic", Role::User).await;
    let app = common::build_test_app(pool);

    let response = post_review(app.clone(), title_id, &token, json!(8)).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["author"], "critic");
    assert_eq!(json["score"], 8);
    assert_eq!(json["text"], "Worth a watch");
    assert!(json["pub_date"].is_string());

    let json = body_json(get(app, &format!("/api/v1/titles/{title_id}/reviews")).await).await;
    assert_eq!(json["count"], 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_score_must_be_integer_in_range(pool: PgPool) {
    let title_id = seed_title(&pool, "Heat").await;
    let (_, token) = user_with_token(&pool, "critic", Role::User).await;
    let app = common::build_test_app(pool);

    for score in [json!(11), json!(-1), json!(7.5), json!("7"), json!(null)] {
        let response = post_review(app.clone(), title_id, &token, score.clone()).await;
        assert_validation_error(response, "SCORE_OUT_OF_RANGE", "score").await;
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_boundary_scores_are_accepted(pool: PgPool) {
    let low = seed_title(&pool, "Low").await;
    let high = seed_title(&pool, "High").await;
    let (_, token) = user_with_token(&pool, "critic", Role::User).await;
    let app = common::build_test_app(pool);

    create_review(app.clone(), low, &token, 0).await;
    create_review(app, high, &token, 10).await;
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_second_review_on_same_title_is_rejected(pool: PgPool) {
    let title_id = seed_title(&pool, "Heat").await;
    let other_title = seed_title(&pool, "Ronin").await;
    let (_, token) = user_with_token(&pool, "critic", Role::User).await;
    let app = common::build_test_app(pool);

    create_review(app.clone(), title_id, &token, 7).await;
    let response = post_review(app.clone(), title_id, &token, json!(9)).await;
    assert_validation_error(response, "DUPLICATE_REVIEW", "detail").await;

    create_review(app, other_title, &token, 9).await;
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_rating_is_rounded_average(pool: PgPool) {
    let title_id = seed_title(&pool, "Heat").await;
    let (_, first) = user_with_token(&pool, "first", Role::User).await;
    let (_, second) = user_with_token(&pool, "second", Role::User).await;
    let app = common::build_test_app(pool);

    create_review(app.clone(), title_id, &first, 7).await;
    create_review(app.clone(), title_id, &second, 10).await;

    let json = body_json(get(app, &format!("/api/v1/titles/{title_id}")).await).await;
    assert_eq!(json["rating"], 9);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_review_write_permissions(pool: PgPool) {
    let title_id = seed_title(&pool, "Heat").await;
    let (_, author) = user_with_token(&pool, "author", Role::User).await;
    let (_, stranger) = user_with_token(&pool, "stranger", Role::User).await;
    let (_, moderator) = user_with_token(&pool, "mod", Role::Moderator).await;
    let app = common::build_test_app(pool);

    let id = create_review(app.clone(), title_id, &author, 5).await;
    let uri = format!("/api/v1/titles/{title_id}/reviews/{id}");

    let response = patch_json_auth(app.clone(), &uri, json!({ "score": 1 }), &stranger).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = patch_json_auth(app.clone(), &uri, json!({ "score": 6 }), &author).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["score"], 6);
    assert_eq!(json["text"], "Worth a watch");

    let response = patch_json_auth(app.clone(), &uri, json!({ "score": 42 }), &author).await;
    assert_validation_error(response, "SCORE_OUT_OF_RANGE", "score").await;

    let response = delete_auth(app.clone(), &uri, &stranger).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = delete_auth(app.clone(), &uri, &moderator).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(get(app, &uri).await.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_anonymous_writes_are_unauthorized(pool: PgPool) {
    let title_id = seed_title(&pool, "Heat").await;
    let app = common::build_test_app(pool);

    let response = post_json(
        app.clone(),
        &format!("/api/v1/titles/{title_id}/reviews"),
        json!({ "text": "hi", "score": 5 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Missing review, but anonymous callers hear 401 first.
    let response = common::send(
        app,
        axum::http::Method::DELETE,
        &format!("/api/v1/titles/{title_id}/reviews/999"),
        None,
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_reviews_of_missing_title(pool: PgPool) {
    let (_, token) = user_with_token(&pool, "critic", Role::User).await;
    let app = common::build_test_app(pool);

    assert_eq!(
        get(app.clone(), "/api/v1/titles/999/reviews").await.status(),
        StatusCode::NOT_FOUND
    );
    let response = post_review(app, 999, &token, json!(5)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_review_is_scoped_to_its_title(pool: PgPool) {
    let heat = seed_title(&pool, "Heat").await;
    let ronin = seed_title(&pool, "Ronin").await;
    let (_, token) = user_with_token(&pool, "critic", Role::User).await;
    let app = common::build_test_app(pool);

    let id = create_review(app.clone(), heat, &token, 5).await;
    let response = get(app, &format!("/api/v1/titles/{ronin}/reviews/{id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Comments
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_comment_lifecycle(pool: PgPool) {
    let title_id = seed_title(&pool, "Heat").await;
    let (_, critic) = user_with_token(&pool, "critic", Role::User).await;
    let (_, reader) = user_with_token(&pool, "reader", Role::User).await;
    let (_, admin) = user_with_token(&pool, "boss", Role::Admin).await;
    let app = common::build_test_app(pool);

    let review_id = create_review(app.clone(), title_id, &critic, 8).await;
    let base = format!("/api/v1/titles/{title_id}/reviews/{review_id}/comments");

    let response = post_json_auth(app.clone(), &base, json!({ "text": "Agreed" }), &reader).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["author"], "reader");
    let uri = format!("{base}/{}", json["id"]);

    let response = post_json_auth(app.clone(), &base, json!({ "text": "" }), &reader).await;
    assert_validation_error(response, "VALIDATION_ERROR", "text").await;

    let json = body_json(get(app.clone(), &base).await).await;
    assert_eq!(json["count"], 1);
    assert_eq!(json["results"][0]["text"], "Agreed");

    let response = patch_json_auth(app.clone(), &uri, json!({ "text": "Nope" }), &critic).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = patch_json_auth(app.clone(), &uri, json!({ "text": "Edited" }), &reader).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["text"], "Edited");

    let response = delete_auth(app.clone(), &uri, &admin).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(get(app, &uri).await.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_comments_follow_review_deletion(pool: PgPool) {
    let title_id = seed_title(&pool, "Heat").await;
    let (_, critic) = user_with_token(&pool, "critic", Role::User).await;
    let app = common::build_test_app(pool);

    let review_id = create_review(app.clone(), title_id, &critic, 8).await;
    let review_uri = format!("/api/v1/titles/{title_id}/reviews/{review_id}");
    let base = format!("{review_uri}/comments");
    post_json_auth(app.clone(), &base, json!({ "text": "Self-reply" }), &critic).await;

    delete_auth(app.clone(), &review_uri, &critic).await;
    assert_eq!(get(app, &base).await.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_token_of_deleted_account_cannot_write(pool: PgPool) {
    let title_id = seed_title(&pool, "Heat").await;
    let (_, critic) = user_with_token(&pool, "critic", Role::User).await;
    let (ghost, ghost_token) = user_with_token(&pool, "ghost", Role::User).await;
    let app = common::build_test_app(pool.clone());

    let review_id = create_review(app.clone(), title_id, &critic, 8).await;
    assert!(UserRepo::delete(&pool, ghost.id).await.unwrap());

    let response = post_review(app.clone(), title_id, &ghost_token, json!(5)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"], "User no longer exists");

    let base = format!("/api/v1/titles/{title_id}/reviews/{review_id}/comments");
    let response = post_json_auth(app.clone(), &base, json!({ "text": "Boo" }), &ghost_token).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let json = body_json(get(app, &format!("/api/v1/titles/{title_id}/reviews")).await).await;
    assert_eq!(json["count"], 1);
}
