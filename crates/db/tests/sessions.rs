//! Refresh-session lifecycle against the real schema.

use chrono::{Duration, Utc};
use sqlx::PgPool;
use yamdb_db::models::session::CreateSession;
use yamdb_db::models::user::CreateUser;
use yamdb_db::repositories::{SessionRepo, UserRepo};

async fn session(pool: &PgPool, user_id: i64, hash: &str, ttl: Duration) {
    SessionRepo::create(
        pool,
        &CreateSession {
            user_id,
            refresh_token_hash: hash.to_string(),
            expires_at: Utc::now() + ttl,
        },
    )
    .await
    .unwrap();
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_consume_is_single_use(pool: PgPool) {
    let user = UserRepo::create(&pool, &CreateUser::signup("alice", "a@example.com"))
        .await
        .unwrap();
    session(&pool, user.id, "live", Duration::days(1)).await;
    session(&pool, user.id, "stale", -Duration::days(1)).await;

    assert_eq!(SessionRepo::consume(&pool, "live").await.unwrap(), Some(user.id));
    assert_eq!(SessionRepo::consume(&pool, "live").await.unwrap(), None);
    assert_eq!(SessionRepo::consume(&pool, "stale").await.unwrap(), None);
    assert_eq!(SessionRepo::consume(&pool, "unknown").await.unwrap(), None);

    assert_eq!(SessionRepo::cleanup_expired(&pool).await.unwrap(), 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_revoke_all_for_user(pool: PgPool) {
    let user = UserRepo::create(&pool, &CreateUser::signup("bob", "b@example.com"))
        .await
        .unwrap();
    session(&pool, user.id, "one", Duration::days(1)).await;
    session(&pool, user.id, "two", Duration::days(1)).await;

    assert_eq!(SessionRepo::revoke_all_for_user(&pool, user.id).await.unwrap(), 2);
    assert_eq!(SessionRepo::consume(&pool, "one").await.unwrap(), None);
}
