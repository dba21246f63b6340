//! Superuser bootstrap against a real database.

use assert_matches::assert_matches;
use sqlx::PgPool;
use yamdb_core::error::ValidationError;
use yamdb_core::roles::Role;
use yamdb_db::models::user::CreateUser;
use yamdb_db::repositories::UserRepo;
use yamdb_loader::{create_superuser, LoadError};

async fn user_count(pool: &PgPool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await
        .unwrap()
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_superuser_forces_admin_role(pool: PgPool) {
    let user = create_superuser(&pool, "root", " root@yamdb.fake ").await.unwrap();

    assert_eq!(user.role, Role::Admin);
    assert!(user.is_superuser);
    assert_eq!(user.email, "root@yamdb.fake");

    let stored = UserRepo::find_by_username(&pool, "root").await.unwrap().unwrap();
    assert_eq!(stored.id, user.id);
    assert!(stored.is_superuser);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_superuser_rejects_taken_accounts(pool: PgPool) {
    UserRepo::create(&pool, &CreateUser::signup("root", "root@yamdb.fake"))
        .await
        .unwrap();

    assert_matches!(
        create_superuser(&pool, "root", "other@yamdb.fake").await,
        Err(LoadError::AccountTaken { field: "username" })
    );
    assert_matches!(
        create_superuser(&pool, "admin", "root@yamdb.fake").await,
        Err(LoadError::AccountTaken { field: "email" })
    );
    assert_eq!(user_count(&pool).await, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_superuser_validates_input(pool: PgPool) {
    assert_matches!(
        create_superuser(&pool, "me", "me@yamdb.fake").await,
        Err(LoadError::Validation(ValidationError::ReservedUsername))
    );
    assert_matches!(
        create_superuser(&pool, "bad name", "bad@yamdb.fake").await,
        Err(LoadError::Validation(ValidationError::Invalid { .. }))
    );
    assert_matches!(
        create_superuser(&pool, "root", "nobody").await,
        Err(LoadError::InvalidAccount { field: "email", .. })
    );
    assert_eq!(user_count(&pool).await, 0);
}
