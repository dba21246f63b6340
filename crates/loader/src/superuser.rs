//! Bootstrap account creation for a fresh deployment.

use yamdb_core::roles::Role;
use yamdb_core::validation::{validate_username, validate_username_format};
use yamdb_db::models::user::{CreateUser, User};
use yamdb_db::repositories::UserRepo;
use yamdb_db::DbPool;

use crate::error::LoadError;

/// Create a superuser. The role is always `admin`.
///
/// Fails without writing when the username or email is invalid or already
/// in use.
pub async fn create_superuser(pool: &DbPool, username: &str, email: &str) -> Result<User, LoadError> {
    validate_username(username)?;
    validate_username_format(username)?;

    let email = email.trim();
    if !email.contains('@') {
        return Err(LoadError::InvalidAccount {
            field: "email",
            reason: format!("'{email}' is not an email address"),
        });
    }

    if UserRepo::find_by_username(pool, username).await?.is_some() {
        return Err(LoadError::AccountTaken { field: "username" });
    }
    if UserRepo::find_by_email(pool, email).await?.is_some() {
        return Err(LoadError::AccountTaken { field: "email" });
    }

    let input = CreateUser {
        role: Role::Admin,
        is_superuser: true,
        ..CreateUser::signup(username, email)
    };
    let user = UserRepo::create(pool, &input).await?;
    tracing::info!(user_id = user.id, username = %user.username, "Superuser created");
    Ok(user)
}
