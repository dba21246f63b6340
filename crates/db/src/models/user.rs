//! Account model and DTOs.

use serde::Serialize;
use sqlx::FromRow;
use yamdb_core::confirmation::CodeSubject;
use yamdb_core::roles::{Actor, Role};
use yamdb_core::types::{DbId, Timestamp};

/// Full row from the `users` table.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub username: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    #[sqlx(try_from = "String")]
    pub role: Role,
    pub is_superuser: bool,
    pub last_login_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl User {
    pub fn actor(&self) -> Actor {
        Actor {
            user_id: self.id,
            role: self.role,
            is_superuser: self.is_superuser,
        }
    }

    /// The state a confirmation code for this account is signed over.
    pub fn code_subject(&self) -> CodeSubject<'_> {
        CodeSubject {
            user_id: self.id,
            email: &self.email,
            last_login_at: self.last_login_at,
        }
    }
}

/// Public account representation.
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub username: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub role: Role,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            bio: user.bio,
            role: user.role,
        }
    }
}

/// DTO for creating a new account.
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub username: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub role: Role,
    pub is_superuser: bool,
}

impl CreateUser {
    /// Self-registration: a plain user with no profile fields.
    pub fn signup(username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            first_name: None,
            last_name: None,
            bio: None,
            role: Role::User,
            is_superuser: false,
        }
    }
}

/// DTO for updating an account. Only `Some` fields are applied.
#[derive(Debug, Clone, Default)]
pub struct UpdateUser {
    pub username: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub role: Option<Role>,
}
