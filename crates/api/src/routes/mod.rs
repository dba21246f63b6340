pub mod auth;
pub mod categories;
pub mod genres;
pub mod health;
pub mod titles;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/signup                                     register / resend code (public)
/// /auth/token                                      code -> token pair (public)
/// /auth/token/refresh                              rotate refresh token (public)
/// /auth/logout                                     revoke sessions (requires auth)
///
/// /users                                           list, create (admin only)
/// /users/me                                        get, update self (requires auth)
/// /users/{username}                                get, update, delete (admin only)
///
/// /categories                                      list, create
/// /categories/{slug}                               delete
/// /genres                                          list, create
/// /genres/{slug}                                   delete
///
/// /titles                                          list, create
/// /titles/{title_id}                               get, update, delete
/// /titles/{title_id}/reviews                       list, create
/// /titles/{title_id}/reviews/{review_id}           get, update, delete
/// /titles/{title_id}/reviews/{review_id}/comments       list, create
/// /titles/{title_id}/reviews/{review_id}/comments/{comment_id}  get, update, delete
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/users", users::router())
        .nest("/categories", categories::router())
        .nest("/genres", genres::router())
        .nest("/titles", titles::router())
}
