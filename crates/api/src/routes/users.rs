//! Route definitions for the `/users` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::users;
use crate::state::AppState;

/// Routes mounted at `/users`.
///
/// `/me` is a static segment and wins over `/{username}`; "me" is also a
/// reserved username.
///
/// ```text
/// GET    /             -> list (admin)
/// POST   /             -> create (admin)
/// GET    /me           -> get_me
/// PATCH  /me           -> update_me
/// GET    /{username}   -> get_by_username (admin)
/// PATCH  /{username}   -> update (admin)
/// DELETE /{username}   -> delete (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(users::list).post(users::create))
        .route("/me", get(users::get_me).patch(users::update_me))
        .route(
            "/{username}",
            get(users::get_by_username)
                .patch(users::update)
                .delete(users::delete),
        )
}
