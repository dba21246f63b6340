//! Role-based access control.
//!
//! Handlers name the [`Action`] they perform and call [`guard`] with the
//! policy set of their resource. [`RequireAdmin`] covers routes that are
//! admin-only for every verb.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::Method;
use yamdb_core::permissions::{authorize, Action, Authored, Policy, ADMIN_ONLY};

use yamdb_core::error::CoreError;

use super::auth::{AuthUser, MaybeAuthUser};
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Check `policies` for the caller against an optional target resource.
///
/// Returns 401 for anonymous callers and 403 for authenticated callers that
/// no policy admits.
pub fn guard(
    policies: &[Policy],
    user: &MaybeAuthUser,
    action: Action,
    resource: Option<&dyn Authored>,
) -> AppResult<()> {
    let actor = user.actor();
    authorize(policies, actor.as_ref(), action, resource)?;
    Ok(())
}

/// The action an HTTP verb stands for. `GET` is reported as `Retrieve`;
/// list and retrieve are both safe so no policy tells them apart.
pub fn method_action(method: &Method) -> Action {
    match *method {
        Method::POST => Action::Create,
        Method::PUT | Method::PATCH => Action::Update,
        Method::DELETE => Action::Destroy,
        _ => Action::Retrieve,
    }
}

/// Requires admin authority. Rejects anonymous callers with 401 and everyone
/// else with 403.
///
/// ```ignore
/// async fn admin_only(RequireAdmin(user): RequireAdmin) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = MaybeAuthUser::from_request_parts(parts, state).await?;
        guard(ADMIN_ONLY, &user, method_action(&parts.method), None)?;
        user.0.map(RequireAdmin).ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Authentication credentials were not provided".into(),
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use yamdb_core::permissions::{ADMIN_OR_READ_ONLY, AUTHOR_OR_READ_ONLY};
    use yamdb_core::roles::Role;

    struct Owned(i64);

    impl Authored for Owned {
        fn author_id(&self) -> i64 {
            self.0
        }
    }

    fn user(id: i64, role: Role) -> MaybeAuthUser {
        MaybeAuthUser(Some(AuthUser {
            user_id: id,
            role,
            is_superuser: false,
        }))
    }

    #[test]
    fn verbs_map_to_actions() {
        assert_eq!(method_action(&Method::GET), Action::Retrieve);
        assert_eq!(method_action(&Method::POST), Action::Create);
        assert_eq!(method_action(&Method::PATCH), Action::Update);
        assert_eq!(method_action(&Method::DELETE), Action::Destroy);
    }

    #[test]
    fn anonymous_reads_pass_and_writes_are_unauthorized() {
        let anon = MaybeAuthUser(None);
        assert!(guard(ADMIN_OR_READ_ONLY, &anon, Action::List, None).is_ok());
        assert_matches!(
            guard(ADMIN_OR_READ_ONLY, &anon, Action::Create, None),
            Err(AppError::Core(CoreError::Unauthorized(_)))
        );
    }

    #[test]
    fn non_author_write_is_permission_denied() {
        let review = Owned(1);
        assert_matches!(
            guard(AUTHOR_OR_READ_ONLY, &user(2, Role::User), Action::Update, Some(&review)),
            Err(AppError::Core(CoreError::PermissionDenied(_)))
        );
        assert!(
            guard(AUTHOR_OR_READ_ONLY, &user(3, Role::Moderator), Action::Destroy, Some(&review))
                .is_ok()
        );
    }
}
