//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`] -- Extracts the authenticated user from a JWT Bearer token.
//! - [`auth::MaybeAuthUser`] -- Same, but admits anonymous callers.
//! - [`rbac::RequireAdmin`] -- Requires admin authority (admin role or superuser).
//! - [`rbac::guard`] -- Evaluates a policy set for a handler's action.

pub mod auth;
pub mod rbac;
