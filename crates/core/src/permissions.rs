//! Access-control policies for writes to shared resources.
//!
//! A route declares a list of [`Policy`] values that are combined with
//! logical OR. [`authorize`] evaluates them for an optional [`Actor`]
//! (anonymous when `None`), the [`Action`] resolved from the HTTP verb, and
//! for object-level actions the resource being touched.

use std::fmt;

use crate::error::CoreError;
use crate::roles::Actor;
use crate::types::DbId;

/// Operation requested by the routing layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    List,
    Retrieve,
    Create,
    Update,
    Destroy,
}

impl Action {
    /// Safe actions never mutate state.
    pub const fn is_safe(self) -> bool {
        matches!(self, Action::List | Action::Retrieve)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Action::List => "list",
            Action::Retrieve => "retrieve",
            Action::Create => "create",
            Action::Update => "update",
            Action::Destroy => "destroy",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resource with an owning account (reviews, comments).
pub trait Authored {
    fn author_id(&self) -> DbId;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    /// Any action, but only for superusers and admins.
    AdminOnly,
    /// Anyone may read; authenticated users may create; only the author,
    /// moderators and admins may change an existing resource.
    AuthorOrModerator,
    /// Safe actions only.
    ReadOnly,
}

/// Catalogue resources: categories, genres, titles.
pub const ADMIN_OR_READ_ONLY: &[Policy] = &[Policy::AdminOnly, Policy::ReadOnly];

/// User content: reviews, comments.
pub const AUTHOR_OR_READ_ONLY: &[Policy] = &[Policy::AuthorOrModerator, Policy::ReadOnly];

/// Account administration.
pub const ADMIN_ONLY: &[Policy] = &[Policy::AdminOnly];

impl Policy {
    pub fn permits(
        self,
        actor: Option<&Actor>,
        action: Action,
        resource: Option<&dyn Authored>,
    ) -> bool {
        match self {
            Policy::AdminOnly => actor.is_some_and(Actor::has_admin_authority),
            Policy::AuthorOrModerator => {
                if action.is_safe() {
                    return true;
                }
                let Some(actor) = actor else {
                    return false;
                };
                match resource {
                    None => true,
                    Some(resource) => {
                        resource.author_id() == actor.user_id
                            || actor.has_admin_authority()
                            || actor.is_moderator()
                    }
                }
            }
            Policy::ReadOnly => action.is_safe(),
        }
    }

    /// Human-readable reason reported when this policy is the one that
    /// governed a denial.
    pub fn denial_message(self) -> &'static str {
        match self {
            Policy::AdminOnly => "Only an administrator can make changes",
            Policy::AuthorOrModerator => {
                "Only the author, a moderator or an administrator can make changes"
            }
            Policy::ReadOnly => "Read-only access",
        }
    }
}

/// Evaluate `policies` (OR-combined) for a request.
///
/// Anonymous callers that no policy admits get [`CoreError::Unauthorized`];
/// authenticated callers get [`CoreError::PermissionDenied`].
pub fn authorize(
    policies: &[Policy],
    actor: Option<&Actor>,
    action: Action,
    resource: Option<&dyn Authored>,
) -> Result<(), CoreError> {
    if policies
        .iter()
        .any(|policy| policy.permits(actor, action, resource))
    {
        return Ok(());
    }

    if actor.is_none() {
        return Err(CoreError::Unauthorized(
            "Authentication credentials were not provided".into(),
        ));
    }

    let message = policies
        .iter()
        .find(|policy| **policy != Policy::ReadOnly)
        .or(policies.first())
        .map_or("Permission denied", |policy| policy.denial_message());
    Err(CoreError::PermissionDenied(message.into()))
}
