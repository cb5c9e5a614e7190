use async_graphql::Context;

use super::{AuthError, User};
use crate::graphql::errors::unauthenticated;

/// Per-request identity attached to the GraphQL request data.
#[derive(Debug, Clone, Default)]
pub struct Viewer(pub Option<User>);

impl Viewer {
    pub fn anonymous() -> Self {
        Viewer(None)
    }

    pub fn user(user: User) -> Self {
        Viewer(Some(user))
    }
}

/// Resolver context for operations that require a signed-in user.
#[derive(Debug, Clone, Copy)]
pub struct AuthedContext<'a> {
    pub user: &'a User,
}

/// Fetch the current viewer, treating a missing [`Viewer`] as anonymous.
pub fn current_user<'a>(ctx: &Context<'a>) -> Option<&'a User> {
    ctx.data_opt::<Viewer>().and_then(|viewer| viewer.0.as_ref())
}

/// Guard for authenticated resolvers.
pub fn require_auth<'a>(ctx: &Context<'a>) -> async_graphql::Result<AuthedContext<'a>> {
    match current_user(ctx) {
        Some(user) => Ok(AuthedContext { user }),
        None => Err(unauthenticated(AuthError::AuthenticationRequired)),
    }
}
