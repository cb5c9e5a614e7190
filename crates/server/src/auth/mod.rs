//! Authentication for the community API
//!
//! Requests carry an HS256 bearer token issued by the identity provider (or
//! minted locally with `community-server token`). The API layer resolves the
//! token into a [`Viewer`] before executing the GraphQL request; resolvers
//! that need a signed-in user go through [`require_auth`].

pub mod guard;
pub mod token;

pub use guard::{AuthedContext, Viewer, require_auth};
pub use token::{Claims, TokenService};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Represents an authenticated user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Stable user identifier (the token subject)
    pub id: String,
    /// Verified email address, if the account has one
    pub email: Option<String>,
    pub username: Option<String>,
}

impl User {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: None,
            username: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Whether the account has a non-empty email address.
    pub fn has_email(&self) -> bool {
        self.email.as_deref().is_some_and(|email| !email.is_empty())
    }
}

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("You must be signed in to do this")]
    AuthenticationRequired,

    #[error("Invalid or expired token")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),
}
