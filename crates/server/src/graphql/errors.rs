use async_graphql::{Error, ErrorExtensions};

use crate::community::CreationFailure;

pub fn bad_user_input(message: impl Into<String>) -> Error {
    Error::new(message.into()).extend_with(|_, e| e.set("code", "BAD_USER_INPUT"))
}

/// A rejected community creation: user-facing message plus the failure code.
pub fn rejected(failure: &CreationFailure) -> Error {
    let reason = failure.code();
    bad_user_input(failure.to_string()).extend_with(|_, e| e.set("reason", reason))
}

pub fn unauthenticated(err: impl std::fmt::Display) -> Error {
    Error::new(err.to_string()).extend_with(|_, e| e.set("code", "UNAUTHENTICATED"))
}

pub fn internal_error(err: impl std::fmt::Display) -> Error {
    Error::new(err.to_string())
}
