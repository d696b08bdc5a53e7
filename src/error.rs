//! Error codes shared by every fallible surface of the crate.
//!
//! Module errors stay as their own `thiserror` enums; [`ErrorCode`] gives each
//! variant a stable machine-readable code and a retry hint, and [`UserError`]
//! is the flattened form the session keeps for display.

use serde::Serialize;

/// Stable code plus retry hint for an error value.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    fn retryable(&self) -> bool {
        false
    }
}

/// A user-visible error: code, rendered message and retry hint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserError {
    pub code: &'static str,
    pub message: String,
    pub retryable: bool,
}

impl UserError {
    #[must_use]
    pub fn from_error(err: &(impl ErrorCode + ?Sized)) -> Self {
        Self { code: err.error_code(), message: err.to_string(), retryable: err.retryable() }
    }
}

impl std::fmt::Display for UserError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl ErrorCode for canvas::ops::EditError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownNode(_) => "E_UNKNOWN_NODE",
        }
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
