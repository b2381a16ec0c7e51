//! Error types.
//!
//! Validation and conversion problems travel through a chain as data
//! ([`BindingError`](crate::value::BindingError)). The types here cover the
//! remaining cases: misuse of a [`BindingContext`](crate::context::BindingContext),
//! converter failures, and rejected asynchronous validations.

use futures::channel::oneshot;

/// Misuse of the context registration or tree API.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContextError {
    #[error("binding already in context")]
    AlreadyRegistered,
    #[error("no such binding in context")]
    NotRegistered,
    #[error("context already has a parent")]
    AlreadyHasParent,
    #[error("can't undeclare the wrong parent")]
    WrongParent,
    #[error("declaring this parent would create a cycle")]
    Cycle,
}

/// A failed forward conversion.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ConversionError {
    pub message: String,
}

impl ConversionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// An asynchronous validator that could not produce a verdict.
#[derive(Debug, thiserror::Error)]
pub enum ValidationFailure {
    #[error("validation failed: {0}")]
    Rejected(String),
    #[error("validation was canceled")]
    Canceled,
}

impl From<oneshot::Canceled> for ValidationFailure {
    fn from(_: oneshot::Canceled) -> Self {
        Self::Canceled
    }
}
