//! Validators: synchronous and asynchronous.
//!
//! A validator returns `None` for a valid value and `Some(message)` otherwise.
//! Plain closures `Fn(&T) -> ValidationResult` are validators; so are
//! [`Predicate`] (constant message + boolean check) and [`NotEmpty`].

use std::future::Future;

use futures::future::LocalBoxFuture;
use futures::FutureExt;

use crate::error::ValidationFailure;

/// `None` means valid; `Some(message)` describes the problem.
pub type ValidationResult = Option<String>;

/// Outcome of an asynchronous validation.
pub type AsyncValidationResult = Result<ValidationResult, ValidationFailure>;

// ---------------------------------------------------------------------------
// Validator
// ---------------------------------------------------------------------------

/// Synchronous validation strategy.
pub trait Validator<T> {
    fn validate(&self, value: &T) -> ValidationResult;
}

impl<T, F> Validator<T> for F
where
    F: Fn(&T) -> ValidationResult,
{
    fn validate(&self, value: &T) -> ValidationResult {
        self(value)
    }
}

/// A boolean check with a constant failure message.
pub struct Predicate<T> {
    message: String,
    check: Box<dyn Fn(&T) -> bool>,
}

impl<T> Predicate<T> {
    pub fn new(message: impl Into<String>, check: impl Fn(&T) -> bool + 'static) -> Self {
        Self {
            message: message.into(),
            check: Box::new(check),
        }
    }
}

impl<T> Validator<T> for Predicate<T> {
    fn validate(&self, value: &T) -> ValidationResult {
        if (self.check)(value) {
            None
        } else {
            Some(self.message.clone())
        }
    }
}

/// Rejects empty or whitespace-only text.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotEmpty;

impl NotEmpty {
    pub const MESSAGE: &'static str = "Value must not be empty.";
}

impl Validator<String> for NotEmpty {
    fn validate(&self, value: &String) -> ValidationResult {
        if value.trim().is_empty() {
            Some(Self::MESSAGE.to_owned())
        } else {
            None
        }
    }
}

impl Validator<Option<String>> for NotEmpty {
    fn validate(&self, value: &Option<String>) -> ValidationResult {
        match value {
            Some(text) => self.validate(text),
            None => Some(Self::MESSAGE.to_owned()),
        }
    }
}

// ---------------------------------------------------------------------------
// AsyncValidator
// ---------------------------------------------------------------------------

/// Asynchronous validation strategy.
///
/// The returned future must not borrow from the validator or the value.
pub trait AsyncValidator<T> {
    fn validate(&self, value: &T) -> LocalBoxFuture<'static, AsyncValidationResult>;
}

impl<T, F, Fut> AsyncValidator<T> for F
where
    F: Fn(&T) -> Fut,
    Fut: Future<Output = AsyncValidationResult> + 'static,
{
    fn validate(&self, value: &T) -> LocalBoxFuture<'static, AsyncValidationResult> {
        self(value).boxed_local()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
