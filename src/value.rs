//! Value envelopes: the unit exchanged through a binding chain.
//!
//! A [`BindingValue`] pairs a value with an optional [`BindingError`]. Errors
//! are classified by [`Severity`], a total order from `None` (transient
//! annotations such as "validation pending") up to `Fatal`.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::future::{LocalBoxFuture, Shared};
use futures::FutureExt;

// ---------------------------------------------------------------------------
// Value
// ---------------------------------------------------------------------------

/// Bound values must be cloneable, comparable and printable.
///
/// Comparison drives change detection at the model boundary; `Debug` keeps
/// envelopes inspectable in logs and test failures.
pub trait Value: Clone + PartialEq + fmt::Debug + 'static {}

impl<T: Clone + PartialEq + fmt::Debug + 'static> Value for T {}

// ---------------------------------------------------------------------------
// Severity
// ---------------------------------------------------------------------------

/// Error severity, totally ordered: `None < Information < Warning < Error < Fatal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Severity {
    /// Transient annotation only, e.g. an async validation in flight.
    #[default]
    None,
    /// Benign information.
    Information,
    /// Acceptable validation issue.
    Warning,
    /// Unacceptable validation issue.
    Error,
    /// Something went wrong outside the value itself (e.g. a failed async check).
    Fatal,
}

impl Severity {
    /// Whether this severity makes a value unacceptable (`Error` or worse).
    pub fn is_blocking(self) -> bool {
        self >= Severity::Error
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::None => "none",
            Self::Information => "information",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Fatal => "fatal",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// PendingValidation
// ---------------------------------------------------------------------------

/// Handle to an in-flight asynchronous validation.
///
/// Cloneable and awaitable any number of times; resolves once the validation
/// it belongs to has finished (whether or not its result was applied).
#[derive(Clone)]
pub struct PendingValidation(Shared<LocalBoxFuture<'static, ()>>);

impl PendingValidation {
    /// Wrap a future that completes when the validation is done.
    pub fn new(done: impl Future<Output = ()> + 'static) -> Self {
        Self(done.boxed_local().shared())
    }

    /// Whether both handles refer to the same validation run.
    pub fn same_run(&self, other: &Self) -> bool {
        self.0.ptr_eq(&other.0)
    }

    /// Whether the validation has already completed.
    pub fn is_done(&self) -> bool {
        self.0.peek().is_some()
    }
}

impl Future for PendingValidation {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        self.0.poll_unpin(cx)
    }
}

impl fmt::Debug for PendingValidation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingValidation")
            .field("done", &self.is_done())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// BindingError
// ---------------------------------------------------------------------------

/// A classified problem attached to a value.
#[derive(Debug, Clone)]
pub struct BindingError {
    pub level: Severity,
    pub message: String,
    /// Set while an asynchronous validation for this value is running.
    pub pending: Option<PendingValidation>,
}

impl BindingError {
    /// Create an error at the given level.
    pub fn new(level: Severity, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            pending: None,
        }
    }

    /// Create the `None`-level annotation used while an async validation runs.
    pub fn pending(message: impl Into<String>, handle: PendingValidation) -> Self {
        Self {
            level: Severity::None,
            message: message.into(),
            pending: Some(handle),
        }
    }

    /// Combine an error already carried by an envelope with a freshly computed one.
    ///
    /// The higher severity wins; on a tie the existing error wins. If the
    /// winner has no pending handle, the loser's handle is carried over so
    /// that callers can still await the validation.
    pub fn merge(existing: Option<BindingError>, fresh: BindingError) -> BindingError {
        let Some(existing) = existing else {
            return fresh;
        };
        let (mut winner, loser) = if fresh.level > existing.level {
            (fresh, existing)
        } else {
            (existing, fresh)
        };
        if winner.pending.is_none() {
            winner.pending = loser.pending;
        }
        winner
    }
}

impl PartialEq for BindingError {
    fn eq(&self, other: &Self) -> bool {
        let same_pending = match (&self.pending, &other.pending) {
            (None, None) => true,
            (Some(a), Some(b)) => a.same_run(b),
            _ => false,
        };
        self.level == other.level && self.message == other.message && same_pending
    }
}

impl fmt::Display for BindingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.level, self.message)
    }
}

// ---------------------------------------------------------------------------
// BindingValue
// ---------------------------------------------------------------------------

/// A value paired with an optional error.
#[derive(Debug, Clone, PartialEq)]
pub struct BindingValue<T> {
    pub value: T,
    pub error: Option<BindingError>,
}

impl<T> BindingValue<T> {
    /// An envelope carrying no error.
    pub fn new(value: T) -> Self {
        Self { value, error: None }
    }

    /// An envelope carrying `error`.
    pub fn with_error(value: T, error: BindingError) -> Self {
        Self {
            value,
            error: Some(error),
        }
    }

    /// Severity of the carried error, `Severity::None` when there is none.
    pub fn level(&self) -> Severity {
        self.error.as_ref().map_or(Severity::None, |e| e.level)
    }

    /// Whether no error is attached.
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// Map the value, keeping the error.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> BindingValue<U> {
        BindingValue {
            value: f(self.value),
            error: self.error,
        }
    }
}

impl<T> From<T> for BindingValue<T> {
    fn from(value: T) -> Self {
        Self::new(value)
    }
}

// ===========================================================================
// Tests
// ===========================================================================
