//! Binder configuration.

use crate::value::Severity;

/// Settings shared by every chain built from one [`Binder`](crate::builder::Binder).
#[derive(Debug, Clone)]
pub struct BinderConfig {
    /// Severity used by `validate` when no level is given.
    pub default_level: Severity,
    /// Severity used when an asynchronous validator fails to answer.
    pub async_failure_level: Severity,
    /// Message of the `None`-level annotation shown while validating.
    pub pending_message: String,
}

impl Default for BinderConfig {
    fn default() -> Self {
        Self {
            default_level: Severity::Error,
            async_failure_level: Severity::Fatal,
            pending_message: "validating...".to_owned(),
        }
    }
}

impl BinderConfig {
    /// Create a new default config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the default validation level (builder).
    pub fn with_default_level(mut self, level: Severity) -> Self {
        self.default_level = level;
        self
    }

    /// Set the async failure level (builder).
    pub fn with_async_failure_level(mut self, level: Severity) -> Self {
        self.async_failure_level = level;
        self
    }

    /// Set the pending message (builder).
    pub fn with_pending_message(mut self, message: impl Into<String>) -> Self {
        self.pending_message = message.into();
        self
    }
}
