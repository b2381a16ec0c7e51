//! Fluent construction of binding chains.
//!
//! A [`Binder`] carries the configuration and scheduler shared by the chains
//! it starts. Each [`BindingBuilder`] method wraps the chain built so far in
//! one more decorator, so the first call ends up nearest the model and the
//! last call nearest the UI:
//!
//! ```ignore
//! let binder = Binder::new(scheduler);
//! let age = binder
//!     .bind(&model, field!(Person, age))
//!     .bar()
//!     .validate(|n: &f64| (*n < 0.0).then(|| "Negative age".to_owned()))
//!     .convert(FloatConverter)
//!     .buffer()
//!     .binding();
//! ```
//!
//! Pushing `"-3"` into `age` converts it, flags it, and stops at the bar; the
//! model is untouched and `age.peek()` reports the error.

use std::rc::Rc;
use std::time::Duration;

use crate::binding::{
    AsyncValidationBinding, BarBinding, BindingRef, BufferBinding, ConversionBinding,
    DeferringBinding, FixBinding, InitialValidationBinding, PropertyBinding, ThrottleBinding,
    TrackingBinding, TrivialBinding, ValidationBinding, WeakBranchBinding,
};
use crate::config::BinderConfig;
use crate::convert::Converter;
use crate::reactive::{Field, Model, Observable};
use crate::schedule::{Scheduler, TokioScheduler};
use crate::validate::{AsyncValidator, Predicate, Validator};
use crate::value::{BindingValue, Severity, Value};

// ---------------------------------------------------------------------------
// Binder
// ---------------------------------------------------------------------------

/// Starting point for binding chains.
#[derive(Clone)]
pub struct Binder {
    config: Rc<BinderConfig>,
    scheduler: Rc<dyn Scheduler>,
}

impl Binder {
    /// Create a binder with the default config, running deferred work on
    /// `scheduler`.
    pub fn new(scheduler: Rc<dyn Scheduler>) -> Self {
        Self {
            config: Rc::new(BinderConfig::default()),
            scheduler,
        }
    }

    /// Replace the config (builder).
    pub fn with_config(mut self, config: BinderConfig) -> Self {
        self.config = Rc::new(config);
        self
    }

    pub fn config(&self) -> &BinderConfig {
        &self.config
    }

    pub fn scheduler(&self) -> Rc<dyn Scheduler> {
        self.scheduler.clone()
    }

    /// Start a chain at one field of `model`.
    pub fn bind<M: 'static, T: Value>(&self, model: &Model<M>, field: Field<M, T>) -> BindingBuilder<T> {
        self.from_binding(PropertyBinding::new(model.clone(), field))
    }

    /// Start a chain at a constant that ignores pushes.
    pub fn trivial<T: Value>(&self, value: T) -> BindingBuilder<T> {
        self.from_binding(TrivialBinding::new(BindingValue::new(value)))
    }

    /// Continue building on an existing binding.
    pub fn from_binding<T: Value>(&self, binding: BindingRef<T>) -> BindingBuilder<T> {
        BindingBuilder {
            binding,
            binder: self.clone(),
        }
    }
}

impl Default for Binder {
    /// A binder on [`TokioScheduler`].
    fn default() -> Self {
        Self::new(Rc::new(TokioScheduler))
    }
}

// ---------------------------------------------------------------------------
// BindingBuilder
// ---------------------------------------------------------------------------

/// A chain under construction.
///
/// Every method consumes the builder and returns one wrapping a new
/// decorator; the previous chain is never modified.
#[must_use = "a builder does nothing until `binding()` is called"]
pub struct BindingBuilder<T: Value> {
    binding: BindingRef<T>,
    binder: Binder,
}

impl<T: Value> BindingBuilder<T> {
    /// Finish and return the assembled chain.
    pub fn binding(self) -> BindingRef<T> {
        self.binding
    }

    fn wrap(self, binding: BindingRef<T>) -> Self {
        Self {
            binding,
            binder: self.binder,
        }
    }

    /// Keep the last envelope locally.
    pub fn buffer(self) -> Self {
        let binding = BufferBinding::new(self.binding.clone());
        self.wrap(binding)
    }

    /// Commit only when focus is lost.
    pub fn defer(self) -> Self {
        let binding = DeferringBinding::new(self.binding.clone());
        self.wrap(binding)
    }

    /// Stop erroneous envelopes from travelling further in.
    pub fn bar(self) -> Self {
        let binding = BarBinding::new(self.binding.clone());
        self.wrap(binding)
    }

    /// Normalize every pushed value with `fix`.
    pub fn fix(self, fix: impl Fn(T) -> T + 'static) -> Self {
        let binding = FixBinding::new(self.binding.clone(), fix);
        self.wrap(binding)
    }

    /// Switch the chain's outer type to `S`. Conversion failures are
    /// reported at the config's default level and never forwarded.
    pub fn convert<S: Value>(self, converter: impl Converter<S, T> + 'static) -> BindingBuilder<S> {
        let level = self.binder.config.default_level;
        BindingBuilder {
            binding: ConversionBinding::new(self.binding, converter, level),
            binder: self.binder,
        }
    }

    /// Validate at the config's default level.
    pub fn validate(self, validator: impl Validator<T> + 'static) -> Self {
        let level = self.binder.config.default_level;
        self.validate_with_level(validator, level)
    }

    /// Validate with a boolean check and a constant failure message.
    pub fn validate_with_message(
        self,
        message: impl Into<String>,
        check: impl Fn(&T) -> bool + 'static,
    ) -> Self {
        self.validate(Predicate::new(message, check))
    }

    /// Validate at an explicit level.
    pub fn validate_with_level(self, validator: impl Validator<T> + 'static, level: Severity) -> Self {
        let binding = ValidationBinding::new(self.binding.clone(), validator, level);
        self.wrap(binding)
    }

    /// Validate asynchronously at the config's default level.
    pub fn validate_async(self, validator: impl AsyncValidator<T> + 'static) -> Self {
        let config = self.binder.config.clone();
        let binding = AsyncValidationBinding::new(
            self.binding.clone(),
            validator,
            config.default_level,
            &config,
            self.binder.scheduler.clone(),
        );
        self.wrap(binding)
    }

    /// Commit at most once per `delay`, last value wins. Buffered so the
    /// typed input stays visible meanwhile.
    pub fn throttle(self, delay: Duration) -> Self {
        let binding = ThrottleBinding::new(self.binding.clone(), delay, self.binder.scheduler.clone());
        self.wrap(binding).buffer()
    }

    /// Run the validators below on the very first `peek`. Buffered so the
    /// first result sticks.
    pub fn validate_initially(self) -> Self {
        let binding = InitialValidationBinding::new(self.binding.clone());
        self.wrap(binding).buffer()
    }

    /// Attach a side branch whose errors show through when the main chain
    /// has none. `branch` receives a builder over a constant placeholder;
    /// values it produces are discarded.
    pub fn weak_branch(self, branch: impl FnOnce(BindingBuilder<T>) -> BindingBuilder<T>) -> Self
    where
        T: Default,
    {
        let side = branch(self.binder.trivial(T::default())).binding();
        let binding = WeakBranchBinding::new(self.binding.clone(), side);
        self.wrap(binding)
    }

    /// Re-announce a change whenever `source` changes, so validation layers
    /// added later re-run.
    pub fn depends_on(self, source: &dyn Observable) -> Self {
        let binding = TrackingBinding::new(self.binding.clone(), source);
        self.wrap(binding)
    }

    /// Apply `step` only when `condition` holds.
    pub fn conditionally(self, condition: bool, step: impl FnOnce(Self) -> Self) -> Self {
        if condition {
            step(self)
        } else {
            self
        }
    }

    /// Apply a reusable sequence of steps.
    pub fn apply<U: Value>(self, steps: impl FnOnce(Self) -> BindingBuilder<U>) -> BindingBuilder<U> {
        steps(self)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
