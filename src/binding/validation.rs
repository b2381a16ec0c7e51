//! Synchronous validation and first-peek validation.

use std::cell::Cell;
use std::rc::{Rc, Weak};

use super::{Binding, BindingRef, Buffered};
use crate::reactive::Subscription;
use crate::validate::Validator;
use crate::value::{BindingError, BindingValue, Severity, Value};

// ---------------------------------------------------------------------------
// ValidationBinding
// ---------------------------------------------------------------------------

/// Annotates values with a validator's verdict.
///
/// Validation never blocks: the annotated envelope is forwarded regardless
/// (put a [`BarBinding`](super::BarBinding) below to gate). Values arriving
/// from below through a change notification are validated too, so the error
/// stays current when the value changes without a push.
///
/// The cell starts out with the raw inner value: nothing is flagged before
/// the first push or change. Wrap in an
/// [`InitialValidationBinding`] to validate immediately.
///
/// A failure is merged into any error the envelope already carries with
/// [`BindingError::merge`]: the higher severity wins, ties keep the existing
/// error.
pub struct ValidationBinding<T: Value> {
    core: Buffered<T>,
    validator: Box<dyn Validator<T>>,
    level: Severity,
}

impl<T: Value> ValidationBinding<T> {
    pub fn new(
        inner: BindingRef<T>,
        validator: impl Validator<T> + 'static,
        level: Severity,
    ) -> Rc<Self> {
        Rc::new_cyclic(|this: &Weak<Self>| Self {
            core: Buffered::new(inner, this, Self::refresh),
            validator: Box::new(validator),
            level,
        })
    }

    /// Severity assigned to this layer's failures.
    pub fn level(&self) -> Severity {
        self.level
    }

    fn validated(&self, value: BindingValue<T>) -> BindingValue<T> {
        match self.validator.validate(&value.value) {
            None => value,
            Some(message) => {
                let error = BindingError::merge(value.error, BindingError::new(self.level, message));
                BindingValue::with_error(value.value, error)
            }
        }
    }

    fn refresh(&self) {
        self.core.set(self.validated(self.core.inner().peek()));
    }
}

impl<T: Value> Binding<T> for ValidationBinding<T> {
    fn push(&self, value: BindingValue<T>) {
        let validated = self.validated(value);
        self.core.set(validated.clone());
        self.core.inner().push(validated);
    }

    fn peek(&self) -> BindingValue<T> {
        self.core.peek()
    }

    fn on_focus(&self) {
        self.core.inner().on_focus();
    }

    fn on_blur(&self) {
        self.core.inner().on_blur();
    }

    fn subscribe(&self, observer: Box<dyn Fn()>) -> Subscription {
        self.core.subscribe(observer)
    }
}

// ---------------------------------------------------------------------------
// InitialValidationBinding
// ---------------------------------------------------------------------------

/// On the very first `peek`, pushes the current value back down so that the
/// validators below run before the user has touched anything.
pub struct InitialValidationBinding<T: Value> {
    inner: BindingRef<T>,
    primed: Cell<bool>,
}

impl<T: Value> InitialValidationBinding<T> {
    pub fn new(inner: BindingRef<T>) -> Rc<Self> {
        Rc::new(Self {
            inner,
            primed: Cell::new(false),
        })
    }
}

impl<T: Value> Binding<T> for InitialValidationBinding<T> {
    fn push(&self, value: BindingValue<T>) {
        self.inner.push(value);
    }

    fn peek(&self) -> BindingValue<T> {
        if self.primed.replace(true) {
            return self.inner.peek();
        }
        let source = self.inner.peek();
        self.push(source.clone());
        source
    }

    fn on_focus(&self) {
        self.inner.on_focus();
    }

    fn on_blur(&self) {
        self.inner.on_blur();
    }

    fn subscribe(&self, observer: Box<dyn Fn()>) -> Subscription {
        self.inner.subscribe(observer)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ProbeBinding;
    use crate::validate::NotEmpty;
    use pretty_assertions::assert_eq;

    fn text(s: &str) -> BindingValue<String> {
        BindingValue::new(s.to_owned())
    }

    #[test]
    fn quiet_until_first_push() {
        let probe = ProbeBinding::new(String::new());
        let validation = ValidationBinding::new(probe.clone(), NotEmpty, Severity::Error);
        assert_eq!(validation.peek(), text(""));
    }

    #[test]
    fn push_annotates_and_forwards() {
        let probe = ProbeBinding::new("x".to_owned());
        let validation = ValidationBinding::new(probe.clone(), NotEmpty, Severity::Warning);
        validation.push(text(""));

        let shown = validation.peek();
        assert_eq!(shown.level(), Severity::Warning);
        assert_eq!(shown.error.unwrap().message, NotEmpty::MESSAGE);

        let forwarded = probe.pushes();
        assert_eq!(forwarded.len(), 1);
        assert_eq!(forwarded[0].level(), Severity::Warning);
    }

    #[test]
    fn valid_push_clears_error() {
        let probe = ProbeBinding::new(String::new());
        let validation = ValidationBinding::new(probe.clone(), NotEmpty, Severity::Error);
        validation.push(text(""));
        validation.push(text("ok"));
        assert_eq!(validation.peek(), text("ok"));
    }

    #[test]
    fn external_change_is_validated() {
        let probe = ProbeBinding::new("fine".to_owned());
        let validation = ValidationBinding::new(probe.clone(), NotEmpty, Severity::Error);
        assert!(validation.peek().is_ok());

        probe.set_external(text("  "));
        assert_eq!(validation.peek().level(), Severity::Error);
    }

    #[test]
    fn higher_existing_error_is_kept() {
        let probe = ProbeBinding::new(String::new());
        let validation = ValidationBinding::new(probe.clone(), NotEmpty, Severity::Warning);
        let fatal = BindingError::new(Severity::Fatal, "from below");
        validation.push(BindingValue::with_error(String::new(), fatal.clone()));
        assert_eq!(validation.peek().error, Some(fatal));
    }

    #[test]
    fn own_failure_overrides_lower_existing_error() {
        let probe = ProbeBinding::new(String::new());
        let validation = ValidationBinding::new(probe.clone(), NotEmpty, Severity::Error);
        let info = BindingError::new(Severity::Information, "fyi");
        validation.push(BindingValue::with_error(String::new(), info));
        let shown = validation.peek().error.unwrap();
        assert_eq!(shown.level, Severity::Error);
        assert_eq!(shown.message, NotEmpty::MESSAGE);
    }

    #[test]
    fn initial_validation_flags_on_first_peek() {
        let probe = ProbeBinding::new(String::new());
        let validation = ValidationBinding::new(probe.clone(), NotEmpty, Severity::Error);
        let initial = InitialValidationBinding::new(validation.clone());

        let first = initial.peek();
        assert_eq!(first, text(""));
        assert_eq!(validation.peek().level(), Severity::Error);

        // Later peeks pass through without pushing again.
        let pushes = probe.pushes().len();
        initial.peek();
        assert_eq!(probe.pushes().len(), pushes);
    }
}
