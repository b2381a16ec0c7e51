//! Asynchronous validation with supersession.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use tracing::trace;

use super::{Binding, BindingRef, Buffered};
use crate::config::BinderConfig;
use crate::reactive::Subscription;
use crate::schedule::Scheduler;
use crate::validate::{AsyncValidationResult, AsyncValidator};
use crate::value::{BindingError, BindingValue, PendingValidation, Severity, Value};

/// Runs an [`AsyncValidator`] whenever a new value arrives.
///
/// While a validation runs, `peek` shows the value with a `Severity::None`
/// annotation whose [`pending`](BindingError::pending) handle resolves when
/// the run completes. Only the most recently launched run may write its
/// verdict; earlier runs finish quietly. A validator that fails to produce a
/// verdict surfaces as an error at the configured failure level.
///
/// The annotation or verdict is kept apart from the envelope below and merged
/// into it on every change, so errors added by inner layers stay visible.
///
/// Pushed envelopes are forwarded unchanged and immediately. Validation is
/// advisory here; combine with a bar to gate.
pub struct AsyncValidationBinding<T: Value> {
    this: Weak<Self>,
    core: Buffered<T>,
    validator: Box<dyn AsyncValidator<T>>,
    level: Severity,
    failure_level: Severity,
    pending_message: String,
    scheduler: Rc<dyn Scheduler>,
    generation: Cell<u64>,
    launched: RefCell<Option<T>>,
    verdict: RefCell<Option<BindingError>>,
}

impl<T: Value> AsyncValidationBinding<T> {
    pub fn new(
        inner: BindingRef<T>,
        validator: impl AsyncValidator<T> + 'static,
        level: Severity,
        config: &BinderConfig,
        scheduler: Rc<dyn Scheduler>,
    ) -> Rc<Self> {
        Rc::new_cyclic(|this: &Weak<Self>| Self {
            this: this.clone(),
            core: Buffered::new(inner, this, Self::refresh),
            validator: Box::new(validator),
            level,
            failure_level: config.async_failure_level,
            pending_message: config.pending_message.clone(),
            scheduler,
            generation: Cell::new(0),
            launched: RefCell::new(None),
            verdict: RefCell::new(None),
        })
    }

    /// Handle of the run currently shown, if one is in flight.
    pub fn pending(&self) -> Option<PendingValidation> {
        self.core
            .cell()
            .get()
            .and_then(|v| v.error)
            .and_then(|e| e.pending)
            .filter(|handle| !handle.is_done())
    }

    fn launch(&self, value: BindingValue<T>) {
        let token = self.generation.get() + 1;
        self.generation.set(token);
        *self.launched.borrow_mut() = Some(value.value.clone());
        trace!(token, value = ?value.value, "async validation launched");

        let verdict = self.validator.validate(&value.value);
        let this = self.this.clone();
        let subject = value.clone();
        let handle = PendingValidation::new(async move {
            let result = verdict.await;
            if let Some(this) = this.upgrade() {
                this.resolve(token, subject, result);
            }
        });

        let annotation = BindingError::pending(self.pending_message.clone(), handle.clone());
        *self.verdict.borrow_mut() = Some(annotation);
        self.show(value);
        self.scheduler.spawn(Box::pin(handle));
    }

    /// Show `base` with this layer's annotation or verdict merged in.
    fn show(&self, base: BindingValue<T>) {
        let BindingValue { value, error } = base;
        let error = match self.verdict.borrow().clone() {
            Some(own) => Some(BindingError::merge(error, own)),
            None => error,
        };
        self.core.set(BindingValue { value, error });
    }

    fn resolve(&self, token: u64, subject: BindingValue<T>, result: AsyncValidationResult) {
        if token != self.generation.get() {
            trace!(token, current = self.generation.get(), "stale async result discarded");
            return;
        }
        let verdict = match result {
            Ok(None) => None,
            Ok(Some(message)) => Some(BindingError::new(self.level, message)),
            Err(failure) => Some(BindingError::new(self.failure_level, failure.to_string())),
        };
        *self.verdict.borrow_mut() = verdict;

        // Errors added below since the launch take part in the merge.
        let below = self.core.inner().peek();
        let base = if below.value == subject.value { below } else { subject };
        self.show(base);
    }

    fn refresh(&self) {
        let current = self.core.inner().peek();
        let fresh = self.launched.borrow().as_ref() != Some(&current.value);
        if fresh {
            self.launch(current);
        } else {
            self.show(current);
        }
    }
}

impl<T: Value> Binding<T> for AsyncValidationBinding<T> {
    fn push(&self, value: BindingValue<T>) {
        self.launch(value.clone());
        self.core.inner().push(value);
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
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationFailure;
    use crate::testing::{ManualScheduler, ProbeBinding};
    use futures::channel::oneshot;
    use pretty_assertions::assert_eq;

    type Reply = oneshot::Sender<AsyncValidationResult>;

    /// A validator whose verdicts are delivered by hand, in any order.
    fn remote() -> (
        impl Fn(&String) -> futures::future::LocalBoxFuture<'static, AsyncValidationResult>,
        Rc<RefCell<Vec<Reply>>>,
    ) {
        let replies: Rc<RefCell<Vec<Reply>>> = Rc::default();
        let replies_c = replies.clone();
        let validator = move |_: &String| {
            let (tx, rx) = oneshot::channel();
            replies_c.borrow_mut().push(tx);
            let fut: futures::future::LocalBoxFuture<'static, AsyncValidationResult> =
                Box::pin(async move { rx.await? });
            fut
        };
        (validator, replies)
    }

    fn setup() -> (
        Rc<ManualScheduler>,
        Rc<ProbeBinding<String>>,
        Rc<AsyncValidationBinding<String>>,
        Rc<RefCell<Vec<Reply>>>,
    ) {
        let scheduler = Rc::new(ManualScheduler::new());
        let probe = ProbeBinding::new(String::new());
        let (validator, replies) = remote();
        let binding = AsyncValidationBinding::new(
            probe.clone(),
            validator,
            Severity::Error,
            &BinderConfig::default(),
            scheduler.clone(),
        );
        (scheduler, probe, binding, replies)
    }

    fn reply(replies: &RefCell<Vec<Reply>>, index: usize, result: AsyncValidationResult) {
        let tx = std::mem::replace(&mut replies.borrow_mut()[index], oneshot::channel().0);
        let _ = tx.send(result);
    }

    #[test]
    fn push_forwards_and_marks_pending() {
        let (scheduler, probe, binding, _replies) = setup();
        binding.push(BindingValue::new("foo".into()));
        scheduler.run_until_stalled();

        assert_eq!(probe.pushed_values(), vec!["foo".to_owned()]);
        let shown = binding.peek();
        assert_eq!(shown.level(), Severity::None);
        assert_eq!(shown.error.as_ref().unwrap().message, "validating...");
        assert!(binding.pending().is_some());
    }

    #[test]
    fn verdict_replaces_annotation() {
        let (scheduler, _probe, binding, replies) = setup();
        binding.push(BindingValue::new("foo".into()));
        reply(&replies, 0, Ok(Some("taken".into())));
        scheduler.run_until_stalled();

        let error = binding.peek().error.unwrap();
        assert_eq!(error.level, Severity::Error);
        assert_eq!(error.message, "taken");
        assert!(binding.pending().is_none());
    }

    #[test]
    fn stale_verdict_is_discarded() {
        let (scheduler, _probe, binding, replies) = setup();
        binding.push(BindingValue::new("a".into()));
        binding.push(BindingValue::new("ab".into()));

        // The newer run answers first, then the older one.
        reply(&replies, 1, Ok(None));
        scheduler.run_until_stalled();
        reply(&replies, 0, Ok(Some("a is bad".into())));
        scheduler.run_until_stalled();

        assert_eq!(binding.peek(), BindingValue::new("ab".to_owned()));
    }

    #[test]
    fn failure_surfaces_as_fatal() {
        let (scheduler, _probe, binding, replies) = setup();
        binding.push(BindingValue::new("x".into()));
        reply(&replies, 0, Err(ValidationFailure::Rejected("server down".into())));
        scheduler.run_until_stalled();

        assert_eq!(binding.peek().level(), Severity::Fatal);
    }

    #[test]
    fn dropped_validator_counts_as_failure() {
        let (scheduler, _probe, binding, replies) = setup();
        binding.push(BindingValue::new("x".into()));
        replies.borrow_mut().clear();
        scheduler.run_until_stalled();

        let error = binding.peek().error.unwrap();
        assert_eq!(error.level, Severity::Fatal);
        assert_eq!(error.message, "validation was canceled");
    }

    #[test]
    fn external_change_relaunches() {
        let (_scheduler, probe, binding, replies) = setup();
        assert_eq!(binding.peek(), BindingValue::new(String::new()));
        assert!(replies.borrow().is_empty());

        probe.set_external(BindingValue::new("outside".into()));
        assert_eq!(replies.borrow().len(), 1);
        assert_eq!(binding.peek().value, "outside");
        assert!(binding.pending().is_some());
    }

    #[test]
    fn own_push_does_not_relaunch_on_echo() {
        let (_scheduler, _probe, binding, replies) = setup();
        binding.push(BindingValue::new("foo".into()));
        assert_eq!(replies.borrow().len(), 1);
    }

    #[test]
    fn inner_error_survives_launch_and_verdict() {
        use crate::binding::ValidationBinding;
        use crate::validate::NotEmpty;

        let scheduler = Rc::new(ManualScheduler::new());
        let probe = ProbeBinding::new("x".to_owned());
        let required = ValidationBinding::new(probe.clone(), NotEmpty, Severity::Error);
        let (validator, replies) = remote();
        let binding = AsyncValidationBinding::new(
            required,
            validator,
            Severity::Error,
            &BinderConfig::default(),
            scheduler.clone(),
        );

        binding.push(BindingValue::new(String::new()));
        let shown = binding.peek().error.unwrap();
        assert_eq!(shown.level, Severity::Error);
        assert_eq!(shown.message, NotEmpty::MESSAGE);
        assert!(binding.pending().is_some());

        reply(&replies, 0, Ok(None));
        scheduler.run_until_stalled();
        let shown = binding.peek().error.unwrap();
        assert_eq!(shown.level, Severity::Error);
        assert_eq!(shown.message, NotEmpty::MESSAGE);
        assert!(binding.pending().is_none());
    }

    #[test]
    fn verdict_outranks_weaker_inner_error() {
        let (scheduler, probe, binding, replies) = setup();
        binding.push(BindingValue::new("foo".into()));
        probe.set_external(BindingValue::with_error(
            "foo".into(),
            BindingError::new(Severity::Warning, "odd"),
        ));
        assert_eq!(replies.borrow().len(), 1);
        assert_eq!(binding.peek().level(), Severity::Warning);

        reply(&replies, 0, Ok(Some("taken".into())));
        scheduler.run_until_stalled();
        let error = binding.peek().error.unwrap();
        assert_eq!(error.level, Severity::Error);
        assert_eq!(error.message, "taken");
    }

    #[test]
    fn pending_handle_resolves_with_run() {
        let (scheduler, _probe, binding, replies) = setup();
        binding.push(BindingValue::new("foo".into()));
        let handle = binding.pending().unwrap();
        assert!(!handle.is_done());

        reply(&replies, 0, Ok(None));
        scheduler.block_on(handle.clone());
        assert!(handle.is_done());
    }
}
