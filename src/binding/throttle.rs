//! Delayed commits: only the last value of a burst reaches the inner binding.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::time::Duration;

use tracing::trace;

use super::{watch, Binding, BindingRef};
use crate::reactive::Subscription;
use crate::schedule::Scheduler;
use crate::value::{BindingValue, Value};

/// Holds pushed envelopes back for `delay` and commits the latest one.
///
/// Every push supersedes the one before it; a commit timer only fires if no
/// newer push arrived in between. Losing focus commits at once. A change
/// announced by the inner binding drops whatever is pending.
///
/// `peek` passes through, so a throttle is normally wrapped in a
/// [`BufferBinding`](super::BufferBinding) to show the typed input.
pub struct ThrottleBinding<T: Value> {
    this: Weak<Self>,
    inner: BindingRef<T>,
    delay: Duration,
    scheduler: Rc<dyn Scheduler>,
    token: Cell<u64>,
    pending: RefCell<Option<BindingValue<T>>>,
    _subscription: Subscription,
}

impl<T: Value> ThrottleBinding<T> {
    pub fn new(inner: BindingRef<T>, delay: Duration, scheduler: Rc<dyn Scheduler>) -> Rc<Self> {
        Rc::new_cyclic(|this: &Weak<Self>| Self {
            this: this.clone(),
            _subscription: watch(&*inner, this, Self::discard),
            inner,
            delay,
            scheduler,
            token: Cell::new(0),
            pending: RefCell::new(None),
        })
    }

    /// Whether a value is waiting to be committed.
    pub fn has_pending(&self) -> bool {
        self.pending.borrow().is_some()
    }

    /// Commit the pending value now, if any.
    pub fn flush(&self) {
        let pending = self.pending.borrow_mut().take();
        if let Some(value) = pending {
            trace!(value = ?value.value, "throttled commit");
            self.inner.push(value);
        }
    }

    fn fire(&self, token: u64) {
        if token == self.token.get() {
            self.flush();
        } else {
            trace!(token, current = self.token.get(), "superseded commit skipped");
        }
    }

    fn discard(&self) {
        self.pending.borrow_mut().take();
    }
}

impl<T: Value> Binding<T> for ThrottleBinding<T> {
    fn push(&self, value: BindingValue<T>) {
        let token = self.token.get() + 1;
        self.token.set(token);
        *self.pending.borrow_mut() = Some(value);

        let this = self.this.clone();
        self.scheduler.schedule(
            self.delay,
            Box::new(move || {
                if let Some(this) = this.upgrade() {
                    this.fire(token);
                }
            }),
        );
    }

    fn peek(&self) -> BindingValue<T> {
        self.inner.peek()
    }

    fn on_focus(&self) {
        self.inner.on_focus();
    }

    fn on_blur(&self) {
        self.flush();
        self.inner.on_blur();
    }

    fn subscribe(&self, observer: Box<dyn Fn()>) -> Subscription {
        self.inner.subscribe(observer)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
