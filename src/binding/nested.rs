//! Pass-through decorators: plain nesting, value fixing, dependency tracking.

use std::rc::Rc;

use super::{Binding, BindingRef};
use crate::reactive::{Notifier, Observable, Subscription};
use crate::value::{BindingValue, Value};

// ---------------------------------------------------------------------------
// NestedBinding
// ---------------------------------------------------------------------------

/// Forwards everything to the inner binding unchanged.
pub struct NestedBinding<T: Value> {
    inner: BindingRef<T>,
}

impl<T: Value> NestedBinding<T> {
    pub fn new(inner: BindingRef<T>) -> Rc<Self> {
        Rc::new(Self { inner })
    }
}

impl<T: Value> Binding<T> for NestedBinding<T> {
    fn push(&self, value: BindingValue<T>) {
        self.inner.push(value);
    }

    fn peek(&self) -> BindingValue<T> {
        self.inner.peek()
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
// FixBinding
// ---------------------------------------------------------------------------

/// Applies a pure transform to every pushed value; the error passes through.
pub struct FixBinding<T: Value> {
    inner: BindingRef<T>,
    fix: Box<dyn Fn(T) -> T>,
}

impl<T: Value> FixBinding<T> {
    pub fn new(inner: BindingRef<T>, fix: impl Fn(T) -> T + 'static) -> Rc<Self> {
        Rc::new(Self {
            inner,
            fix: Box::new(fix),
        })
    }
}

impl<T: Value> Binding<T> for FixBinding<T> {
    fn push(&self, value: BindingValue<T>) {
        self.inner.push(value.map(&self.fix));
    }

    fn peek(&self) -> BindingValue<T> {
        self.inner.peek()
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
// TrackingBinding
// ---------------------------------------------------------------------------

/// Pass-through that also announces a change whenever `source` changes.
///
/// Placed under a validation layer, it makes the validator re-run when
/// something it reads besides the bound value changes (e.g. another field).
pub struct TrackingBinding<T: Value> {
    inner: BindingRef<T>,
    changed: Notifier,
    _subscriptions: [Subscription; 2],
}

impl<T: Value> TrackingBinding<T> {
    pub fn new(inner: BindingRef<T>, source: &dyn Observable) -> Rc<Self> {
        let changed = Notifier::new();
        let relay = changed.clone();
        let from_inner = inner.subscribe(Box::new(move || relay.notify()));
        let relay = changed.clone();
        let from_source = source.observe(Box::new(move || relay.notify()));
        Rc::new(Self {
            inner,
            changed,
            _subscriptions: [from_inner, from_source],
        })
    }
}

impl<T: Value> Binding<T> for TrackingBinding<T> {
    fn push(&self, value: BindingValue<T>) {
        self.inner.push(value);
    }

    fn peek(&self) -> BindingValue<T> {
        self.inner.peek()
    }

    fn on_focus(&self) {
        self.inner.on_focus();
    }

    fn on_blur(&self) {
        self.inner.on_blur();
    }

    fn subscribe(&self, observer: Box<dyn Fn()>) -> Subscription {
        self.changed.subscribe(observer)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
