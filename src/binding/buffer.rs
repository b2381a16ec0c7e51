//! Buffering decorators: plain buffer, deferred commit, and the bar gate.
//!
//! All three keep the last envelope in a lazily initialized cell. The cell is
//! filled from the inner binding on the first `peek`, not at construction:
//! reading eagerly would evaluate everything below against values the UI
//! has not shown yet.

use std::rc::{Rc, Weak};

use tracing::trace;

use super::{Binding, BindingRef, Buffered};
use crate::reactive::Subscription;
use crate::value::{BindingValue, Value};

// ---------------------------------------------------------------------------
// BufferBinding
// ---------------------------------------------------------------------------

/// Keeps the last envelope locally.
///
/// After a push, `peek` shows the pushed envelope until the inner binding
/// announces a change, at which point the cell takes the inner binding's
/// authoritative envelope.
pub struct BufferBinding<T: Value> {
    core: Buffered<T>,
}

impl<T: Value> BufferBinding<T> {
    pub fn new(inner: BindingRef<T>) -> Rc<Self> {
        Rc::new_cyclic(|this: &Weak<Self>| Self {
            core: Buffered::new(inner, this, |binding: &Self| binding.core.sync()),
        })
    }
}

impl<T: Value> Binding<T> for BufferBinding<T> {
    fn push(&self, value: BindingValue<T>) {
        self.core.set(value.clone());
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
// DeferringBinding
// ---------------------------------------------------------------------------

/// Buffers edits and commits them only when focus is lost.
pub struct DeferringBinding<T: Value> {
    core: Buffered<T>,
}

impl<T: Value> DeferringBinding<T> {
    pub fn new(inner: BindingRef<T>) -> Rc<Self> {
        Rc::new_cyclic(|this: &Weak<Self>| Self {
            core: Buffered::new(inner, this, |binding: &Self| binding.core.sync()),
        })
    }
}

impl<T: Value> Binding<T> for DeferringBinding<T> {
    fn push(&self, value: BindingValue<T>) {
        self.core.set(value);
    }

    fn peek(&self) -> BindingValue<T> {
        self.core.peek()
    }

    /// Re-arm: keep the current value, drop any carried error.
    fn on_focus(&self) {
        let current = self.peek();
        self.core.set(BindingValue::new(current.value));
        self.core.inner().on_focus();
    }

    /// Commit the buffered envelope.
    fn on_blur(&self) {
        let buffered = self.peek();
        trace!(value = ?buffered.value, "deferred commit");
        self.core.inner().push(buffered);
        self.core.inner().on_blur();
    }

    fn subscribe(&self, observer: Box<dyn Fn()>) -> Subscription {
        self.core.subscribe(observer)
    }
}

// ---------------------------------------------------------------------------
// BarBinding
// ---------------------------------------------------------------------------

/// Gate: forwards only envelopes without an error.
///
/// Erroneous envelopes still land in the cell, so the UI keeps showing what
/// was typed along with the error.
pub struct BarBinding<T: Value> {
    core: Buffered<T>,
}

impl<T: Value> BarBinding<T> {
    pub fn new(inner: BindingRef<T>) -> Rc<Self> {
        Rc::new_cyclic(|this: &Weak<Self>| Self {
            core: Buffered::new(inner, this, |binding: &Self| binding.core.sync()),
        })
    }
}

impl<T: Value> Binding<T> for BarBinding<T> {
    fn push(&self, value: BindingValue<T>) {
        if value.is_ok() {
            self.core.set(value.clone());
            self.core.inner().push(value);
        } else {
            trace!(level = %value.level(), "bar holds back erroneous value");
            self.core.set(value);
        }
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
