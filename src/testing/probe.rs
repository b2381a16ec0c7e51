//! ProbeBinding: an inspectable leaf binding for tests.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::binding::Binding;
use crate::reactive::{Notifier, Subscription};
use crate::value::{BindingValue, Value};

/// A leaf binding that records every call made to it.
///
/// Pushed envelopes (errors included) become the current value. Use
/// [`ProbeBinding::set_external`] to simulate a change that bypasses `push`.
pub struct ProbeBinding<T> {
    current: RefCell<BindingValue<T>>,
    pushes: RefCell<Vec<BindingValue<T>>>,
    peeks: Cell<usize>,
    focuses: Cell<usize>,
    blurs: Cell<usize>,
    changed: Notifier,
}

impl<T: Value> ProbeBinding<T> {
    /// Create a probe holding `initial`.
    pub fn new(initial: T) -> Rc<Self> {
        Rc::new(Self {
            current: RefCell::new(BindingValue::new(initial)),
            pushes: RefCell::new(Vec::new()),
            peeks: Cell::new(0),
            focuses: Cell::new(0),
            blurs: Cell::new(0),
            changed: Notifier::new(),
        })
    }

    /// Every envelope pushed so far, oldest first.
    pub fn pushes(&self) -> Vec<BindingValue<T>> {
        self.pushes.borrow().clone()
    }

    /// The values of every pushed envelope, oldest first.
    pub fn pushed_values(&self) -> Vec<T> {
        self.pushes.borrow().iter().map(|v| v.value.clone()).collect()
    }

    /// The current value without counting as a peek.
    pub fn current(&self) -> BindingValue<T> {
        self.current.borrow().clone()
    }

    /// How many times `peek` was called.
    pub fn peek_count(&self) -> usize {
        self.peeks.get()
    }

    /// How many times `on_focus` was called.
    pub fn focus_count(&self) -> usize {
        self.focuses.get()
    }

    /// How many times `on_blur` was called.
    pub fn blur_count(&self) -> usize {
        self.blurs.get()
    }

    /// Replace the current value without a push and notify observers.
    pub fn set_external(&self, value: BindingValue<T>) {
        *self.current.borrow_mut() = value;
        self.changed.notify();
    }

    fn replace(&self, value: BindingValue<T>) {
        let changed = {
            let mut current = self.current.borrow_mut();
            if *current == value {
                false
            } else {
                *current = value;
                true
            }
        };
        if changed {
            self.changed.notify();
        }
    }
}

impl<T: Value> Binding<T> for ProbeBinding<T> {
    fn push(&self, value: BindingValue<T>) {
        self.pushes.borrow_mut().push(value.clone());
        self.replace(value);
    }

    fn peek(&self) -> BindingValue<T> {
        self.peeks.set(self.peeks.get() + 1);
        self.current.borrow().clone()
    }

    fn on_focus(&self) {
        self.focuses.set(self.focuses.get() + 1);
    }

    fn on_blur(&self) {
        self.blurs.set(self.blurs.get() + 1);
    }

    fn subscribe(&self, observer: Box<dyn Fn()>) -> Subscription {
        self.changed.subscribe(observer)
    }
}
