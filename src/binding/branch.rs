//! Auxiliary branches that contribute errors but never values.

use std::rc::Rc;

use super::{Binding, BindingRef};
use crate::reactive::{Notifier, Subscription};
use crate::value::{BindingValue, Value};

/// Sends every push down two chains: the main one and a side branch.
///
/// The side branch typically ends in a [`TrivialBinding`](super::TrivialBinding),
/// so whatever it does to the value is thrown away; only its error shows.
/// `peek` returns the main envelope, or the main value with the branch error
/// when the main chain reports none.
pub struct WeakBranchBinding<T: Value> {
    main: BindingRef<T>,
    branch: BindingRef<T>,
    changed: Notifier,
    _subscriptions: [Subscription; 2],
}

impl<T: Value> WeakBranchBinding<T> {
    pub fn new(main: BindingRef<T>, branch: BindingRef<T>) -> Rc<Self> {
        let changed = Notifier::new();
        let relay = changed.clone();
        let from_main = main.subscribe(Box::new(move || relay.notify()));
        let relay = changed.clone();
        let from_branch = branch.subscribe(Box::new(move || relay.notify()));
        Rc::new(Self {
            main,
            branch,
            changed,
            _subscriptions: [from_main, from_branch],
        })
    }
}

impl<T: Value> Binding<T> for WeakBranchBinding<T> {
    fn push(&self, value: BindingValue<T>) {
        self.main.push(value.clone());
        self.branch.push(value);
    }

    fn peek(&self) -> BindingValue<T> {
        let main = self.main.peek();
        if main.error.is_some() {
            return main;
        }
        BindingValue {
            value: main.value,
            error: self.branch.peek().error,
        }
    }

    fn on_focus(&self) {
        self.main.on_focus();
        self.branch.on_focus();
    }

    fn on_blur(&self) {
        self.main.on_blur();
        self.branch.on_blur();
    }

    fn subscribe(&self, observer: Box<dyn Fn()>) -> Subscription {
        self.changed.subscribe(observer)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
