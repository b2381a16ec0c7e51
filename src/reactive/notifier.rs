//! Explicit change channels: [`Notifier`] and [`Subscription`].
//!
//! Every binding owns a notifier (or re-exposes its inner binding's). An
//! observer registered with [`Notifier::subscribe`] is called synchronously on
//! every [`Notifier::notify`] until its [`Subscription`] is dropped. There is
//! no ambient tracking context: who listens to whom is wired by hand when a
//! decorator is built.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use slotmap::{new_key_type, SlotMap};

// ---------------------------------------------------------------------------
// IDs
// ---------------------------------------------------------------------------

new_key_type! {
    /// Identifies an observer slot inside a [`Notifier`].
    pub struct ObserverId;
}

// ---------------------------------------------------------------------------
// Observable
// ---------------------------------------------------------------------------

/// Anything that can announce "my value may have changed".
pub trait Observable {
    /// Register `observer`; it stays registered while the returned
    /// [`Subscription`] is alive.
    fn observe(&self, observer: Box<dyn Fn()>) -> Subscription;
}

// ---------------------------------------------------------------------------
// Notifier
// ---------------------------------------------------------------------------

type Observers = RefCell<SlotMap<ObserverId, Rc<dyn Fn()>>>;

/// A publish/subscribe list of change observers.
#[derive(Clone, Default)]
pub struct Notifier {
    observers: Rc<Observers>,
}

impl Notifier {
    /// Create a notifier with no observers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an observer.
    pub fn subscribe(&self, observer: impl Fn() + 'static) -> Subscription {
        let id = self.observers.borrow_mut().insert(Rc::new(observer));
        Subscription {
            observers: Rc::downgrade(&self.observers),
            id: Some(id),
        }
    }

    /// Call every registered observer.
    ///
    /// The observer list is snapshotted first, so observers may subscribe,
    /// unsubscribe, or trigger nested notifications without conflicting
    /// borrows.
    pub fn notify(&self) {
        let snapshot: Vec<Rc<dyn Fn()>> = self.observers.borrow().values().cloned().collect();
        for observer in snapshot {
            observer();
        }
    }

    /// Number of live observers.
    pub fn len(&self) -> usize {
        self.observers.borrow().len()
    }

    /// Whether nobody is listening.
    pub fn is_empty(&self) -> bool {
        self.observers.borrow().is_empty()
    }
}

impl Observable for Notifier {
    fn observe(&self, observer: Box<dyn Fn()>) -> Subscription {
        self.subscribe(observer)
    }
}

impl fmt::Debug for Notifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notifier")
            .field("observers", &self.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Subscription
// ---------------------------------------------------------------------------

/// Keeps an observer registered. Dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    observers: Weak<Observers>,
    id: Option<ObserverId>,
}

impl Subscription {
    /// A subscription that is not attached to anything.
    pub fn empty() -> Self {
        Self {
            observers: Weak::new(),
            id: None,
        }
    }

    /// Unsubscribe now. Idempotent.
    pub fn cancel(&mut self) {
        if let (Some(id), Some(observers)) = (self.id.take(), self.observers.upgrade()) {
            observers.borrow_mut().remove(id);
        }
    }

    /// Whether the observer is still registered.
    pub fn is_active(&self) -> bool {
        match (self.id, self.observers.upgrade()) {
            (Some(id), Some(observers)) => observers.borrow().contains_key(id),
            _ => false,
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
