//! The binding contract and every decorator.
//!
//! A [`Binding`] is a bidirectional endpoint: `push` sends an envelope toward
//! the model, `peek` reads the current best-known envelope, `on_focus` and
//! `on_blur` are lifecycle hooks, and `subscribe` exposes the binding's change
//! channel.
//!
//! Decorators each own exactly one inner binding and add one behavior. They
//! subscribe to the inner binding's change channel when built, so a change
//! that happens anywhere below (a push, a sibling branch, a direct model
//! write) reaches every layer above before the next `peek`.
//!
//! | Decorator | Behavior |
//! |---|---|
//! | [`NestedBinding`] | pass-through |
//! | [`BufferBinding`] | lazy local cell |
//! | [`DeferringBinding`] | commit on blur |
//! | [`BarBinding`] | never forwards an erroneous value |
//! | [`FixBinding`] | normalizes pushed values |
//! | [`ValidationBinding`] | annotates values with validator errors |
//! | [`AsyncValidationBinding`] | async validator with supersession |
//! | [`ConversionBinding`] | `S ⇄ T` boundary, gates failed conversions |
//! | [`ThrottleBinding`] | delayed commit, last value wins |
//! | [`InitialValidationBinding`] | validates on the very first peek |
//! | [`WeakBranchBinding`] | auxiliary branch contributing only errors |
//! | [`TrackingBinding`] | re-announces changes of another observable |

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::reactive::{Notifier, Subscription};
use crate::value::{BindingValue, Value};

pub mod async_validation;
pub mod branch;
pub mod buffer;
pub mod conversion;
pub mod nested;
pub mod property;
pub mod throttle;
pub mod validation;

pub use async_validation::AsyncValidationBinding;
pub use branch::WeakBranchBinding;
pub use buffer::{BarBinding, BufferBinding, DeferringBinding};
pub use conversion::ConversionBinding;
pub use nested::{FixBinding, NestedBinding, TrackingBinding};
pub use property::{PropertyBinding, TrivialBinding};
pub use throttle::ThrottleBinding;
pub use validation::{InitialValidationBinding, ValidationBinding};

// ---------------------------------------------------------------------------
// Binding
// ---------------------------------------------------------------------------

/// A bidirectional endpoint in a binding chain.
pub trait Binding<T: Value> {
    /// Send an envelope toward the model.
    fn push(&self, value: BindingValue<T>);

    /// The current best-known envelope. Never has side effects beyond lazy
    /// initialization of internal buffers.
    fn peek(&self) -> BindingValue<T>;

    /// The bound input gained focus.
    fn on_focus(&self) {}

    /// The bound input lost focus.
    fn on_blur(&self) {}

    /// Register an observer that is called whenever `peek` may return
    /// something new.
    fn subscribe(&self, observer: Box<dyn Fn()>) -> Subscription;

    /// Push the current value back through this binding, re-running every
    /// validator on the way down.
    fn revalidate(&self) {
        self.push(self.peek());
    }
}

/// Shared handle to a type-erased binding.
pub type BindingRef<T> = Rc<dyn Binding<T>>;

/// Subscribe `this` to `inner`, calling `react` on every change while `this`
/// is alive.
pub(crate) fn watch<S: Value, D: 'static>(
    inner: &dyn Binding<S>,
    this: &Weak<D>,
    react: fn(&D),
) -> Subscription {
    let this = this.clone();
    inner.subscribe(Box::new(move || {
        if let Some(this) = this.upgrade() {
            react(&this);
        }
    }))
}

// ---------------------------------------------------------------------------
// BufferCell
// ---------------------------------------------------------------------------

/// Lazily initialized envelope cell with its own change channel.
///
/// Nothing is read from below until the first `get_or_init`. If the cell is
/// written re-entrantly while the initializer runs, the written value wins.
pub(crate) struct BufferCell<T> {
    slot: RefCell<Option<BindingValue<T>>>,
    changed: Notifier,
}

impl<T: Value> BufferCell<T> {
    pub(crate) fn new() -> Self {
        Self {
            slot: RefCell::new(None),
            changed: Notifier::new(),
        }
    }

    pub(crate) fn get_or_init(&self, init: impl FnOnce() -> BindingValue<T>) -> BindingValue<T> {
        if let Some(value) = self.slot.borrow().as_ref() {
            return value.clone();
        }
        let initial = init();
        self.slot.borrow_mut().get_or_insert(initial).clone()
    }

    pub(crate) fn get(&self) -> Option<BindingValue<T>> {
        self.slot.borrow().clone()
    }

    /// Store `value`, notifying observers if it differs from what was there.
    pub(crate) fn set(&self, value: BindingValue<T>) {
        let changed = {
            let mut slot = self.slot.borrow_mut();
            if slot.as_ref() == Some(&value) {
                false
            } else {
                *slot = Some(value);
                true
            }
        };
        if changed {
            self.changed.notify();
        }
    }

    pub(crate) fn subscribe(&self, observer: Box<dyn Fn()>) -> Subscription {
        self.changed.subscribe(observer)
    }
}

// ---------------------------------------------------------------------------
// Buffered
// ---------------------------------------------------------------------------

/// The part every buffering decorator shares: one inner binding, a lazy cell
/// showing the decorator's envelope, and the subscription that routes inner
/// changes back to the decorator.
pub(crate) struct Buffered<T: Value> {
    inner: BindingRef<T>,
    cell: BufferCell<T>,
    _subscription: Subscription,
}

impl<T: Value> Buffered<T> {
    /// Wrap `inner`, calling `react` on the owning decorator whenever `inner`
    /// changes.
    pub(crate) fn new<D: 'static>(inner: BindingRef<T>, this: &Weak<D>, react: fn(&D)) -> Self {
        Self {
            _subscription: watch(&*inner, this, react),
            inner,
            cell: BufferCell::new(),
        }
    }

    pub(crate) fn inner(&self) -> &dyn Binding<T> {
        &*self.inner
    }

    pub(crate) fn cell(&self) -> &BufferCell<T> {
        &self.cell
    }

    /// The cell's envelope, read from below on first use.
    pub(crate) fn peek(&self) -> BindingValue<T> {
        self.cell.get_or_init(|| self.inner.peek())
    }

    pub(crate) fn set(&self, value: BindingValue<T>) {
        self.cell.set(value);
    }

    /// Take the inner binding's envelope as is.
    pub(crate) fn sync(&self) {
        self.cell.set(self.inner.peek());
    }

    pub(crate) fn subscribe(&self, observer: Box<dyn Fn()>) -> Subscription {
        self.cell.subscribe(observer)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{BindingError, Severity};
    use std::cell::Cell;

    #[test]
    fn cell_initializes_once() {
        let cell = BufferCell::new();
        let calls = Cell::new(0);
        let init = || {
            calls.set(calls.get() + 1);
            BindingValue::new(1)
        };
        assert_eq!(cell.get_or_init(init), BindingValue::new(1));
        assert_eq!(cell.get_or_init(|| BindingValue::new(2)), BindingValue::new(1));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn cell_reentrant_write_wins_over_initial_read() {
        let cell = Rc::new(BufferCell::new());
        let cell_c = cell.clone();
        let value = cell.get_or_init(move || {
            cell_c.set(BindingValue::with_error(
                0,
                BindingError::new(Severity::Error, "written during init"),
            ));
            BindingValue::new(0)
        });
        assert_eq!(value.level(), Severity::Error);
    }

    struct Echo {
        core: Buffered<i32>,
    }

    impl Echo {
        fn new(inner: BindingRef<i32>) -> Rc<Self> {
            Rc::new_cyclic(|this: &Weak<Self>| Self {
                core: Buffered::new(inner, this, |echo: &Self| echo.core.sync()),
            })
        }
    }

    #[test]
    fn buffered_reads_lazily_and_follows_inner() {
        let probe = crate::testing::ProbeBinding::new(1);
        let echo = Echo::new(probe.clone());
        assert_eq!(probe.peek_count(), 0);

        assert_eq!(echo.core.peek(), BindingValue::new(1));
        echo.core.set(BindingValue::new(5));
        assert_eq!(echo.core.peek(), BindingValue::new(5));

        probe.set_external(BindingValue::new(7));
        assert_eq!(echo.core.peek(), BindingValue::new(7));
        assert_eq!(echo.core.inner().peek(), BindingValue::new(7));
    }

    #[test]
    fn cell_notifies_only_on_change() {
        let cell = BufferCell::new();
        let count = Rc::new(Cell::new(0));
        let count_c = count.clone();
        let _sub = cell.subscribe(Box::new(move || count_c.set(count_c.get() + 1)));

        cell.set(BindingValue::new("a"));
        cell.set(BindingValue::new("a"));
        cell.set(BindingValue::new("b"));
        assert_eq!(count.get(), 2);
        assert_eq!(cell.get(), Some(BindingValue::new("b")));
    }
}
