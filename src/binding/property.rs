//! Terminal bindings: model properties and constants.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use tracing::trace;

use super::Binding;
use crate::reactive::{Field, Model, Notifier, Subscription};
use crate::value::{BindingValue, Value};

// ---------------------------------------------------------------------------
// PropertyBinding
// ---------------------------------------------------------------------------

/// Reads and writes one field of a model object.
///
/// `push` writes unconditionally and ignores the envelope's error; filtering
/// is the job of the decorators above. The binding announces a change
/// whenever the field's value differs from the last value it saw, whichever
/// path the write took.
pub struct PropertyBinding<M: 'static, T: Value> {
    model: Model<M>,
    field: Field<M, T>,
    seen: RefCell<T>,
    changed: Notifier,
    _model_subscription: Subscription,
}

impl<M: 'static, T: Value> PropertyBinding<M, T> {
    pub fn new(model: Model<M>, field: Field<M, T>) -> Rc<Self> {
        Rc::new_cyclic(|this: &Weak<Self>| {
            let this = this.clone();
            let subscription = model.subscribe(move || {
                if let Some(this) = this.upgrade() {
                    this.model_changed();
                }
            });
            Self {
                seen: RefCell::new(model.read(&field)),
                model,
                field,
                changed: Notifier::new(),
                _model_subscription: subscription,
            }
        })
    }

    /// Name of the bound field.
    pub fn field_name(&self) -> &'static str {
        self.field.name()
    }

    fn model_changed(&self) {
        let current = self.model.read(&self.field);
        let changed = {
            let mut seen = self.seen.borrow_mut();
            if *seen == current {
                false
            } else {
                *seen = current;
                true
            }
        };
        if changed {
            self.changed.notify();
        }
    }
}

impl<M: 'static, T: Value> Binding<T> for PropertyBinding<M, T> {
    fn push(&self, value: BindingValue<T>) {
        trace!(field = self.field.name(), value = ?value.value, "commit");
        self.model.write(&self.field, value.value);
    }

    fn peek(&self) -> BindingValue<T> {
        BindingValue::new(self.model.read(&self.field))
    }

    fn subscribe(&self, observer: Box<dyn Fn()>) -> Subscription {
        self.changed.subscribe(observer)
    }
}

// ---------------------------------------------------------------------------
// TrivialBinding
// ---------------------------------------------------------------------------

/// A constant source. Pushes are ignored and it never changes.
pub struct TrivialBinding<T> {
    value: BindingValue<T>,
}

impl<T: Value> TrivialBinding<T> {
    pub fn new(value: BindingValue<T>) -> Rc<Self> {
        Rc::new(Self { value })
    }
}

impl<T: Value> Binding<T> for TrivialBinding<T> {
    fn push(&self, _value: BindingValue<T>) {}

    fn peek(&self) -> BindingValue<T> {
        self.value.clone()
    }

    fn subscribe(&self, _observer: Box<dyn Fn()>) -> Subscription {
        Subscription::empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field;
    use crate::value::{BindingError, Severity};
    use pretty_assertions::assert_eq;
    use std::cell::Cell;

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Form {
        name: String,
        other: u32,
    }

    fn counter(binding: &dyn Binding<String>) -> (Rc<Cell<u32>>, Subscription) {
        let count = Rc::new(Cell::new(0));
        let count_c = count.clone();
        let sub = binding.subscribe(Box::new(move || count_c.set(count_c.get() + 1)));
        (count, sub)
    }

    #[test]
    fn push_writes_field_ignoring_error() {
        let model = Model::new(Form::default());
        let binding = PropertyBinding::new(model.clone(), field!(Form, name));
        binding.push(BindingValue::with_error(
            "x".to_owned(),
            BindingError::new(Severity::Error, "ignored"),
        ));
        assert_eq!(model.get().name, "x");
        assert_eq!(binding.peek(), BindingValue::new("x".to_owned()));
    }

    #[test]
    fn external_write_notifies() {
        let model = Model::new(Form::default());
        let binding = PropertyBinding::new(model.clone(), field!(Form, name));
        let (count, _sub) = counter(&*binding);

        model.update(|f| f.name = "changed".into());
        assert_eq!(count.get(), 1);
        assert_eq!(binding.peek().value, "changed");
    }

    #[test]
    fn unrelated_field_does_not_notify() {
        let model = Model::new(Form::default());
        let binding = PropertyBinding::new(model.clone(), field!(Form, name));
        let (count, _sub) = counter(&*binding);

        model.update(|f| f.other = 9);
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn same_value_push_does_not_notify() {
        let model = Model::new(Form {
            name: "same".into(),
            other: 0,
        });
        let binding = PropertyBinding::new(model, field!(Form, name));
        let (count, _sub) = counter(&*binding);
        binding.push(BindingValue::new("same".to_owned()));
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn dropping_binding_detaches_from_model() {
        let model = Model::new(Form::default());
        let binding = PropertyBinding::new(model.clone(), field!(Form, name));
        drop(binding);
        model.update(|f| f.name = "after".into()); // must not panic
        assert_eq!(model.get().name, "after");
    }

    #[test]
    fn trivial_ignores_pushes() {
        let trivial = TrivialBinding::new(BindingValue::new(5));
        trivial.push(BindingValue::new(6));
        assert_eq!(trivial.peek(), BindingValue::new(5));
    }
}
