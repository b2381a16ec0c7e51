//! Observable model objects and field lenses.
//!
//! A [`Model`] is a shared, mutable model object that announces every write.
//! A [`Field`] names one readable/writable component of a model type; it is
//! what a property binding reads and writes.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use super::notifier::{Notifier, Observable, Subscription};

// ---------------------------------------------------------------------------
// Model
// ---------------------------------------------------------------------------

struct ModelInner<M> {
    state: RefCell<M>,
    changed: Notifier,
}

/// Shared handle to an observable model object. `Clone` shares the object.
pub struct Model<M> {
    inner: Rc<ModelInner<M>>,
}

impl<M> Clone for Model<M> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<M: 'static> Model<M> {
    /// Wrap a model object.
    pub fn new(model: M) -> Self {
        Self {
            inner: Rc::new(ModelInner {
                state: RefCell::new(model),
                changed: Notifier::new(),
            }),
        }
    }

    /// Read the model by reference.
    pub fn with<R>(&self, f: impl FnOnce(&M) -> R) -> R {
        f(&self.inner.state.borrow())
    }

    /// Clone the whole model out.
    pub fn get(&self) -> M
    where
        M: Clone,
    {
        self.inner.state.borrow().clone()
    }

    /// Mutate the model in place and notify observers.
    pub fn update(&self, f: impl FnOnce(&mut M)) {
        {
            let mut state = self.inner.state.borrow_mut();
            f(&mut state);
        }
        self.inner.changed.notify();
    }

    /// Replace the model and notify observers.
    pub fn set(&self, model: M) {
        self.update(|m| *m = model);
    }

    /// Read one field.
    pub fn read<T>(&self, field: &Field<M, T>) -> T {
        self.with(|m| field.get(m))
    }

    /// Write one field and notify observers.
    pub fn write<T>(&self, field: &Field<M, T>, value: T) {
        self.update(|m| field.set(m, value));
    }

    /// Register a change observer (called after every write).
    pub fn subscribe(&self, observer: impl Fn() + 'static) -> Subscription {
        self.inner.changed.subscribe(observer)
    }
}

impl<M: 'static> Observable for Model<M> {
    fn observe(&self, observer: Box<dyn Fn()>) -> Subscription {
        self.inner.changed.subscribe(observer)
    }
}

impl<M: fmt::Debug> fmt::Debug for Model<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("state", &self.inner.state.borrow())
            .field("observers", &self.inner.changed.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Field
// ---------------------------------------------------------------------------

/// A named accessor for one component of a model type.
///
/// Usually built with the [`field!`](crate::field) macro or, with the `macros`
/// feature, `#[derive(Fields)]`.
pub struct Field<M, T> {
    name: &'static str,
    get: fn(&M) -> T,
    set: fn(&mut M, T),
}

impl<M, T> Field<M, T> {
    /// Build a field from a name and accessor pair.
    pub const fn new(name: &'static str, get: fn(&M) -> T, set: fn(&mut M, T)) -> Self {
        Self { name, get, set }
    }

    /// The field's name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Read the field from a model.
    pub fn get(&self, model: &M) -> T {
        (self.get)(model)
    }

    /// Write the field into a model.
    pub fn set(&self, model: &mut M, value: T) {
        (self.set)(model, value)
    }
}

impl<M, T> Clone for Field<M, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<M, T> Copy for Field<M, T> {}

impl<M, T> fmt::Debug for Field<M, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field").field("name", &self.name).finish()
    }
}

/// Build a [`Field`] for a named struct field.
///
/// ```ignore
/// struct Person { name: String }
/// let name = field!(Person, name);
/// ```
#[macro_export]
macro_rules! field {
    ($model:ty, $name:ident) => {
        $crate::reactive::Field::<$model, _>::new(
            stringify!($name),
            |m: &$model| ::std::clone::Clone::clone(&m.$name),
            |m: &mut $model, v| m.$name = v,
        )
    };
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Person {
        name: String,
        age: f64,
    }

    #[test]
    fn field_reads_and_writes() {
        let name = field!(Person, name);
        let mut p = Person::default();
        name.set(&mut p, "ada".into());
        assert_eq!(name.get(&p), "ada");
        assert_eq!(name.name(), "name");
    }

    #[test]
    fn model_write_notifies() {
        let model = Model::new(Person::default());
        let count = Rc::new(Cell::new(0));
        let count_c = count.clone();
        let _sub = model.subscribe(move || count_c.set(count_c.get() + 1));

        model.write(&field!(Person, age), 36.0);
        assert_eq!(count.get(), 1);
        assert_eq!(model.read(&field!(Person, age)), 36.0);

        model.update(|p| p.name.push('x'));
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn observers_can_read_during_notify() {
        let model = Model::new(Person::default());
        let seen = Rc::new(RefCell::new(String::new()));
        let m = model.clone();
        let seen_c = seen.clone();
        let _sub = model.subscribe(move || *seen_c.borrow_mut() = m.with(|p| p.name.clone()));

        model.set(Person {
            name: "grace".into(),
            age: 0.0,
        });
        assert_eq!(*seen.borrow(), "grace");
    }

    #[test]
    fn clones_share_state() {
        let a = Model::new(Person::default());
        let b = a.clone();
        b.write(&field!(Person, name), "linus".into());
        assert_eq!(a.get().name, "linus");
    }
}
