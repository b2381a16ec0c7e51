//! Representation boundary between an outer and an inner value type.

use std::rc::{Rc, Weak};

use tracing::trace;

use super::{watch, Binding, BindingRef, BufferCell};
use crate::convert::Converter;
use crate::reactive::Subscription;
use crate::value::{BindingError, BindingValue, Severity, Value};

/// Exposes a `Binding<T>` as a `Binding<S>` through a [`Converter<S, T>`].
///
/// A value that fails to convert is never forwarded. The raw input stays in
/// the cell with the conversion error so the user keeps seeing what was
/// typed. A successful push shows the raw input until the inner binding
/// announces a change, which replaces the cell with the converted-back
/// inner value.
pub struct ConversionBinding<S: Value, T: Value> {
    inner: BindingRef<T>,
    cell: BufferCell<S>,
    converter: Box<dyn Converter<S, T>>,
    level: Severity,
    _subscription: Subscription,
}

impl<S: Value, T: Value> ConversionBinding<S, T> {
    pub fn new(
        inner: BindingRef<T>,
        converter: impl Converter<S, T> + 'static,
        level: Severity,
    ) -> Rc<Self> {
        Rc::new_cyclic(|this: &Weak<Self>| Self {
            _subscription: watch(&*inner, this, Self::refresh),
            inner,
            cell: BufferCell::new(),
            converter: Box::new(converter),
            level,
        })
    }

    fn outer(&self, value: BindingValue<T>) -> BindingValue<S> {
        let BindingValue { value, error } = value;
        BindingValue {
            value: self.converter.convert_back(&value),
            error,
        }
    }

    fn refresh(&self) {
        self.cell.set(self.outer(self.inner.peek()));
    }
}

impl<S: Value, T: Value> Binding<S> for ConversionBinding<S, T> {
    fn push(&self, value: BindingValue<S>) {
        match self.converter.convert(&value.value) {
            Ok(converted) => {
                self.cell.set(value.clone());
                self.inner.push(BindingValue {
                    value: converted,
                    error: value.error,
                });
            }
            Err(err) => {
                trace!(raw = ?value.value, %err, "conversion failed");
                let error = BindingError::merge(
                    value.error,
                    BindingError::new(self.level, err.message),
                );
                self.cell.set(BindingValue::with_error(value.value, error));
            }
        }
    }

    fn peek(&self) -> BindingValue<S> {
        self.cell.get_or_init(|| self.outer(self.inner.peek()))
    }

    fn on_focus(&self) {
        self.inner.on_focus();
    }

    fn on_blur(&self) {
        self.inner.on_blur();
    }

    fn subscribe(&self, observer: Box<dyn Fn()>) -> Subscription {
        self.cell.subscribe(observer)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
