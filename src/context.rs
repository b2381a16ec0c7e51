//! Binding contexts: registration, error aggregation, and seek.
//!
//! A [`BindingContext`] holds the bindings of one form section. Contexts form
//! a tree through [`declare_parent`](BindingContext::declare_parent); every
//! aggregate (maximum severity, validity, the validate-all sweep) covers a
//! context's own bindings followed by those of its descendants.
//!
//! [`seek`](BindingContext::seek) picks the first binding at the worst
//! severity and sends a [`SeekEvent`] to the context owning it. The event
//! bubbles from there toward the root until a handler marks it handled,
//! typically after bringing the offending section into view.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use futures::future::join_all;
use slotmap::{new_key_type, SlotMap};
use tracing::{debug, warn};

use crate::binding::BindingRef;
use crate::error::ContextError;
use crate::value::{BindingError, Severity, Value};

// ---------------------------------------------------------------------------
// SeekEvent
// ---------------------------------------------------------------------------

/// Delivered to seek handlers, innermost context first.
#[derive(Debug, Clone)]
pub struct SeekEvent {
    /// The error that made the context the seek target.
    pub error: BindingError,
    /// Whether a handler has taken care of it (stops propagation).
    pub handled: bool,
}

impl SeekEvent {
    fn new(error: BindingError) -> Self {
        Self {
            error,
            handled: false,
        }
    }

    /// Mark this event as handled, stopping further propagation.
    pub fn mark_handled(&mut self) {
        self.handled = true;
    }
}

type SeekHandler = Rc<dyn Fn(&mut SeekEvent)>;

// ---------------------------------------------------------------------------
// Registered bindings
// ---------------------------------------------------------------------------

/// The type-independent view a context needs of a binding.
trait Registered {
    fn error(&self) -> Option<BindingError>;
    fn sweep(&self);
}

impl<T: Value> Registered for BindingRef<T> {
    fn error(&self) -> Option<BindingError> {
        self.peek().error
    }

    /// Re-push the current value and blur, so validators run and deferred
    /// values commit.
    fn sweep(&self) {
        self.revalidate();
        self.on_blur();
    }
}

new_key_type! {
    /// Identifies one registration inside a context. Keys are versioned, so a
    /// stale [`Registration`] never matches a later entry.
    struct RegistrationId;
}

struct Entry {
    /// Address of the registered binding. The entry holds the binding, so the
    /// address cannot be reused while the entry exists.
    address: *const (),
    binding: Rc<dyn Registered>,
}

fn address_of<T: Value>(binding: &BindingRef<T>) -> *const () {
    Rc::as_ptr(binding).cast::<()>()
}

/// Registered bindings in registration order.
#[derive(Default)]
struct Entries {
    slots: SlotMap<RegistrationId, Entry>,
    order: Vec<RegistrationId>,
}

impl Entries {
    fn find(&self, address: *const ()) -> Option<RegistrationId> {
        self.iter_ids().find(|(_, e)| e.address == address).map(|(id, _)| id)
    }

    fn insert(&mut self, entry: Entry) -> RegistrationId {
        let id = self.slots.insert(entry);
        self.order.push(id);
        id
    }

    fn remove(&mut self, id: RegistrationId) -> Result<(), ContextError> {
        self.slots.remove(id).ok_or(ContextError::NotRegistered)?;
        self.order.retain(|k| *k != id);
        Ok(())
    }

    fn len(&self) -> usize {
        self.slots.len()
    }

    fn iter_ids(&self) -> impl Iterator<Item = (RegistrationId, &Entry)> + '_ {
        self.order
            .iter()
            .filter_map(|id| self.slots.get(*id).map(|entry| (*id, entry)))
    }

    fn iter(&self) -> impl Iterator<Item = &Entry> + '_ {
        self.iter_ids().map(|(_, entry)| entry)
    }
}

// ---------------------------------------------------------------------------
// BindingContext
// ---------------------------------------------------------------------------

#[derive(Default)]
struct ContextInner {
    on_seek: RefCell<Option<SeekHandler>>,
    parent: RefCell<Weak<ContextInner>>,
    children: RefCell<Vec<BindingContext>>,
    entries: RefCell<Entries>,
}

impl ContextInner {
    fn insert<T: Value>(&self, binding: &BindingRef<T>) -> Result<RegistrationId, ContextError> {
        let address = address_of(binding);
        let mut entries = self.entries.borrow_mut();
        if entries.find(address).is_some() {
            return Err(ContextError::AlreadyRegistered);
        }
        let id = entries.insert(Entry {
            address,
            binding: Rc::new(binding.clone()),
        });
        debug!(count = entries.len(), "binding registered");
        Ok(id)
    }

    fn remove(&self, id: RegistrationId) -> Result<(), ContextError> {
        self.entries.borrow_mut().remove(id)
    }
}

/// A set of open bindings, optionally nested in a parent context.
///
/// Cheap to clone; clones share state.
#[derive(Clone, Default)]
pub struct BindingContext {
    inner: Rc<ContextInner>,
}

impl BindingContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the seek handler (builder).
    pub fn with_seek_handler(self, handler: impl Fn(&mut SeekEvent) + 'static) -> Self {
        self.set_seek_handler(handler);
        self
    }

    /// Replace the seek handler.
    pub fn set_seek_handler(&self, handler: impl Fn(&mut SeekEvent) + 'static) {
        *self.inner.on_seek.borrow_mut() = Some(Rc::new(handler));
    }

    /// Whether both handles refer to the same context.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    // -- Registration -------------------------------------------------------

    /// Add `binding` to this context.
    pub fn register<T: Value>(&self, binding: &BindingRef<T>) -> Result<(), ContextError> {
        self.inner.insert(binding).map(|_| ())
    }

    /// Remove `binding` from this context.
    pub fn unregister<T: Value>(&self, binding: &BindingRef<T>) -> Result<(), ContextError> {
        let id = self
            .inner
            .entries
            .borrow()
            .find(address_of(binding))
            .ok_or(ContextError::NotRegistered)?;
        self.inner.remove(id)?;
        debug!(count = self.len(), "binding unregistered");
        Ok(())
    }

    /// Register `binding` for as long as the returned guard lives.
    pub fn open<T: Value>(&self, binding: &BindingRef<T>) -> Result<Registration, ContextError> {
        let id = self.inner.insert(binding)?;
        Ok(Registration {
            context: Rc::downgrade(&self.inner),
            id,
            closed: false,
        })
    }

    /// Number of bindings registered directly in this context.
    pub fn len(&self) -> usize {
        self.inner.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // -- Tree ---------------------------------------------------------------

    /// Make `parent` this context's parent.
    pub fn declare_parent(&self, parent: &BindingContext) -> Result<(), ContextError> {
        if self.parent().is_some() {
            return Err(ContextError::AlreadyHasParent);
        }
        if parent.ancestry().iter().any(|c| c.ptr_eq(self)) {
            return Err(ContextError::Cycle);
        }
        *self.inner.parent.borrow_mut() = Rc::downgrade(&parent.inner);
        parent.inner.children.borrow_mut().push(self.clone());
        debug!(children = parent.inner.children.borrow().len(), "context parent declared");
        Ok(())
    }

    /// Detach this context from `parent`.
    pub fn undeclare_parent(&self, parent: &BindingContext) -> Result<(), ContextError> {
        match self.parent() {
            Some(current) if current.ptr_eq(parent) => {}
            _ => return Err(ContextError::WrongParent),
        }
        parent.inner.children.borrow_mut().retain(|c| !c.ptr_eq(self));
        *self.inner.parent.borrow_mut() = Weak::new();
        debug!("context parent undeclared");
        Ok(())
    }

    /// The parent context, if one is declared and still alive.
    pub fn parent(&self) -> Option<BindingContext> {
        self.inner
            .parent
            .borrow()
            .upgrade()
            .map(|inner| BindingContext { inner })
    }

    /// This context followed by its ancestors up to the root.
    fn ancestry(&self) -> Vec<BindingContext> {
        let mut path = vec![self.clone()];
        let mut current = self.parent();
        while let Some(context) = current {
            current = context.parent();
            path.push(context);
        }
        path
    }

    /// Own bindings first, then each child's, depth first.
    fn all_bindings(&self) -> Vec<(BindingContext, Rc<dyn Registered>)> {
        let mut all: Vec<_> = self
            .inner
            .entries
            .borrow()
            .iter()
            .map(|e| (self.clone(), e.binding.clone()))
            .collect();
        let children = self.inner.children.borrow().clone();
        for child in children {
            all.extend(child.all_bindings());
        }
        all
    }

    // -- Aggregation --------------------------------------------------------

    /// Worst severity over this context and its descendants, `None` if empty.
    pub fn max_error_level(&self) -> Severity {
        self.all_bindings()
            .iter()
            .filter_map(|(_, b)| b.error())
            .map(|e| e.level)
            .max()
            .unwrap_or(Severity::None)
    }

    /// Every error at the worst severity, with the context owning its binding.
    pub fn max_error_level_bindings(&self) -> Vec<(BindingContext, BindingError)> {
        let errors: Vec<_> = self
            .all_bindings()
            .into_iter()
            .filter_map(|(context, b)| b.error().map(|e| (context, e)))
            .collect();
        let Some(level) = errors.iter().map(|(_, e)| e.level).max() else {
            return Vec::new();
        };
        errors.into_iter().filter(|(_, e)| e.level == level).collect()
    }

    /// No binding reports `Error` or worse.
    pub fn is_valid(&self) -> bool {
        !self.max_error_level().is_blocking()
    }

    /// Push every binding's current value back through it, blur it, and wait
    /// for the asynchronous validations this started. Returns the resulting
    /// validity.
    pub async fn validate_all(&self) -> bool {
        let bindings = self.all_bindings();
        for (_, binding) in &bindings {
            binding.sweep();
        }

        let pending: Vec<_> = bindings
            .iter()
            .filter_map(|(_, b)| b.error().and_then(|e| e.pending))
            .collect();
        debug!(bindings = bindings.len(), pending = pending.len(), "validate all");
        join_all(pending).await;

        self.is_valid()
    }

    // -- Seek ---------------------------------------------------------------

    /// Send a [`SeekEvent`] for the worst error toward the handlers of its
    /// context and that context's ancestors. Returns whether a handler
    /// marked it handled; `false` when there is nothing to seek.
    pub fn seek(&self) -> bool {
        let Some((target, error)) = self.max_error_level_bindings().into_iter().next() else {
            return false;
        };
        if error.level == Severity::None || target.max_error_level() == Severity::None {
            return false;
        }

        let mut event = SeekEvent::new(error);
        for context in target.ancestry() {
            let handler = context.inner.on_seek.borrow().clone();
            if let Some(handler) = handler {
                handler(&mut event);
            }
            if event.handled {
                break;
            }
        }
        debug!(handled = event.handled, level = %event.error.level, "seek");
        event.handled
    }
}

impl fmt::Debug for BindingContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindingContext")
            .field("bindings", &self.len())
            .field("children", &self.inner.children.borrow().len())
            .field("has_parent", &self.parent().is_some())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

/// Keeps a binding registered in a context until closed or dropped.
#[must_use = "dropping a registration unregisters the binding immediately"]
pub struct Registration {
    context: Weak<ContextInner>,
    id: RegistrationId,
    closed: bool,
}

impl Registration {
    /// Unregister now, reporting a binding that was already removed.
    pub fn close(mut self) -> Result<(), ContextError> {
        self.closed = true;
        self.release()
    }

    fn release(&self) -> Result<(), ContextError> {
        match self.context.upgrade() {
            Some(context) => context.remove(self.id),
            None => Ok(()),
        }
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        if let Err(err) = self.release() {
            warn!(%err, "registration outlived its binding's entry");
        }
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("closed", &self.closed)
            .finish()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
