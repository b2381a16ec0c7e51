//! Change propagation: notifiers, subscriptions, observable models.
//!
//! Bindings do not rely on an ambient dependency-tracking runtime. Each
//! decorator explicitly subscribes to its inner binding's change channel when
//! it is built, and every model write notifies synchronously.
//!
//! - [`Notifier`]: a publish/subscribe list of observers.
//! - [`Subscription`]: RAII handle; dropping it unsubscribes.
//! - [`Model`]: a shared model object that notifies on every write.
//! - [`Field`]: a named accessor into a model type (see [`field!`](crate::field)).

pub mod model;
pub mod notifier;

pub use model::{Field, Model};
pub use notifier::{Notifier, Observable, ObserverId, Subscription};
