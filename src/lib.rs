//! # brazen-bindings
//!
//! Two-way data bindings with validation for form-style UIs.
//!
//! A binding chain sits between an editable UI value and a field of a model.
//! Each link in the chain adds one behavior (buffering, deferred commit,
//! sync and async validation, type conversion, throttling) and the chain as a
//! whole decides when a typed value reaches the model and which error the UI
//! should show meanwhile. Binding contexts collect the chains of a form,
//! aggregate their worst error, and help navigate to it.
//!
//! ## Core Systems
//!
//! - **[`value`]**: value envelopes, severities, pending-validation handles
//! - **[`binding`]**: the `Binding` contract and every decorator
//! - **[`builder`]**: fluent chain construction (`Binder`, `BindingBuilder`)
//! - **[`context`]**: registration, error aggregation, validate-all, seek
//! - **[`validate`]** / **[`convert`]**: validator and converter strategies
//! - **[`reactive`]**: explicit change notification, observable models, field lenses
//! - **[`schedule`]**: timers and local tasks for throttling and async validation
//! - **[`config`]**: binder-wide defaults
//! - **[`testing`]**: manual scheduler and probe binding for tests
//!
//! ## Example
//!
//! ```ignore
//! use brazen_bindings::prelude::*;
//!
//! #[derive(Debug, Clone, Default, PartialEq)]
//! struct Person { name: String }
//!
//! let model = Model::new(Person::default());
//! let binder = Binder::default();
//! let name = binder
//!     .bind(&model, field!(Person, name))
//!     .bar()
//!     .validate(NotEmpty)
//!     .binding();
//!
//! name.push("".to_owned().into());
//! assert!(model.get().name.is_empty());
//! assert_eq!(name.peek().level(), Severity::Error);
//! ```

// Foundation
pub mod config;
pub mod error;
pub mod value;

// Change notification
pub mod reactive;

// Collaborators
pub mod convert;
pub mod schedule;
pub mod validate;

// Chains and contexts
pub mod binding;
pub mod builder;
pub mod context;

// Test support
pub mod testing;

pub mod prelude {
    //! The types most chains need.
    pub use crate::binding::{Binding, BindingRef};
    pub use crate::builder::{Binder, BindingBuilder};
    pub use crate::config::BinderConfig;
    pub use crate::context::{BindingContext, Registration, SeekEvent};
    pub use crate::convert::{Converter, FloatConverter, ParseConverter};
    pub use crate::error::{ContextError, ConversionError, ValidationFailure};
    pub use crate::field;
    pub use crate::reactive::{Field, Model, Observable};
    pub use crate::schedule::{Scheduler, TokioScheduler};
    pub use crate::validate::{AsyncValidator, NotEmpty, Predicate, Validator};
    pub use crate::value::{BindingError, BindingValue, PendingValidation, Severity};
}

// Proc macros (feature-gated)
#[cfg(feature = "macros")]
pub use brazen_bindings_macros::Fields;
