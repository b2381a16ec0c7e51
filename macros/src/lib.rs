//! Proc macros for brazen-bindings: `#[derive(Fields)]` model lenses.
//!
//! This crate is not meant to be used directly; enable the `macros` feature on `brazen-bindings`.

use proc_macro::TokenStream;

mod fields_derive;

/// Generate one `Field` lens constant per named field.
///
/// For every field `name: T` of a non-generic struct `Model`, adds
/// `Model::NAME: Field<Model, T>` with the field's visibility. Fields marked
/// `#[fields(skip)]` are left out. Field types must be `Clone`.
///
/// # Example
///
/// ```ignore
/// #[derive(Clone, Default, Fields)]
/// struct Person {
///     name: String,
///     age: f64,
///     #[fields(skip)]
///     cache: Vec<u8>,
/// }
///
/// let name = binder.bind(&model, Person::NAME).validate(NotEmpty).binding();
/// ```
#[proc_macro_derive(Fields, attributes(fields))]
pub fn derive_fields(input: TokenStream) -> TokenStream {
    fields_derive::fields_impl(input.into())
        .unwrap_or_else(|err| err.to_compile_error())
        .into()
}
