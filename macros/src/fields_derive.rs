//! `#[derive(Fields)]`: parse a struct and generate lens constants.

use proc_macro2::{Span, TokenStream};
use quote::quote;
use syn::{Data, DeriveInput, Error, Fields, Ident, Result, Type, Visibility};

// ---------------------------------------------------------------------------
// Field selection
// ---------------------------------------------------------------------------

/// A struct field that gets a lens.
pub(crate) struct LensField {
    pub ident: Ident,
    pub ty: Type,
    pub vis: Visibility,
}

impl LensField {
    /// `SCREAMING_CASE` name of the generated constant.
    pub(crate) fn const_name(&self) -> Ident {
        let name = self.ident.to_string();
        let name = name.strip_prefix("r#").unwrap_or(&name);
        Ident::new(&name.to_uppercase(), self.ident.span())
    }
}

/// Whether a field carries `#[fields(skip)]`.
fn is_skipped(field: &syn::Field) -> Result<bool> {
    let mut skip = false;
    for attr in field.attrs.iter().filter(|a| a.path().is_ident("fields")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                skip = true;
                Ok(())
            } else {
                Err(meta.error("unknown fields attribute, expected `skip`"))
            }
        })?;
    }
    Ok(skip)
}

/// Validate the input shape and collect the fields to generate lenses for.
pub(crate) fn lens_fields(input: &DeriveInput) -> Result<Vec<LensField>> {
    if !input.generics.params.is_empty() {
        return Err(Error::new_spanned(
            &input.generics,
            "derive(Fields) does not support generic structs",
        ));
    }
    let Data::Struct(data) = &input.data else {
        return Err(Error::new(
            Span::call_site(),
            "derive(Fields) only supports structs",
        ));
    };
    let Fields::Named(named) = &data.fields else {
        return Err(Error::new_spanned(
            &input.ident,
            "derive(Fields) requires named fields",
        ));
    };

    let mut lenses = Vec::new();
    for field in &named.named {
        if is_skipped(field)? {
            continue;
        }
        if let Some(ident) = &field.ident {
            lenses.push(LensField {
                ident: ident.clone(),
                ty: field.ty.clone(),
                vis: field.vis.clone(),
            });
        }
    }
    Ok(lenses)
}

// ---------------------------------------------------------------------------
// Code generation
// ---------------------------------------------------------------------------

fn generate_const(model: &Ident, lens: &LensField) -> TokenStream {
    let LensField { ident, ty, vis } = lens;
    let const_name = lens.const_name();
    let name = ident.to_string();
    let name = name.strip_prefix("r#").unwrap_or(&name).to_owned();
    quote! {
        #vis const #const_name: ::brazen_bindings::reactive::Field<#model, #ty> =
            ::brazen_bindings::reactive::Field::new(
                #name,
                |m: &#model| ::core::clone::Clone::clone(&m.#ident),
                |m: &mut #model, v: #ty| m.#ident = v,
            );
    }
}

/// Entry point: generate the inherent impl holding every lens constant.
pub(crate) fn fields_impl(input: TokenStream) -> Result<TokenStream> {
    let parsed: DeriveInput = syn::parse2(input)?;
    let lenses = lens_fields(&parsed)?;
    let model = &parsed.ident;
    let consts: Vec<TokenStream> = lenses.iter().map(|l| generate_const(model, l)).collect();

    Ok(quote! {
        #[automatically_derived]
        impl #model {
            #(#consts)*
        }
    })
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use quote::quote;

    fn parse(tokens: TokenStream) -> DeriveInput {
        syn::parse2(tokens).unwrap()
    }

    // ── Parsing ──────────────────────────────────────────────────────

    #[test]
    fn collects_named_fields() {
        let input = parse(quote! {
            struct Person { name: String, pub age: f64 }
        });
        let lenses = lens_fields(&input).unwrap();
        assert_eq!(lenses.len(), 2);
        assert_eq!(lenses[0].ident.to_string(), "name");
        assert_eq!(lenses[1].const_name().to_string(), "AGE");
    }

    #[test]
    fn skip_attribute_omits_field() {
        let input = parse(quote! {
            struct Person {
                name: String,
                #[fields(skip)]
                cache: Vec<u8>,
            }
        });
        let lenses = lens_fields(&input).unwrap();
        assert_eq!(lenses.len(), 1);
        assert_eq!(lenses[0].ident.to_string(), "name");
    }

    #[test]
    fn unknown_attribute_is_an_error() {
        let input = parse(quote! {
            struct Person { #[fields(rename = "x")] name: String }
        });
        let err = lens_fields(&input).err().unwrap().to_string();
        assert!(err.contains("expected `skip`"));
    }

    #[test]
    fn raw_identifier_const_name() {
        let input = parse(quote! { struct Item { r#type: String } });
        let lenses = lens_fields(&input).unwrap();
        assert_eq!(lenses[0].const_name().to_string(), "TYPE");
    }

    #[test]
    fn rejects_generic_struct() {
        let input = parse(quote! { struct Wrapper<T> { inner: T } });
        let err = lens_fields(&input).err().unwrap().to_string();
        assert!(err.contains("generic"));
    }

    #[test]
    fn rejects_tuple_struct() {
        let input = parse(quote! { struct Pair(u32, u32); });
        assert!(lens_fields(&input).is_err());
    }

    #[test]
    fn rejects_enum() {
        let input = parse(quote! { enum Choice { A, B } });
        let err = lens_fields(&input).err().unwrap().to_string();
        assert!(err.contains("only supports structs"));
    }

    // ── Codegen ──────────────────────────────────────────────────────

    #[test]
    fn codegen_const_per_field() {
        let code = fields_impl(quote! {
            struct Person { name: String, pub(crate) age: f64 }
        })
        .unwrap()
        .to_string();
        assert!(code.contains("impl Person"));
        assert!(code.contains("const NAME"));
        assert!(code.contains("pub (crate) const AGE"));
        assert!(code.contains("\"age\""));
        assert!(code.contains("Field < Person , f64 >"));
    }

    #[test]
    fn codegen_empty_struct() {
        let code = fields_impl(quote! { struct Empty {} }).unwrap().to_string();
        assert!(code.contains("impl Empty"));
        assert!(!code.contains("const"));
    }
}
