//! Derive macro implementing `reprit::Object` for named structs.
//!
//! The generated impl reports the struct's class (its module path and name,
//! overridable) and looks fields up by name, converting them with
//! `reprit::ToValue`.
//!
//! # Container Attributes
//!
//! - `#[reprit(module = "...")]` - Dotted module path (default: `module_path!()`)
//! - `#[reprit(qualname = "...")]` - Qualified class name (default: struct name)
//! - `#[reprit(computed(name = "...", method = "..."))]` - Expose a `&self`
//!   method as a computed field; repeatable
//!
//! # Field Attributes
//!
//! - `#[reprit(rename = "...")]` - Look the field up under another name
//! - `#[reprit(skip)]` - Hide the field from lookup

use darling::FromDeriveInput;
use proc_macro::TokenStream;
use syn::parse_macro_input;

mod attrs;
mod generators;
mod runtime_path;

/// Derives `reprit::Object`.
///
/// # Example
///
/// ```ignore
/// #[derive(Object)]
/// #[reprit(module = "bank")]
/// pub struct Account {
///     #[reprit(rename = "id")]
///     identifier: u64,
///     balance: i64,
/// }
/// ```
#[proc_macro_derive(Object, attributes(reprit))]
pub fn derive_object(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as syn::DeriveInput);

    match expand_derive_object(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand_derive_object(input: &syn::DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let attrs = attrs::ObjectAttrs::from_derive_input(input)
        .map_err(|e| syn::Error::new_spanned(input, e.to_string()))?;

    let validation_errors = attrs.validate();
    if !validation_errors.is_empty() {
        return Err(syn::Error::new_spanned(input, validation_errors.join("; ")));
    }

    let runtime = runtime_path::resolve_reprit_path()?;
    generators::generate_object_impl(&attrs, &runtime)
}
