//! `Object` impl generation.
//!
//! Every exposed field becomes a match arm in `Object::attribute` that
//! converts the field through `ToValue`. Computed fields hand back a thunk
//! calling the named `&self` method, so the value is produced only when a
//! representation actually needs it.

use proc_macro2::TokenStream;
use quote::quote;

use crate::attrs::ObjectAttrs;

pub fn generate_object_impl(attrs: &ObjectAttrs, runtime: &syn::Path) -> syn::Result<TokenStream> {
    let ident = &attrs.ident;
    let qualname = attrs.class_qualname();

    let class = match &attrs.module {
        Some(module) => quote! { #runtime::ClassRef::new(#module, #qualname) },
        None => quote! {
            #runtime::ClassRef::from_module_path(::core::module_path!(), #qualname)
        },
    };

    let mut arms = Vec::new();
    for field in attrs.exposed_fields() {
        let name = field.name();
        let Some(member) = &field.ident else {
            continue;
        };
        arms.push(quote! {
            #name => ::core::option::Option::Some(#runtime::Field::Value(
                #runtime::ToValue::to_value(&self.#member),
            )),
        });
    }
    for computed in &attrs.computed {
        let name = &computed.name;
        let method = computed.method_ident()?;
        arms.push(quote! {
            #name => ::core::option::Option::Some(#runtime::Field::computed(
                move || #runtime::ToValue::to_value(&self.#method()),
            )),
        });
    }

    let mut generics = attrs.generics.clone();
    if generics.type_params().next().is_some() {
        let where_clause = generics.make_where_clause();
        for field in attrs.exposed_fields() {
            let ty = &field.ty;
            where_clause
                .predicates
                .push(syn::parse_quote!(#ty: #runtime::ToValue));
        }
    }
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics #runtime::Object for #ident #ty_generics #where_clause {
            fn class(&self) -> #runtime::ClassRef {
                #class
            }

            fn attribute(
                &self,
                name: &str,
            ) -> ::core::option::Option<#runtime::Field<'_>> {
                match name {
                    #(#arms)*
                    _ => ::core::option::Option::None,
                }
            }
        }
    })
}
