use proc_macro_crate::{FoundCrate, crate_name};
use proc_macro2::Span;

/// Path that generated code uses to reach the runtime crate.
pub(crate) fn resolve_reprit_path() -> syn::Result<syn::Path> {
    let found = crate_name("reprit").map_err(|_| {
        syn::Error::new(
            Span::call_site(),
            "`#[derive(Object)]` needs `reprit` in [dependencies] (a renamed entry works too)",
        )
    })?;
    Ok(path_for(found))
}

fn path_for(found: FoundCrate) -> syn::Path {
    let name = match found {
        // reprit's own tests and doctests go through `extern crate self as reprit`
        FoundCrate::Itself => "reprit".to_owned(),
        FoundCrate::Name(name) => name.replace('-', "_"),
    };
    let ident = syn::Ident::new(&name, Span::call_site());
    syn::parse_quote!(::#ident)
}
