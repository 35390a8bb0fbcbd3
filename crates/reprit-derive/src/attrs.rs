//! Attribute parsing for `#[derive(Object)]` using darling.

use std::collections::HashSet;

use darling::{FromDeriveInput, FromField, FromMeta};
use syn::ext::IdentExt;
use syn::{Ident, Type};

/// A `&self` method exposed as a computed field.
///
/// ```ignore
/// #[derive(Object)]
/// #[reprit(computed(name = "area", method = "compute_area"))]
/// pub struct Square {
///     side: f64,
/// }
/// ```
#[derive(Debug, Clone, FromMeta)]
pub struct ComputedAttrs {
    /// Field name the seeker looks up.
    pub name: String,
    /// Method to call; defaults to `name`.
    #[darling(default)]
    pub method: Option<String>,
}

impl ComputedAttrs {
    pub fn method_ident(&self) -> syn::Result<Ident> {
        let method = self.method.as_deref().unwrap_or(&self.name);
        syn::parse_str::<Ident>(method).map_err(|_| {
            syn::Error::new(
                proc_macro2::Span::call_site(),
                format!("computed field `{}`: `{method}` is not a method name", self.name),
            )
        })
    }
}

/// Container-level attributes for `#[derive(Object)]`.
#[derive(Debug, FromDeriveInput)]
#[darling(attributes(reprit), supports(struct_named))]
pub struct ObjectAttrs {
    pub ident: Ident,
    pub generics: syn::Generics,
    pub data: darling::ast::Data<(), ObjectFieldAttrs>,

    /// Dotted module path reported by `Object::class`; defaults to `module_path!()`.
    #[darling(default)]
    pub module: Option<String>,

    /// Qualified class name; defaults to the struct name.
    #[darling(default)]
    pub qualname: Option<String>,

    #[darling(default, multiple)]
    pub computed: Vec<ComputedAttrs>,
}

#[derive(Debug, Clone, FromField)]
#[darling(attributes(reprit))]
pub struct ObjectFieldAttrs {
    pub ident: Option<Ident>,
    pub ty: Type,

    /// Storage name under which the seekers find this field.
    #[darling(default)]
    pub rename: Option<String>,

    /// Leave the field out of attribute lookup.
    #[darling(default)]
    pub skip: bool,
}

impl ObjectAttrs {
    pub fn class_qualname(&self) -> String {
        self.qualname
            .clone()
            .unwrap_or_else(|| self.ident.unraw().to_string())
    }

    pub fn fields(&self) -> impl Iterator<Item = &ObjectFieldAttrs> {
        match &self.data {
            darling::ast::Data::Struct(fields) => fields.iter(),
            _ => unreachable!("ObjectAttrs only supports named structs"),
        }
    }

    /// Fields visible to attribute lookup.
    pub fn exposed_fields(&self) -> impl Iterator<Item = &ObjectFieldAttrs> {
        self.fields().filter(|field| !field.skip)
    }

    /// Returns a list of validation errors, or an empty vec if valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let mut seen = HashSet::new();

        let field_names = self.exposed_fields().map(ObjectFieldAttrs::name);
        let computed_names = self.computed.iter().map(|computed| computed.name.clone());
        for name in field_names.chain(computed_names) {
            if name.is_empty() {
                errors.push(format!("empty field name in `{}`", self.ident));
            } else if !seen.insert(name.clone()) {
                errors.push(format!(
                    "field name `{name}` is exposed more than once in `{}`",
                    self.ident
                ));
            }
        }

        for field in self.fields() {
            if field.skip && field.rename.is_some() {
                errors.push(format!(
                    "field `{}`: `rename` has no effect on a skipped field",
                    field.ident_name()
                ));
            }
        }

        if self.qualname.as_deref() == Some("") {
            errors.push(format!("empty qualname for `{}`", self.ident));
        }

        errors
    }
}

impl ObjectFieldAttrs {
    fn ident_name(&self) -> String {
        self.ident
            .as_ref()
            .map(|ident| ident.unraw().to_string())
            .unwrap_or_default()
    }

    /// Name the field is looked up under.
    pub fn name(&self) -> String {
        self.rename.clone().unwrap_or_else(|| self.ident_name())
    }
}
