//! Field seekers: recover a parameter's current value from an instance.
//!
//! - [`SimpleSeeker`] reads the field stored under the parameter's exact name.
//! - [`ComplexSeeker`] also accepts the `_name` / `name_` storage conventions.
//! - [`AccessorTable`] maps parameter names to explicit accessors, for types
//!   whose storage does not follow any naming convention.
//!
//! Any `Fn(&T, &str) -> Result<Value, LookupError>` closure is a seeker too.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::errors::LookupError;
use crate::object::{Field, Object};
use crate::value::Value;

/// Recovers the value an instance holds for a constructor parameter.
pub trait FieldSeeker<T: ?Sized>: Send + Sync {
    fn seek<'a>(&self, instance: &'a T, name: &str) -> Result<Field<'a>, LookupError>;
}

impl<T, F> FieldSeeker<T> for F
where
    T: ?Sized,
    F: Fn(&T, &str) -> Result<Value, LookupError> + Send + Sync,
{
    fn seek<'a>(&self, instance: &'a T, name: &str) -> Result<Field<'a>, LookupError> {
        self(instance, name).map(Field::Value)
    }
}

/// Direct attribute lookup under the parameter's exact name.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleSeeker;

impl<T: Object + ?Sized> FieldSeeker<T> for SimpleSeeker {
    fn seek<'a>(&self, instance: &'a T, name: &str) -> Result<Field<'a>, LookupError> {
        instance
            .attribute(name)
            .ok_or_else(|| LookupError::missing(instance.class().qualified(), name))
    }
}

/// Attribute lookup that tolerates underscore storage conventions.
///
/// The exact name wins. Otherwise the alternatives `_name`, `name_` and, for a
/// parameter ending in `_` (like `id_`), the name with trailing underscores
/// stripped are tried; exactly one of them may resolve. If several resolve the
/// storage is ambiguous and the lookup fails instead of guessing.
#[derive(Debug, Clone, Copy, Default)]
pub struct ComplexSeeker;

impl ComplexSeeker {
    /// Alternative storage names for `name`, in lookup order.
    pub fn alternatives(name: &str) -> Vec<String> {
        let mut names = vec![format!("_{name}"), format!("{name}_")];
        let stripped = name.trim_end_matches('_');
        if stripped.len() != name.len() && !stripped.is_empty() {
            names.push(stripped.to_string());
        }
        names
    }
}

impl<T: Object + ?Sized> FieldSeeker<T> for ComplexSeeker {
    fn seek<'a>(&self, instance: &'a T, name: &str) -> Result<Field<'a>, LookupError> {
        if let Some(field) = instance.attribute(name) {
            return Ok(field);
        }

        let alternatives = Self::alternatives(name);
        let mut resolved: Vec<(String, Field<'a>)> = alternatives
            .iter()
            .filter_map(|candidate| {
                instance
                    .attribute(candidate)
                    .map(|field| (candidate.clone(), field))
            })
            .collect();

        match resolved.len() {
            0 => {
                let mut tried = Vec::with_capacity(alternatives.len() + 1);
                tried.push(name.to_string());
                tried.extend(alternatives);
                Err(LookupError::missing_any(
                    instance.class().qualified(),
                    name,
                    tried,
                ))
            }
            1 => Ok(resolved.remove(0).1),
            _ => Err(LookupError::ambiguous(
                instance.class().qualified(),
                name,
                resolved.into_iter().map(|(candidate, _)| candidate).collect(),
            )),
        }
    }
}

type Accessor<T> = Arc<dyn Fn(&T) -> Value + Send + Sync>;

enum Entry<T: ?Sized> {
    Stored(Accessor<T>),
    Computed(Accessor<T>),
}

impl<T: ?Sized> Clone for Entry<T> {
    fn clone(&self) -> Self {
        match self {
            Entry::Stored(accessor) => Entry::Stored(Arc::clone(accessor)),
            Entry::Computed(accessor) => Entry::Computed(Arc::clone(accessor)),
        }
    }
}

/// Explicit parameter name → accessor table.
///
/// ```
/// use reprit::{AccessorTable, FieldSeeker, Value};
///
/// struct Account { id: u32, balance: i64 }
///
/// let table = AccessorTable::<Account>::new()
///     .field("id_", |account| Value::from(account.id))
///     .field("balance", |account| Value::from(account.balance));
/// let account = Account { id: 7, balance: -10 };
///
/// assert_eq!(table.seek(&account, "id_").unwrap().resolve(), Value::Int(7));
/// ```
pub struct AccessorTable<T: ?Sized> {
    class: Option<String>,
    entries: IndexMap<String, Entry<T>>,
}

impl<T: ?Sized> AccessorTable<T> {
    pub fn new() -> Self {
        Self {
            class: None,
            entries: IndexMap::new(),
        }
    }

    /// Class name reported in lookup errors.
    pub fn class_name(mut self, class: impl Into<String>) -> Self {
        self.class = Some(class.into());
        self
    }

    /// Registers a stored field.
    pub fn field<F>(mut self, name: impl Into<String>, accessor: F) -> Self
    where
        F: Fn(&T) -> Value + Send + Sync + 'static,
    {
        self.entries
            .insert(name.into(), Entry::Stored(Arc::new(accessor)));
        self
    }

    /// Registers a field computed on demand from the instance.
    pub fn computed<F>(mut self, name: impl Into<String>, accessor: F) -> Self
    where
        F: Fn(&T) -> Value + Send + Sync + 'static,
    {
        self.entries
            .insert(name.into(), Entry::Computed(Arc::new(accessor)));
        self
    }
}

impl<T: ?Sized> Default for AccessorTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> Clone for AccessorTable<T> {
    fn clone(&self) -> Self {
        Self {
            class: self.class.clone(),
            entries: self.entries.clone(),
        }
    }
}

impl<T: ?Sized> fmt::Debug for AccessorTable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessorTable")
            .field("class", &self.class)
            .field("fields", &self.entries.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl<T: ?Sized> FieldSeeker<T> for AccessorTable<T> {
    fn seek<'a>(&self, instance: &'a T, name: &str) -> Result<Field<'a>, LookupError> {
        match self.entries.get(name) {
            Some(Entry::Stored(accessor)) => Ok(Field::Value(accessor(instance))),
            Some(Entry::Computed(accessor)) => {
                let accessor = Arc::clone(accessor);
                Ok(Field::computed(move || accessor(instance)))
            }
            None => Err(LookupError::missing(
                self.class.as_deref().unwrap_or("<unknown>"),
                name,
            )),
        }
    }
}
