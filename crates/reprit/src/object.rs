//! Instances as seen by the generator: a runtime class plus named fields.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::value::Value;

/// A class identified by its defining module and qualified name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClassRef {
    module: String,
    qualname: String,
}

impl ClassRef {
    pub fn new(module: impl Into<String>, qualname: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            qualname: qualname.into(),
        }
    }

    /// Builds a class reference from a Rust `module_path!()`, turning `::`
    /// separators into dots.
    pub fn from_module_path(module_path: &str, qualname: impl Into<String>) -> Self {
        Self::new(module_path.replace("::", "."), qualname)
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn qualname(&self) -> &str {
        &self.qualname
    }

    /// Last segment of the qualified name.
    pub fn name(&self) -> &str {
        self.qualname
            .rsplit('.')
            .next()
            .unwrap_or(&self.qualname)
    }

    /// `module.qualname`, or just the qualified name for an anonymous module.
    pub fn qualified(&self) -> String {
        if self.module.is_empty() {
            self.qualname.clone()
        } else {
            format!("{}.{}", self.module, self.qualname)
        }
    }
}

impl fmt::Display for ClassRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.qualified())
    }
}

/// What a field seeker hands back for one parameter.
///
/// `Computed` models a method bound to the instance being rendered: the field
/// is derived on demand instead of stored, and the generator invokes the thunk
/// to obtain the value.
pub enum Field<'a> {
    Value(Value),
    Computed(Box<dyn Fn() -> Value + 'a>),
}

impl<'a> Field<'a> {
    pub fn computed(thunk: impl Fn() -> Value + 'a) -> Self {
        Field::Computed(Box::new(thunk))
    }

    pub fn is_computed(&self) -> bool {
        matches!(self, Field::Computed(_))
    }

    pub fn resolve(self) -> Value {
        match self {
            Field::Value(value) => value,
            Field::Computed(thunk) => thunk(),
        }
    }
}

impl From<Value> for Field<'_> {
    fn from(value: Value) -> Self {
        Field::Value(value)
    }
}

impl fmt::Debug for Field<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Field::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

/// An instance whose representation can be generated.
///
/// Usually implemented with `#[derive(Object)]`; [`DynObject`] covers
/// instances assembled at runtime.
pub trait Object {
    /// The instance's runtime class. Subclass instances report their own
    /// class, not the class the constructor was declared on.
    fn class(&self) -> ClassRef;

    /// Attribute-style lookup of a field by its storage name.
    fn attribute(&self, _name: &str) -> Option<Field<'_>> {
        None
    }
}

impl<T: Object + ?Sized> Object for &T {
    fn class(&self) -> ClassRef {
        (**self).class()
    }

    fn attribute(&self, name: &str) -> Option<Field<'_>> {
        (**self).attribute(name)
    }
}

impl<T: Object + ?Sized> Object for Box<T> {
    fn class(&self) -> ClassRef {
        (**self).class()
    }

    fn attribute(&self, name: &str) -> Option<Field<'_>> {
        (**self).attribute(name)
    }
}

impl<T: Object + ?Sized> Object for Arc<T> {
    fn class(&self) -> ClassRef {
        (**self).class()
    }

    fn attribute(&self, name: &str) -> Option<Field<'_>> {
        (**self).attribute(name)
    }
}

type ComputeFn = Arc<dyn Fn(&DynObject) -> Value + Send + Sync>;

#[derive(Clone)]
enum Attribute {
    Stored(Value),
    Computed(ComputeFn),
}

/// An instance assembled at runtime: a class and an ordered attribute table.
///
/// ```
/// use reprit::{ClassRef, DynObject, Value};
///
/// let person = DynObject::new(ClassRef::new("people", "Person"))
///     .with("name", "Adrian")
///     .with("address", Value::None);
/// assert_eq!(person.get("name"), Some(&Value::str("Adrian")));
/// ```
#[derive(Clone)]
pub struct DynObject {
    class: ClassRef,
    attributes: IndexMap<String, Attribute>,
}

impl DynObject {
    pub fn new(class: ClassRef) -> Self {
        Self {
            class,
            attributes: IndexMap::new(),
        }
    }

    /// Stores `value` under `name`.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    /// Registers a computed attribute, evaluated each time it is read.
    pub fn with_computed<F>(mut self, name: impl Into<String>, compute: F) -> Self
    where
        F: Fn(&DynObject) -> Value + Send + Sync + 'static,
    {
        self.attributes
            .insert(name.into(), Attribute::Computed(Arc::new(compute)));
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.attributes
            .insert(name.into(), Attribute::Stored(value.into()));
    }

    /// Re-labels the instance with another class, as a subclass instance would be.
    pub fn with_class(mut self, class: ClassRef) -> Self {
        self.class = class;
        self
    }

    /// The stored (not computed) value under `name`.
    pub fn get(&self, name: &str) -> Option<&Value> {
        match self.attributes.get(name)? {
            Attribute::Stored(value) => Some(value),
            Attribute::Computed(_) => None,
        }
    }

    /// Current value under `name`, evaluating computed attributes.
    pub fn value(&self, name: &str) -> Option<Value> {
        self.attribute(name).map(Field::resolve)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.attributes.keys().map(String::as_str)
    }

    /// Stored attributes in insertion order.
    pub fn stored(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.attributes
            .iter()
            .filter_map(|(name, attribute)| match attribute {
                Attribute::Stored(value) => Some((name.as_str(), value)),
                Attribute::Computed(_) => None,
            })
    }
}

impl Object for DynObject {
    fn class(&self) -> ClassRef {
        self.class.clone()
    }

    fn attribute(&self, name: &str) -> Option<Field<'_>> {
        match self.attributes.get(name)? {
            Attribute::Stored(value) => Some(Field::Value(value.clone())),
            Attribute::Computed(compute) => {
                let compute = Arc::clone(compute);
                Some(Field::computed(move || compute(self)))
            }
        }
    }
}

impl fmt::Debug for DynObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (name, attribute) in &self.attributes {
            match attribute {
                Attribute::Stored(value) => map.entry(name, value),
                Attribute::Computed(_) => map.entry(name, &"<computed>"),
            };
        }
        map.finish()?;
        write!(f, " @ {}", self.class)
    }
}
