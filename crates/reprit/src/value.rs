//! Dynamic values recovered from instances.
//!
//! [`Value`] is the currency shared by field seekers, argument serializers and
//! parameter defaults. It models the literal data a constructor can receive
//! plus references to modules, functions, classes and methods, which the
//! [`ComplexSerializer`](crate::ComplexSerializer) renders as dotted names.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::rc::Rc;
use std::sync::{Arc, Mutex, PoisonError};

use indexmap::IndexMap;

use crate::errors::ReprResult;
use crate::object::ClassRef;

/// A nested object that knows how to render itself.
///
/// Implemented by [`Bound`](crate::Bound), which pairs an instance with its
/// generated representation so that one generated representation can appear
/// inside another instance's arguments.
pub trait Represent: fmt::Debug + Send + Sync {
    fn represent(&self) -> ReprResult<String>;

    /// Qualified name of the represented object's class, used in opaque
    /// renderings.
    fn type_name(&self) -> String;
}

/// Reference to a module by its dotted path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModuleRef {
    pub name: String,
}

impl ModuleRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Reference to a free function (or builtin) by module and qualified name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FunctionRef {
    pub module: String,
    pub qualname: String,
}

impl FunctionRef {
    pub fn new(module: impl Into<String>, qualname: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            qualname: qualname.into(),
        }
    }
}

type SharedIterator = Arc<Mutex<Box<dyn Iterator<Item = Value> + Send>>>;

/// A single-use stream of values.
///
/// Clones share the same underlying iterator, so advancing one clone advances
/// all of them. Rendering never advances it.
#[derive(Clone)]
pub struct SingleUse {
    type_name: String,
    inner: SharedIterator,
}

impl SingleUse {
    pub fn new<I>(type_name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = Value>,
        I::IntoIter: Send + 'static,
    {
        Self {
            type_name: type_name.into(),
            inner: Arc::new(Mutex::new(Box::new(values.into_iter()))),
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Pulls the next value, consuming it for every clone.
    pub fn next_value(&self) -> Option<Value> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .next()
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for SingleUse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SingleUse")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

/// An owned dynamic value.
#[derive(Debug, Clone)]
pub enum Value {
    None,
    Bool(bool),
    /// Every Rust integer type up to `i128` fits without loss.
    Int(i128),
    Float(f64),
    Str(String),
    Bytes(Vec<u8>),
    Ellipsis,
    Tuple(Vec<Value>),
    List(Vec<Value>),
    /// Ordered key/value pairs.
    Dict(Vec<(Value, Value)>),
    Module(ModuleRef),
    Function(FunctionRef),
    Class(ClassRef),
    /// A method bound to `owner` (an instance, or a class for class methods).
    BoundMethod { owner: Box<Value>, name: String },
    /// A member descriptor looked up on a class rather than an instance.
    Descriptor { owner: ClassRef, name: String },
    Iterator(SingleUse),
    Instance(Arc<dyn Represent>),
}

impl Value {
    pub fn str(text: impl Into<String>) -> Self {
        Value::Str(text.into())
    }

    pub fn tuple<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Value::Tuple(values.into_iter().map(Into::into).collect())
    }

    pub fn list<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Value::List(values.into_iter().map(Into::into).collect())
    }

    /// Builds a dict with string keys, preserving iteration order.
    pub fn kwargs<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Value::Dict(
            entries
                .into_iter()
                .map(|(key, value)| (Value::Str(key.into()), value.into()))
                .collect(),
        )
    }

    pub fn iterator<I>(type_name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = Value>,
        I::IntoIter: Send + 'static,
    {
        Value::Iterator(SingleUse::new(type_name, values))
    }

    pub fn instance(object: impl Represent + 'static) -> Self {
        Value::Instance(Arc::new(object))
    }

    pub fn bound_method(owner: Value, name: impl Into<String>) -> Self {
        Value::BoundMethod {
            owner: Box::new(owner),
            name: name.into(),
        }
    }

    /// Name of the value's type as it appears in opaque renderings and errors.
    pub fn type_name(&self) -> String {
        match self {
            Value::None => "NoneType".into(),
            Value::Bool(_) => "bool".into(),
            Value::Int(_) => "int".into(),
            Value::Float(_) => "float".into(),
            Value::Str(_) => "str".into(),
            Value::Bytes(_) => "bytes".into(),
            Value::Ellipsis => "ellipsis".into(),
            Value::Tuple(_) => "tuple".into(),
            Value::List(_) => "list".into(),
            Value::Dict(_) => "dict".into(),
            Value::Module(_) => "module".into(),
            Value::Function(_) => "function".into(),
            Value::Class(_) => "type".into(),
            Value::BoundMethod { .. } => "method".into(),
            Value::Descriptor { .. } => "member_descriptor".into(),
            Value::Iterator(iterator) => iterator.type_name().to_string(),
            Value::Instance(object) => object.type_name(),
        }
    }

    /// Elements of a reusable sequence (`Tuple` or `List`).
    pub fn as_sequence(&self) -> Option<&[Value]> {
        match self {
            Value::Tuple(items) | Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Whether the value fills a variadic positional slot with at least one
    /// item. Iterators always count, since checking would consume them.
    pub fn is_populated(&self) -> bool {
        match self {
            Value::Tuple(items) | Value::List(items) => !items.is_empty(),
            Value::Iterator(_) => true,
            _ => false,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::None, Value::None) | (Value::Ellipsis, Value::Ellipsis) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            // signed zeros are distinct
            (Value::Float(a), Value::Float(b)) => {
                a == b && a.is_sign_negative() == b.is_sign_negative()
            }
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Bytes(a), Value::Bytes(b)) => a == b,
            (Value::Tuple(a), Value::Tuple(b)) | (Value::List(a), Value::List(b)) => a == b,
            (Value::Dict(a), Value::Dict(b)) => a == b,
            (Value::Module(a), Value::Module(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => a == b,
            (Value::Class(a), Value::Class(b)) => a == b,
            (
                Value::BoundMethod { owner: a, name: x },
                Value::BoundMethod { owner: b, name: y },
            ) => x == y && a == b,
            (
                Value::Descriptor { owner: a, name: x },
                Value::Descriptor { owner: b, name: y },
            ) => x == y && a == b,
            (Value::Iterator(a), Value::Iterator(b)) => a.ptr_eq(b),
            (Value::Instance(a), Value::Instance(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

macro_rules! impl_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::$variant(value.into())
                }
            }
        )*
    };
}

impl_from!(
    bool => Bool,
    i8 => Int,
    i16 => Int,
    i32 => Int,
    i64 => Int,
    u8 => Int,
    u16 => Int,
    u32 => Int,
    u64 => Int,
    i128 => Int,
    f32 => Float,
    f64 => Float,
    String => Str,
    &str => Str,
    Vec<u8> => Bytes,
    ModuleRef => Module,
    FunctionRef => Function,
    ClassRef => Class,
    SingleUse => Iterator,
);

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::None, Into::into)
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::None
    }
}

/// Conversion from a borrowed Rust value into a [`Value`].
///
/// This is what `#[derive(Object)]` calls on every stored field.
pub trait ToValue {
    fn to_value(&self) -> Value;
}

impl<T: ToValue + ?Sized> ToValue for &T {
    fn to_value(&self) -> Value {
        (*self).to_value()
    }
}

impl<T: ToValue + ?Sized> ToValue for Box<T> {
    fn to_value(&self) -> Value {
        (**self).to_value()
    }
}

impl<T: ToValue + ?Sized> ToValue for Rc<T> {
    fn to_value(&self) -> Value {
        (**self).to_value()
    }
}

impl<T: ToValue + ?Sized> ToValue for Arc<T> {
    fn to_value(&self) -> Value {
        (**self).to_value()
    }
}

impl ToValue for Value {
    fn to_value(&self) -> Value {
        self.clone()
    }
}

impl ToValue for str {
    fn to_value(&self) -> Value {
        Value::Str(self.to_string())
    }
}

impl ToValue for String {
    fn to_value(&self) -> Value {
        Value::Str(self.clone())
    }
}

impl ToValue for bool {
    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }
}

impl ToValue for () {
    fn to_value(&self) -> Value {
        Value::None
    }
}

macro_rules! impl_int {
    ($($ty:ty),*) => {
        $(
            impl ToValue for $ty {
                fn to_value(&self) -> Value {
                    Value::Int(i128::from(*self))
                }
            }
        )*
    };
}

impl_int!(i8, i16, i32, i64, i128, u8, u16, u32, u64);

impl From<usize> for Value {
    fn from(value: usize) -> Self {
        // lossless on every target with pointers of at most 64 bits
        Value::Int(value as i128)
    }
}

impl From<isize> for Value {
    fn from(value: isize) -> Self {
        Value::Int(value as i128)
    }
}

impl ToValue for usize {
    fn to_value(&self) -> Value {
        Value::from(*self)
    }
}

impl ToValue for isize {
    fn to_value(&self) -> Value {
        Value::from(*self)
    }
}

impl ToValue for f32 {
    fn to_value(&self) -> Value {
        Value::Float(f64::from(*self))
    }
}

impl ToValue for f64 {
    fn to_value(&self) -> Value {
        Value::Float(*self)
    }
}

impl ToValue for ClassRef {
    fn to_value(&self) -> Value {
        Value::Class(self.clone())
    }
}

impl ToValue for ModuleRef {
    fn to_value(&self) -> Value {
        Value::Module(self.clone())
    }
}

impl ToValue for FunctionRef {
    fn to_value(&self) -> Value {
        Value::Function(self.clone())
    }
}

impl ToValue for SingleUse {
    fn to_value(&self) -> Value {
        Value::Iterator(self.clone())
    }
}

impl<T: ToValue> ToValue for Option<T> {
    fn to_value(&self) -> Value {
        match self {
            Some(value) => value.to_value(),
            None => Value::None,
        }
    }
}

impl<T: ToValue> ToValue for Vec<T> {
    fn to_value(&self) -> Value {
        Value::List(self.iter().map(ToValue::to_value).collect())
    }
}

impl<T: ToValue> ToValue for [T] {
    fn to_value(&self) -> Value {
        Value::Tuple(self.iter().map(ToValue::to_value).collect())
    }
}

impl<T: ToValue> ToValue for IndexMap<String, T> {
    fn to_value(&self) -> Value {
        Value::Dict(
            self.iter()
                .map(|(key, value)| (Value::Str(key.clone()), value.to_value()))
                .collect(),
        )
    }
}

impl<T: ToValue> ToValue for BTreeMap<String, T> {
    fn to_value(&self) -> Value {
        Value::Dict(
            self.iter()
                .map(|(key, value)| (Value::Str(key.clone()), value.to_value()))
                .collect(),
        )
    }
}

impl<T: ToValue> ToValue for HashMap<String, T> {
    fn to_value(&self) -> Value {
        // sorted so that rendering stays deterministic
        let sorted: BTreeMap<&String, &T> = self.iter().collect();
        Value::Dict(
            sorted
                .into_iter()
                .map(|(key, value)| (Value::Str(key.clone()), value.to_value()))
                .collect(),
        )
    }
}

macro_rules! impl_tuple {
    ($($name:ident),+) => {
        impl<$($name: ToValue),+> ToValue for ($($name,)+) {
            #[allow(non_snake_case)]
            fn to_value(&self) -> Value {
                let ($($name,)+) = self;
                Value::Tuple(vec![$($name.to_value()),+])
            }
        }
    };
}

impl_tuple!(A);
impl_tuple!(A, B);
impl_tuple!(A, B, C);
impl_tuple!(A, B, C, D);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iterators_compare_by_identity() {
        let first = SingleUse::new("list_iterator", vec![Value::Int(1)]);
        let alias = first.clone();
        let other = SingleUse::new("list_iterator", vec![Value::Int(1)]);

        assert_eq!(Value::Iterator(first.clone()), Value::Iterator(alias));
        assert_ne!(Value::Iterator(first), Value::Iterator(other));
    }

    #[test]
    fn clones_share_the_stream() {
        let first = SingleUse::new("generator", vec![Value::Int(1), Value::Int(2)]);
        let alias = first.clone();

        assert_eq!(first.next_value(), Some(Value::Int(1)));
        assert_eq!(alias.next_value(), Some(Value::Int(2)));
        assert_eq!(first.next_value(), None);
    }

    #[test]
    fn float_equality_is_strict() {
        assert_ne!(Value::Float(f64::NAN), Value::Float(f64::NAN));
        assert_ne!(Value::Float(0.0), Value::Float(-0.0));
        assert_eq!(Value::Float(-0.0), Value::Float(-0.0));
        assert_ne!(Value::Int(1), Value::Float(1.0));
        assert_ne!(Value::Int(1), Value::Bool(true));
    }

    #[test]
    fn populated_variadics() {
        assert!(!Value::Tuple(vec![]).is_populated());
        assert!(!Value::List(vec![]).is_populated());
        assert!(Value::tuple([40]).is_populated());
        assert!(Value::iterator("generator", Vec::new()).is_populated());
        assert!(!Value::str("abc").is_populated());
    }

    #[test]
    fn converts_std_collections() {
        let mut scores = IndexMap::new();
        scores.insert("b".to_string(), 2_u8);
        scores.insert("a".to_string(), 1_u8);

        assert_eq!(
            scores.to_value(),
            Value::kwargs([("b", 2), ("a", 1)]),
        );
        assert_eq!(
            (1_i32, "x", Some(2.5_f64)).to_value(),
            Value::Tuple(vec![Value::Int(1), Value::str("x"), Value::Float(2.5)]),
        );
        assert_eq!(Option::<i32>::None.to_value(), Value::None);
        assert_eq!(u64::MAX.to_value(), Value::Int(18_446_744_073_709_551_615));
        assert_eq!(i128::MIN.to_value(), Value::Int(i128::MIN));
        assert_eq!(usize::MAX.to_value(), Value::from(usize::MAX as u64));
    }
}
