//! Signature reflection: declarative parameter lists for constructor-like routines.
//!
//! Rust cannot introspect a function's parameter list at runtime, so routines
//! are described explicitly with [`Routine`]. A routine is either an
//! initializer (rendered as `ClassName(...)`) or a named alternate constructor
//! (rendered as `ClassName.method(...)`), and lists its receiver explicitly:
//! `self` for initializers, `cls` for class-bound constructors, nothing for
//! static ones.
//!
//! [`Routine::signature`] strips the receiver and validates the rest.
//!
//! ```
//! use reprit::{ParameterKind, Routine, Value};
//!
//! let routine = Routine::initializer()
//!     .positional_or_keyword("name")
//!     .keyword_only_with_default("address", Value::None);
//! let signature = routine.signature().unwrap();
//!
//! assert_eq!(signature.len(), 2);
//! assert_eq!(signature[1].kind(), ParameterKind::KeywordOnly);
//! ```

use std::collections::HashSet;
use std::fmt;
use std::ops::Index;

use crate::value::Value;

/// Name under which initializers are declared.
pub const INITIALIZER_NAME: &str = "__init__";
/// Name of the allocating constructor, which renders like an initializer.
pub const ALLOCATOR_NAME: &str = "__new__";

/// How a parameter binds call arguments, in canonical declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ParameterKind {
    PositionalOnly,
    PositionalOrKeyword,
    VarPositional,
    KeywordOnly,
    VarKeyword,
}

impl ParameterKind {
    /// Whether arguments for this kind can be passed positionally one-to-one.
    pub fn is_positional(self) -> bool {
        matches!(
            self,
            ParameterKind::PositionalOnly | ParameterKind::PositionalOrKeyword
        )
    }

    pub fn is_variadic(self) -> bool {
        matches!(
            self,
            ParameterKind::VarPositional | ParameterKind::VarKeyword
        )
    }
}

impl fmt::Display for ParameterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ParameterKind::PositionalOnly => "positional-only",
            ParameterKind::PositionalOrKeyword => "positional-or-keyword",
            ParameterKind::VarPositional => "variadic positional",
            ParameterKind::KeywordOnly => "keyword-only",
            ParameterKind::VarKeyword => "variadic keyword",
        })
    }
}

/// A single declared parameter.
///
/// `default` is `None` when the parameter has no default, which is distinct
/// from a default of [`Value::None`].
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    name: String,
    kind: ParameterKind,
    default: Option<Value>,
}

impl Parameter {
    pub fn new(name: impl Into<String>, kind: ParameterKind) -> Self {
        Self {
            name: name.into(),
            kind,
            default: None,
        }
    }

    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ParameterKind {
        self.kind
    }

    pub fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    /// Whether `value` equals the declared default. Always false without one.
    pub fn is_default(&self, value: &Value) -> bool {
        self.default.as_ref().is_some_and(|default| default == value)
    }
}

/// Ordered parameters of a routine, receiver excluded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Signature {
    parameters: Vec<Parameter>,
}

impl Signature {
    pub fn iter(&self) -> std::slice::Iter<'_, Parameter> {
        self.parameters.iter()
    }

    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|parameter| parameter.name == name)
    }

    pub fn variadic_positional(&self) -> Option<&Parameter> {
        self.find_kind(ParameterKind::VarPositional)
    }

    pub fn variadic_keyword(&self) -> Option<&Parameter> {
        self.find_kind(ParameterKind::VarKeyword)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.parameters.iter().map(Parameter::name)
    }

    fn find_kind(&self, kind: ParameterKind) -> Option<&Parameter> {
        self.parameters.iter().find(|parameter| parameter.kind == kind)
    }
}

impl Index<usize> for Signature {
    type Output = Parameter;

    fn index(&self, index: usize) -> &Parameter {
        &self.parameters[index]
    }
}

impl<'a> IntoIterator for &'a Signature {
    type Item = &'a Parameter;
    type IntoIter = std::slice::Iter<'a, Parameter>;

    fn into_iter(self) -> Self::IntoIter {
        self.parameters.iter()
    }
}

/// How an alternate constructor receives its class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Binding {
    /// Bound to the class: the first declared parameter is the class receiver.
    ClassBound,
    /// Unbound or static: every declared parameter is a real argument.
    Static,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoutineKind {
    Initializer,
    Constructor(Binding),
}

impl RoutineKind {
    pub fn has_receiver(self) -> bool {
        matches!(
            self,
            RoutineKind::Initializer | RoutineKind::Constructor(Binding::ClassBound)
        )
    }
}

/// A constructor-like routine and its declared parameter list, receiver included.
#[derive(Debug, Clone, PartialEq)]
pub struct Routine {
    name: String,
    kind: RoutineKind,
    parameters: Vec<Parameter>,
}

impl Routine {
    /// An initializer, declared with the receiver `self`.
    pub fn initializer() -> Self {
        Self::with_receiver(INITIALIZER_NAME, RoutineKind::Initializer, "self")
    }

    /// A class-bound alternate constructor, declared with the receiver `cls`.
    pub fn class_method(name: impl Into<String>) -> Self {
        Self::with_receiver(name, RoutineKind::Constructor(Binding::ClassBound), "cls")
    }

    /// A static alternate constructor; it has no receiver.
    pub fn static_method(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: RoutineKind::Constructor(Binding::Static),
            parameters: Vec::new(),
        }
    }

    /// A routine from an already reflected parameter list.
    ///
    /// When `kind` has a receiver, the first parameter is taken to be it.
    /// Routines named `__init__` or `__new__` are initializers whatever
    /// `kind` says, since they render as the plain class call.
    pub fn from_parameters(
        name: impl Into<String>,
        kind: RoutineKind,
        parameters: Vec<Parameter>,
    ) -> Self {
        let name = name.into();
        let kind = if name == INITIALIZER_NAME || name == ALLOCATOR_NAME {
            RoutineKind::Initializer
        } else {
            kind
        };
        Self {
            name,
            kind,
            parameters,
        }
    }

    fn with_receiver(name: impl Into<String>, kind: RoutineKind, receiver: &str) -> Self {
        Self {
            name: name.into(),
            kind,
            parameters: vec![Parameter::new(receiver, ParameterKind::PositionalOrKeyword)],
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> RoutineKind {
        self.kind
    }

    pub fn is_initializer(&self) -> bool {
        self.kind == RoutineKind::Initializer
    }

    /// Declared parameters, receiver included.
    pub fn declared(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn parameter(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn positional_only(self, name: impl Into<String>) -> Self {
        self.parameter(Parameter::new(name, ParameterKind::PositionalOnly))
    }

    pub fn positional_only_with_default(
        self,
        name: impl Into<String>,
        default: impl Into<Value>,
    ) -> Self {
        self.parameter(Parameter::new(name, ParameterKind::PositionalOnly).with_default(default))
    }

    pub fn positional_or_keyword(self, name: impl Into<String>) -> Self {
        self.parameter(Parameter::new(name, ParameterKind::PositionalOrKeyword))
    }

    pub fn positional_or_keyword_with_default(
        self,
        name: impl Into<String>,
        default: impl Into<Value>,
    ) -> Self {
        self.parameter(
            Parameter::new(name, ParameterKind::PositionalOrKeyword).with_default(default),
        )
    }

    pub fn var_positional(self, name: impl Into<String>) -> Self {
        self.parameter(Parameter::new(name, ParameterKind::VarPositional))
    }

    pub fn keyword_only(self, name: impl Into<String>) -> Self {
        self.parameter(Parameter::new(name, ParameterKind::KeywordOnly))
    }

    pub fn keyword_only_with_default(
        self,
        name: impl Into<String>,
        default: impl Into<Value>,
    ) -> Self {
        self.parameter(Parameter::new(name, ParameterKind::KeywordOnly).with_default(default))
    }

    pub fn var_keyword(self, name: impl Into<String>) -> Self {
        self.parameter(Parameter::new(name, ParameterKind::VarKeyword))
    }

    /// Extracts the signature: drops the receiver, then validates the
    /// remaining parameters.
    ///
    /// A routine without parameters beyond its receiver yields an empty
    /// signature.
    pub fn signature(&self) -> Result<Signature, SignatureError> {
        let skip = usize::from(self.kind.has_receiver());
        let parameters: Vec<Parameter> = self.parameters.iter().skip(skip).cloned().collect();
        validate(&self.name, &parameters)?;
        Ok(Signature { parameters })
    }
}

/// A routine's parameter list cannot be declared that way.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignatureError {
    #[error("duplicate parameter `{name}` in `{routine}`")]
    DuplicateName { routine: String, name: String },

    #[error("`{routine}` declares more than one {kind} parameter (`{name}`)")]
    DuplicateVariadic {
        routine: String,
        name: String,
        kind: ParameterKind,
    },

    #[error("{kind} parameter `{name}` cannot follow a {previous} parameter in `{routine}`")]
    OutOfOrder {
        routine: String,
        name: String,
        kind: ParameterKind,
        previous: ParameterKind,
    },

    #[error("variadic parameter `{name}` in `{routine}` cannot have a default")]
    VariadicDefault { routine: String, name: String },

    #[error("parameter `{name}` without a default follows a parameter with a default in `{routine}`")]
    MissingDefault { routine: String, name: String },
}

fn validate(routine: &str, parameters: &[Parameter]) -> Result<(), SignatureError> {
    let mut names = HashSet::new();
    let mut previous: Option<ParameterKind> = None;
    let mut seen_positional_default = false;

    for parameter in parameters {
        let name = parameter.name();
        let kind = parameter.kind();

        if !names.insert(name) {
            return Err(SignatureError::DuplicateName {
                routine: routine.to_string(),
                name: name.to_string(),
            });
        }

        if let Some(previous) = previous {
            if kind < previous {
                return Err(SignatureError::OutOfOrder {
                    routine: routine.to_string(),
                    name: name.to_string(),
                    kind,
                    previous,
                });
            }
            if kind == previous && kind.is_variadic() {
                return Err(SignatureError::DuplicateVariadic {
                    routine: routine.to_string(),
                    name: name.to_string(),
                    kind,
                });
            }
        }

        if kind.is_variadic() && parameter.has_default() {
            return Err(SignatureError::VariadicDefault {
                routine: routine.to_string(),
                name: name.to_string(),
            });
        }

        if kind.is_positional() {
            if parameter.has_default() {
                seen_positional_default = true;
            } else if seen_positional_default {
                return Err(SignatureError::MissingDefault {
                    routine: routine.to_string(),
                    name: name.to_string(),
                });
            }
        }

        previous = Some(kind);
    }

    Ok(())
}
