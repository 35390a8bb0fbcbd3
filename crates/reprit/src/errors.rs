//! Error types for representation generation.
//!
//! Failures fall into two stages, and the stage tells you who is at fault:
//!
//! 1. **[`SignatureError`](crate::SignatureError)** is raised while a routine's
//!    parameter list is turned into a signature. The routine declaration itself
//!    is malformed.
//! 2. **[`ReprError`]** is raised when a generated representation is rendered for
//!    a concrete instance. Lookup failures mean the instance does not store the
//!    fields its constructor declares; they are never masked or retried.

use std::fmt;

/// Why a field seeker could not recover a parameter's value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupFailure {
    /// None of the names tried resolved on the instance.
    Missing { tried: Vec<String> },
    /// More than one alternative storage name resolved, so the seeker cannot
    /// tell which one holds the parameter.
    Ambiguous { candidates: Vec<String> },
}

impl fmt::Display for LookupFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupFailure::Missing { tried } => {
                write!(f, "tried {}", quoted_list(tried))
            }
            LookupFailure::Ambiguous { candidates } => {
                write!(f, "ambiguous between {}", quoted_list(candidates))
            }
        }
    }
}

fn quoted_list(names: &[String]) -> String {
    names
        .iter()
        .map(|name| format!("`{name}`"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// A declared parameter's value could not be recovered from an instance.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("`{class}` object has no field for parameter `{name}` ({reason})")]
pub struct LookupError {
    /// Qualified name of the instance's class.
    pub class: String,
    /// The parameter being looked up.
    pub name: String,
    pub reason: LookupFailure,
}

impl LookupError {
    pub fn missing(class: impl Into<String>, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            class: class.into(),
            reason: LookupFailure::Missing {
                tried: vec![name.clone()],
            },
            name,
        }
    }

    pub fn missing_any(
        class: impl Into<String>,
        name: impl Into<String>,
        tried: Vec<String>,
    ) -> Self {
        Self {
            class: class.into(),
            name: name.into(),
            reason: LookupFailure::Missing { tried },
        }
    }

    pub fn ambiguous(
        class: impl Into<String>,
        name: impl Into<String>,
        candidates: Vec<String>,
    ) -> Self {
        Self {
            class: class.into(),
            name: name.into(),
            reason: LookupFailure::Ambiguous { candidates },
        }
    }

    pub fn is_ambiguous(&self) -> bool {
        matches!(self.reason, LookupFailure::Ambiguous { .. })
    }
}

/// Failure while rendering an instance.
///
/// There is no partial output: when any argument fails, the whole render fails.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ReprError {
    /// The field seeker could not recover a parameter's value.
    #[error(transparent)]
    Lookup(#[from] LookupError),

    /// A variadic parameter's field holds a value of the wrong shape
    /// (e.g. `**kwargs` stored as a list).
    #[error("parameter `{parameter}` expects {expected}, found {found}")]
    UnexpectedValue {
        parameter: String,
        expected: &'static str,
        found: String,
    },

    /// The argument serializer could not render a value.
    #[error("failed to serialize `{type_name}` value: {reason}")]
    Serialize { type_name: String, reason: String },
}

pub type ReprResult<T> = Result<T, ReprError>;
