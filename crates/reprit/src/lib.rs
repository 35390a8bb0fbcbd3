//! Constructor-shaped representations, derived from signatures.
//!
//! `reprit` produces strings like `Person('Adrian', address=None)` for an
//! instance by walking the parameter list of the routine that constructed it,
//! recovering each parameter's current value from the instance, and choosing
//! positional or keyword form per parameter so that evaluating the string as
//! a call rebuilds an equivalent object.
//!
//! # Overview
//!
//! - [`Routine`] / [`Signature`] - declared constructor parameters
//! - [`Object`] / [`DynObject`] - instances: a runtime class plus fields
//! - [`FieldSeeker`] - recovers a parameter's value ([`SimpleSeeker`],
//!   [`ComplexSeeker`], [`AccessorTable`])
//! - [`ArgumentSerializer`] - renders one value ([`SimpleSerializer`],
//!   [`ComplexSerializer`])
//! - [`generate_repr`] / [`Repr`] - the generated representation
//!
//! # Example
//!
//! ```
//! use reprit::{ClassRef, DynObject, Policy, Routine, Value, generate_repr_simple};
//!
//! let routine = Routine::initializer()
//!     .positional_or_keyword("name")
//!     .keyword_only_with_default("address", Value::None);
//! let repr = generate_repr_simple::<DynObject>(&routine, Policy::default()).unwrap();
//!
//! let person = DynObject::new(ClassRef::new("people", "Person"))
//!     .with("name", "Adrian")
//!     .with("address", Value::None);
//! assert_eq!(repr.render(&person).unwrap(), "Person('Adrian', address=None)");
//! ```

extern crate self as reprit;

pub mod errors;
pub mod generator;
pub mod object;
pub mod seekers;
pub mod serializers;
pub mod signature;
pub mod telemetry;
pub mod value;

pub use errors::{LookupError, LookupFailure, ReprError, ReprResult};
pub use generator::{Bound, Policy, Repr, ReprBuilder, generate_repr, generate_repr_simple};
pub use object::{ClassRef, DynObject, Field, Object};
pub use seekers::{AccessorTable, ComplexSeeker, FieldSeeker, SimpleSeeker};
pub use serializers::{ArgumentSerializer, ComplexSerializer, SimpleSerializer};
pub use signature::{
    Binding, Parameter, ParameterKind, Routine, RoutineKind, Signature, SignatureError,
};
pub use telemetry::{TelemetryInitError, init_tracing};
pub use value::{FunctionRef, ModuleRef, Represent, SingleUse, ToValue, Value};

#[cfg(feature = "derive")]
pub use reprit_derive::Object;
