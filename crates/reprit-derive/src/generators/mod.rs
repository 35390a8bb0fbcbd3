//! Code generators for the `Object` derive.

mod object;

pub use object::generate_object_impl;
