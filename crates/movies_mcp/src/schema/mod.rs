//! Per-call JSON Schema validator (spec.md §4.6): a tagged-variant schema
//! representation plus a recursive-descent validator over it, strict about
//! unknown fields.

mod node;
mod validate;

pub use node::{ArraySchema, NumberSchema, ObjectSchema, SchemaNode, StringFormat, StringSchema};
pub use validate::{validate, ValidationError};
