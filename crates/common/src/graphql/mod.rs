//! GraphQL selection building
//!
//! - **[`fields`]**: `FieldSpec` / `Selection` and the required-field guard
//! - **[`projection`]**: recursive serialization into selection syntax
//! - **[`queries`]**: query and mutation templates built on the projector
//!
//! Projection is a pure function of its input; nothing is cached between
//! calls.

pub mod fields;
pub mod projection;
pub mod queries;

use thiserror::Error;

pub use fields::{ensure_required_field, FieldSpec, RequiredFieldPolicy, Selection, DEFAULT_FIELD};
pub use projection::project;

/// Errors raised while building a selection
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProjectionError {
    /// The field specification violates the selection grammar.
    #[error("Invalid field specification: {0}")]
    InvalidFieldSpec(String),

    /// The required field was omitted under [`RequiredFieldPolicy::Reject`].
    #[error("Required field '{0}' missing from selection")]
    MissingRequiredField(String),
}
