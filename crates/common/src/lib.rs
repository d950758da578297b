//! Core request algorithms shared across the workspace SDK crates.
//!
//! # Feature Tiers
//!
//! Enable cargo features to opt into the tiers you need:
//! - `foundation`: GraphQL field projection, response normalization
//! - `runtime`: token lifecycle and credential exchange (default)
//! - `test-utils`: mock credential exchange and JWT fixtures for downstream
//!   tests

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

// Foundation tier
// -----------------------------------------------------------------
#[cfg(feature = "foundation")]
pub mod graphql;
#[cfg(feature = "foundation")]
pub mod normalize;

// Runtime tier
// --------------------------------------------------------------------
#[cfg(feature = "runtime")]
pub mod auth;

// Testing utilities
// ---------------------------------------------------------------
#[cfg(any(feature = "runtime", feature = "test-utils"))]
pub mod testing;

// Re-export commonly used types
// ------------------------
#[cfg(feature = "runtime")]
pub use auth::{
    AcquisitionHandle, ClientCredentials, Credential, CredentialExchange, OAuthClient,
    TokenAccessor, TokenLifecycleManager, TokenManagerError, TokenState,
};
#[cfg(feature = "foundation")]
pub use graphql::{ensure_required_field, project, FieldSpec, ProjectionError, Selection};
#[cfg(feature = "foundation")]
pub use normalize::{jsonify, map_collection, pick, NormalizeError, Picked};
