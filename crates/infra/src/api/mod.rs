//! Platform API access
//!
//! # Architecture
//!
//! - [`RequestDispatcher`] sends every request with the current bearer token
//!   and returns failures unretried
//! - [`AccessTokenProvider`] is the seam between the dispatcher and the token
//!   source (pre-issued or lifecycle-managed)
//! - [`WorkspaceClient`] builds the platform's business operations on top

pub mod auth;
pub mod client;
pub mod dispatcher;
pub mod files;

pub use auth::{AccessTokenProvider, ManagedToken, StaticToken};
pub use client::{platform_renewal_policy, WorkspaceClient};
pub use dispatcher::{
    GraphqlPayload, RequestBody, RequestDispatcher, RequestEnvelope, ResponseEnvelope,
    HTTP_TRACE_TARGET,
};
pub use files::Dimensions;
