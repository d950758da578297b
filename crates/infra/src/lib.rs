//! # wwsdk Infrastructure
//!
//! Everything in the client that performs I/O.
//!
//! This crate contains:
//! - The HTTP client wrapper and the bearer-injecting request dispatcher
//! - Access-token providers over the token lifecycle manager
//! - The high-level [`WorkspaceClient`] with the platform's operations
//! - Configuration loading (environment, `.env`, JSON/TOML files)
//! - Logging initialisation
//!
//! ## Architecture
//! - Depends on `wwsdk-common` for core algorithms and `wwsdk-domain` for
//!   data types
//! - Maps every lower-level error into `SdkError` in one place

pub mod api;
pub mod config;
pub mod errors;
pub mod http;
pub mod observability;

// Re-export commonly used items
pub use api::{
    AccessTokenProvider, Dimensions, GraphqlPayload, ManagedToken, RequestDispatcher,
    RequestEnvelope, ResponseEnvelope, StaticToken, WorkspaceClient,
};
pub use errors::{to_sdk, InfraError};
pub use http::{HttpClient, HttpClientBuilder};
pub use observability::{init_logging, init_logging_from, LoggingHandle};
