//! # wwsdk Domain
//!
//! Data types shared by every wwsdk crate.
//!
//! This crate contains:
//! - The crate-spanning error type and `Result` alias
//! - Client configuration structures and log levels
//! - Platform constants (endpoints, credential format, renewal timings)
//! - UI payloads, message content, and NLP extraction types
//!
//! ## Architecture
//! - No dependencies on other wwsdk crates
//! - Only external dependencies allowed
//! - Pure data structures; no I/O

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
