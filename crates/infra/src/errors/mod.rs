//! Error plumbing between infrastructure crates and [`SdkError`].
//!
//! [`SdkError`]: wwsdk_domain::SdkError

pub mod conversions;

pub use conversions::{to_sdk, InfraError};
