//! Testing utilities and helpers
//!
//! - **[`fixtures`]**: JWT fixtures with controlled expiry
//! - **[`mocks`]**: scripted [`CredentialExchange`](crate::auth::CredentialExchange)
//!
//! ## Usage
//!
//! ```rust
//! use wwsdk_common::testing::{jwt_expiring_in, MockCredentialExchange};
//!
//! let exchange = MockCredentialExchange::new()
//!     .then_fail()
//!     .always(jwt_expiring_in(3600));
//! assert_eq!(exchange.calls(), 0);
//! ```

pub mod fixtures;
pub mod mocks;

pub use fixtures::{jwt_expiring_in, jwt_with_claims, jwt_with_exp};
pub use mocks::MockCredentialExchange;
