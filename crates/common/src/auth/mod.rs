//! OAuth `client_credentials` authentication
//!
//! # Features
//!
//! - **Credential Exchange**: one-shot token requests against the platform's
//!   token endpoint ([`OAuthClient`])
//! - **Token Lifecycle**: background renewal ahead of expiry with bounded
//!   retry ([`TokenLifecycleManager`])
//! - **Accessors**: cloneable read handles that always see the latest token
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────┐
//! │ TokenLifecycleManager  │  owns the credential and renewal task
//! └───────────┬────────────┘
//!             │
//!             ├──► CredentialExchange  (OAuthClient, or a mock in tests)
//!             │
//!             └──► TokenAccessor       (read-only handles for dispatchers)
//! ```
//!
//! # Usage Example
//!
//! ```no_run
//! use wwsdk_common::auth::{ClientCredentials, OAuthClient, TokenLifecycleManager};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let manager = TokenLifecycleManager::new(OAuthClient::new("https://api.watsonwork.ibm.com"));
//!     let handle = manager.start(ClientCredentials::new(
//!         "00000000-0000-0000-0000-000000000000",
//!         "0123456789abcdefghijklmnopqr",
//!     ))?;
//!
//!     let credential = handle.wait().await?;
//!     println!("token valid until {}", credential.expires_at);
//!
//!     let accessor = manager.accessor();
//!     let _bearer = accessor.current_token()?.bearer();
//!
//!     manager.stop().await;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod credential;
pub mod token_manager;
pub mod traits;

pub use client::{ExchangeError, OAuthClient, EXCHANGE_TIMEOUT, TOKEN_ROUTE};
pub use credential::{ClientCredentials, Credential, CredentialFormat};
pub use token_manager::{
    AcquisitionHandle, RenewalPolicy, TokenAccessor, TokenLifecycleManager, TokenManagerError,
    TokenState,
};
pub use traits::CredentialExchange;
