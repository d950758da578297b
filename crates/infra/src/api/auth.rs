//! Bearer token sources for the dispatcher
//!
//! The dispatcher reads a token through [`AccessTokenProvider`] on every call,
//! so whichever credential was committed last is the one sent.

use std::fmt;

use async_trait::async_trait;
use wwsdk_common::auth::TokenAccessor;
use wwsdk_domain::SdkError;

use crate::errors::to_sdk;

/// Trait for providing access tokens
///
/// This trait allows dependency injection and testing with mock providers.
#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    /// Get the current access token.
    ///
    /// Must not wait on an in-flight acquisition.
    async fn access_token(&self) -> Result<String, SdkError>;
}

/// A pre-issued token supplied by configuration. Never renewed.
#[derive(Clone)]
pub struct StaticToken {
    token: String,
}

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self { token: token.into() }
    }
}

impl fmt::Debug for StaticToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticToken").field("token", &"***").finish()
    }
}

#[async_trait]
impl AccessTokenProvider for StaticToken {
    async fn access_token(&self) -> Result<String, SdkError> {
        Ok(self.token.clone())
    }
}

/// Token owned by a running `TokenLifecycleManager`.
#[derive(Debug, Clone)]
pub struct ManagedToken {
    accessor: TokenAccessor,
}

impl ManagedToken {
    pub fn new(accessor: TokenAccessor) -> Self {
        Self { accessor }
    }

    pub fn accessor(&self) -> &TokenAccessor {
        &self.accessor
    }
}

#[async_trait]
impl AccessTokenProvider for ManagedToken {
    async fn access_token(&self) -> Result<String, SdkError> {
        self.accessor.current_token().map(|credential| credential.token).map_err(to_sdk)
    }
}
