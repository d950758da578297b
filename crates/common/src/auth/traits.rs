//! Seam between the token lifecycle and the credential exchange endpoint.
//!
//! Abstracting the exchange lets the lifecycle manager be driven by a mock
//! in tests and keeps all HTTP concerns in [`super::client`].

use async_trait::async_trait;

use super::client::ExchangeError;
use super::credential::ClientCredentials;

/// Exchanges client credentials for a raw bearer token.
#[async_trait]
pub trait CredentialExchange: Send + Sync {
    /// Perform one `client_credentials` grant.
    ///
    /// # Returns
    /// The raw access token (a JWT) on success
    ///
    /// # Errors
    /// Returns error if the endpoint is unreachable or rejects the grant.
    /// Callers own any retry policy.
    async fn exchange(&self, credentials: &ClientCredentials) -> Result<String, ExchangeError>;
}
