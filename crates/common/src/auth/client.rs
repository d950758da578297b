//! OAuth 2.0 `client_credentials` client
//!
//! Posts the application id and secret to the platform's token endpoint and
//! returns the issued bearer token. One attempt per call; retry and renewal
//! live in [`super::token_manager`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use super::credential::ClientCredentials;
use super::traits::CredentialExchange;

/// Route of the token endpoint, relative to the platform base URL.
pub const TOKEN_ROUTE: &str = "oauth/token";

/// Upper bound on a single token request. A stalled endpoint counts as a
/// failed attempt once this elapses.
pub const EXCHANGE_TIMEOUT: Duration = Duration::from_secs(30);

/// Error type for credential exchange
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExchangeError {
    /// The endpoint could not be reached or the connection broke.
    #[error("Token request failed: {0}")]
    Transport(String),

    /// The endpoint answered with a status other than 200.
    #[error("Token request rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },

    /// A 200 response without a usable `access_token`.
    #[error("Invalid token response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Client for the token endpoint.
#[derive(Debug, Clone)]
pub struct OAuthClient {
    client: Client,
    token_url: String,
    timeout: Duration,
}

impl OAuthClient {
    /// Create a client for the platform at `base_url`.
    ///
    /// # Examples
    /// ```
    /// use wwsdk_common::auth::OAuthClient;
    ///
    /// let client = OAuthClient::new("https://api.watsonwork.ibm.com/");
    /// assert_eq!(client.token_url(), "https://api.watsonwork.ibm.com/oauth/token");
    /// ```
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self::with_timeout(base_url, EXCHANGE_TIMEOUT)
    }

    /// Create a client whose token requests give up after `timeout`.
    #[must_use]
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Self {
        let mut oauth = match Client::builder().timeout(timeout).build() {
            Ok(client) => Self::with_client(client, base_url),
            Err(e) => {
                warn!(error = %e, "Falling back to per-request timeout on default client");
                Self::with_client(Client::new(), base_url)
            }
        };
        oauth.timeout = timeout;
        oauth
    }

    /// Create a client that reuses an existing connection pool.
    ///
    /// Each token request is still bounded by [`EXCHANGE_TIMEOUT`].
    #[must_use]
    pub fn with_client(client: Client, base_url: &str) -> Self {
        let token_url = format!("{}/{TOKEN_ROUTE}", base_url.trim_end_matches('/'));
        Self { client, token_url, timeout: EXCHANGE_TIMEOUT }
    }

    pub fn token_url(&self) -> &str {
        &self.token_url
    }

    /// Per-request bound applied to every token request.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl CredentialExchange for OAuthClient {
    async fn exchange(&self, credentials: &ClientCredentials) -> Result<String, ExchangeError> {
        debug!(url = %self.token_url, client_id = %credentials.client_id, "Requesting access token");

        let response = self
            .client
            .post(&self.token_url)
            .basic_auth(&credentials.client_id, Some(&credentials.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ExchangeError::Transport(e.to_string()))?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_else(|e| {
                debug!(error = %e, "Failed to read token error body");
                String::new()
            });
            warn!(status = status.as_u16(), "Token endpoint rejected credentials");
            return Err(ExchangeError::Rejected { status: status.as_u16(), body });
        }

        let body: TokenResponse =
            response.json().await.map_err(|e| ExchangeError::InvalidResponse(e.to_string()))?;

        Ok(body.access_token)
    }
}
