//! Client credentials and the bearer credential they are exchanged for.

use std::fmt;
use std::time::Duration;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde_json::Value;

use super::token_manager::TokenManagerError;

/// Expected shape of the platform's application credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CredentialFormat {
    pub client_id_len: usize,
    pub client_secret_len: usize,
}

impl Default for CredentialFormat {
    fn default() -> Self {
        Self { client_id_len: 36, client_secret_len: 28 }
    }
}

/// Application id and secret used for the `client_credentials` grant.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: String,
}

impl ClientCredentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self { client_id: client_id.into(), client_secret: client_secret.into() }
    }

    /// Check both halves against `format` without touching the network.
    ///
    /// # Errors
    /// Returns [`TokenManagerError::InvalidCredentialFormat`] naming the
    /// offending half.
    pub fn validate(&self, format: &CredentialFormat) -> Result<(), TokenManagerError> {
        check_len("client id", &self.client_id, format.client_id_len)?;
        check_len("client secret", &self.client_secret, format.client_secret_len)
    }
}

fn check_len(what: &str, value: &str, expected: usize) -> Result<(), TokenManagerError> {
    if value.is_empty() {
        return Err(TokenManagerError::InvalidCredentialFormat(format!("{what} is empty")));
    }
    let actual = value.chars().count();
    if actual != expected {
        return Err(TokenManagerError::InvalidCredentialFormat(format!(
            "{what} has length {actual}, expected {expected}"
        )));
    }
    Ok(())
}

impl fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"***")
            .finish()
    }
}

/// A bearer token and the instant it stops being accepted.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl Credential {
    pub fn new(token: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self { token: token.into(), expires_at }
    }

    /// Build a credential from a JWT, reading expiry from its `exp` claim.
    ///
    /// The signature is not verified; the token is opaque to this client
    /// apart from its lifetime.
    ///
    /// # Errors
    /// Returns [`TokenManagerError::InvalidToken`] when the token is not a
    /// three-part JWT or carries no numeric `exp`.
    pub fn from_jwt(token: impl Into<String>) -> Result<Self, TokenManagerError> {
        let token = token.into();

        let payload = token
            .split('.')
            .nth(1)
            .filter(|part| !part.is_empty())
            .ok_or_else(|| TokenManagerError::InvalidToken("token is not a JWT".to_string()))?;

        let decoded = URL_SAFE_NO_PAD
            .decode(payload.trim_end_matches('='))
            .map_err(|e| TokenManagerError::InvalidToken(format!("payload is not base64: {e}")))?;

        let claims: Value = serde_json::from_slice(&decoded)
            .map_err(|e| TokenManagerError::InvalidToken(format!("payload is not JSON: {e}")))?;

        let exp = claims
            .get("exp")
            .and_then(|exp| exp.as_i64().or_else(|| exp.as_f64().map(|f| f as i64)))
            .ok_or_else(|| TokenManagerError::InvalidToken("missing exp claim".to_string()))?;

        let expires_at = DateTime::from_timestamp(exp, 0)
            .ok_or_else(|| TokenManagerError::InvalidToken(format!("exp {exp} out of range")))?;

        Ok(Self { token, expires_at })
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// Time from `now` until the credential should be renewed, `renew_before`
    /// ahead of expiry. Clamped to zero.
    ///
    /// Computed in whole seconds, matching the resolution of `exp`.
    pub fn renewal_delay(&self, now: DateTime<Utc>, renew_before: Duration) -> Duration {
        let remaining = self.expires_at.timestamp() - now.timestamp();
        let renew_before = i64::try_from(renew_before.as_secs()).unwrap_or(i64::MAX);
        let secs = remaining.saturating_sub(renew_before).max(0);
        Duration::from_secs(u64::try_from(secs).unwrap_or(0))
    }

    /// `Bearer <token>` header value.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("token", &"***")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}
