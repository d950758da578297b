//! Client configuration

use serde::{Deserialize, Serialize};

use crate::constants::{APP_ID_LENGTH, APP_SECRET_LENGTH, DEFAULT_BASE_URL};
use crate::errors::{Result, SdkError};
use crate::impl_domain_status_conversions;

/// Log verbosity recognised by the client.
///
/// `Debug` additionally enables raw request/response tracing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Verbose,
    Debug,
}

impl_domain_status_conversions!(LogLevel {
    Error => "error",
    Warn => "warn",
    Info => "info",
    Verbose => "verbose",
    Debug => "debug",
});

impl LogLevel {
    /// The `tracing` level this verbosity maps onto.
    pub fn tracing_level(self) -> tracing::Level {
        match self {
            Self::Error => tracing::Level::ERROR,
            Self::Warn => tracing::Level::WARN,
            Self::Info => tracing::Level::INFO,
            Self::Verbose => tracing::Level::DEBUG,
            Self::Debug => tracing::Level::TRACE,
        }
    }

    /// Whether raw request/response bodies should be traced.
    pub fn traces_http(self) -> bool {
        self == Self::Debug
    }
}

/// App credentials used for the client-credentials exchange.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppCredentials {
    pub app_id: String,
    #[serde(skip_serializing)]
    pub app_secret: String,
}

impl std::fmt::Debug for AppCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppCredentials")
            .field("app_id", &self.app_id)
            .field("app_secret", &"***")
            .finish()
    }
}

impl AppCredentials {
    pub fn new(app_id: impl Into<String>, app_secret: impl Into<String>) -> Self {
        Self { app_id: app_id.into(), app_secret: app_secret.into() }
    }

    /// Pre-flight shape check: both values present and of the platform's
    /// fixed lengths.
    pub fn validate(&self) -> Result<()> {
        if self.app_id.chars().count() != APP_ID_LENGTH {
            return Err(SdkError::InvalidCredentialFormat(format!(
                "app id '{}' must be {APP_ID_LENGTH} characters",
                self.app_id
            )));
        }
        if self.app_secret.chars().count() != APP_SECRET_LENGTH {
            return Err(SdkError::InvalidCredentialFormat(format!(
                "app secret must be {APP_SECRET_LENGTH} characters"
            )));
        }
        Ok(())
    }
}

/// Application configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct SdkConfig {
    #[serde(default)]
    pub app_id: Option<String>,
    #[serde(default, skip_serializing)]
    pub app_secret: Option<String>,
    /// Pre-issued bearer token; bypasses acquisition when present.
    #[serde(default, skip_serializing)]
    pub token: Option<String>,
    #[serde(default)]
    pub log_level: LogLevel,
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl std::fmt::Debug for SdkConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SdkConfig")
            .field("app_id", &self.app_id)
            .field("app_secret", &self.app_secret.as_ref().map(|_| "***"))
            .field("token", &self.token.as_ref().map(|_| "***"))
            .field("log_level", &self.log_level)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl Default for SdkConfig {
    fn default() -> Self {
        Self {
            app_id: None,
            app_secret: None,
            token: None,
            log_level: LogLevel::default(),
            base_url: default_base_url(),
        }
    }
}

impl SdkConfig {
    /// Configuration authenticating with app credentials.
    pub fn with_credentials(app_id: impl Into<String>, app_secret: impl Into<String>) -> Self {
        Self {
            app_id: Some(app_id.into()),
            app_secret: Some(app_secret.into()),
            ..Self::default()
        }
    }

    /// Configuration using a pre-issued token.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self { token: Some(token.into()), ..Self::default() }
    }

    /// App credentials when both id and secret are configured.
    pub fn credentials(&self) -> Option<AppCredentials> {
        match (&self.app_id, &self.app_secret) {
            (Some(id), Some(secret)) => Some(AppCredentials::new(id.clone(), secret.clone())),
            _ => None,
        }
    }

    /// Check that the configuration can authenticate and the base URL parses.
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.base_url)
            .map_err(|e| SdkError::Config(format!("invalid base url '{}': {e}", self.base_url)))?;

        if self.token.is_some() {
            return Ok(());
        }

        match self.credentials() {
            Some(credentials) => credentials.validate(),
            None => Err(SdkError::Config(
                "either a token or both app_id and app_secret must be configured".to_string(),
            )),
        }
    }
}
