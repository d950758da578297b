//! Error types used throughout the client

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for wwsdk
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum SdkError {
    /// App id or secret failed the pre-flight shape check. No request was made.
    #[error("Invalid credential format: {0}")]
    InvalidCredentialFormat(String),

    /// No token has been acquired yet; the first exchange is still running.
    #[error("Token acquisition in progress")]
    AcquisitionInProgress,

    /// Token acquisition gave up after exhausting its retries.
    #[error("Token acquisition failed: {0}")]
    AcquisitionFailed(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    /// The server answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Invalid field specification: {0}")]
    InvalidFieldSpec(String),

    /// A required property was absent from a response envelope.
    #[error("Missing property '{0}' in response")]
    MissingProperty(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl SdkError {
    /// Stable label suitable for structured log fields.
    pub fn label(&self) -> &'static str {
        match self {
            Self::InvalidCredentialFormat(_) => "invalid_credential_format",
            Self::AcquisitionInProgress => "acquisition_in_progress",
            Self::AcquisitionFailed(_) => "acquisition_failed",
            Self::Transport(_) => "transport",
            Self::Timeout(_) => "timeout",
            Self::Http { .. } => "http",
            Self::InvalidFieldSpec(_) => "invalid_field_spec",
            Self::MissingProperty(_) => "missing_property",
            Self::Config(_) => "config",
            Self::InvalidInput(_) => "invalid_input",
            Self::Serialization(_) => "serialization",
            Self::Io(_) => "io",
            Self::Internal(_) => "internal",
        }
    }
}

impl From<serde_json::Error> for SdkError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for SdkError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

/// Result type alias for wwsdk operations
pub type Result<T> = std::result::Result<T, SdkError>;
