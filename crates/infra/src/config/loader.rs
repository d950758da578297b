//! Configuration loader
//!
//! Loads client configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. A `.env` file in the working directory is applied to the environment
//! 2. Environment variables are read; they win when they can authenticate
//! 3. Otherwise multiple paths are probed for a config file
//! 4. JSON and TOML formats are supported
//!
//! ## Environment Variables
//! - `WWS_APP_ID`: application id
//! - `WWS_APP_SECRET`: application secret
//! - `WWS_TOKEN`: pre-issued bearer token (bypasses acquisition)
//! - `WWS_LOG_LEVEL`: `error`, `warn`, `info`, `verbose` or `debug`
//! - `WWS_BASE_URL`: platform base URL
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./wwsdk.json` or `./wwsdk.toml` (current working directory)
//! 2. `./config.json` or `./config.toml` (current working directory)
//! 3. The same names in the parent and grandparent directories

use std::path::{Path, PathBuf};

use wwsdk_domain::{LogLevel, Result, SdkConfig, SdkError};

pub const ENV_APP_ID: &str = "WWS_APP_ID";
pub const ENV_APP_SECRET: &str = "WWS_APP_SECRET";
pub const ENV_TOKEN: &str = "WWS_TOKEN";
pub const ENV_LOG_LEVEL: &str = "WWS_LOG_LEVEL";
pub const ENV_BASE_URL: &str = "WWS_BASE_URL";

const FILE_NAMES: [&str; 4] = ["wwsdk.json", "wwsdk.toml", "config.json", "config.toml"];

/// Load configuration with automatic fallback strategy
///
/// Applies `.env`, then tries environment variables, then falls back to a
/// config file.
///
/// # Errors
/// Returns `SdkError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - The loaded configuration cannot authenticate
pub fn load() -> Result<SdkConfig> {
    if let Ok(path) = dotenvy::dotenv() {
        tracing::debug!(path = %path.display(), "Applied .env file");
    }

    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = %e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// Either `WWS_TOKEN` or both `WWS_APP_ID` and `WWS_APP_SECRET` must be set.
///
/// # Errors
/// Returns `SdkError::Config` when neither is present or a value is invalid,
/// and `SdkError::InvalidCredentialFormat` for malformed credentials.
pub fn load_from_env() -> Result<SdkConfig> {
    let mut config = SdkConfig {
        app_id: env_opt(ENV_APP_ID),
        app_secret: env_opt(ENV_APP_SECRET),
        token: env_opt(ENV_TOKEN),
        ..SdkConfig::default()
    };

    if let Some(level) = env_opt(ENV_LOG_LEVEL) {
        config.log_level = level
            .parse::<LogLevel>()
            .map_err(|e| SdkError::Config(format!("{ENV_LOG_LEVEL}: {e}")))?;
    }

    if let Some(base_url) = env_opt(ENV_BASE_URL) {
        config.base_url = base_url;
    }

    config.validate()?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `SdkError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
pub fn load_from_file(path: Option<PathBuf>) -> Result<SdkConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(SdkError::Config(format!("Config file not found: {}", p.display())));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            SdkError::Config("No config file found in any of the standard locations".to_string())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| SdkError::Config(format!("Failed to read config file: {e}")))?;

    let config = parse_config(&contents, &config_path)?;
    config.validate()?;
    Ok(config)
}

/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<SdkConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| SdkError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| SdkError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(SdkError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe multiple paths for configuration files
///
/// Searches the current working directory and up to two parents for
/// `wwsdk.{json,toml}` and `config.{json,toml}`.
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    probe_from(&cwd)
}

fn probe_from(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .take(3)
        .flat_map(|dir| FILE_NAMES.iter().map(move |name| dir.join(name)))
        .find(|path| path.exists())
}

/// Non-empty environment variable.
fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}
