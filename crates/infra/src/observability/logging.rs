//! Subscriber installation and runtime verbosity changes

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, reload, EnvFilter, Registry};
use wwsdk_domain::{LogLevel, SdkConfig, SdkError};

use crate::api::HTTP_TRACE_TARGET;

/// Filter directive for `level`.
///
/// Raw HTTP bodies are switched off below `debug` so they never reach the
/// output, whatever the global level.
pub fn filter_directive(level: LogLevel) -> String {
    let base = level.tracing_level().as_str().to_ascii_lowercase();
    let http = if level.traces_http() { "trace" } else { "off" };
    format!("{base},{HTTP_TRACE_TARGET}={http}")
}

/// Handle returned by [`init_logging`] for adjusting verbosity later.
#[derive(Clone)]
pub struct LoggingHandle {
    filter: reload::Handle<EnvFilter, Registry>,
}

impl LoggingHandle {
    /// Swap the active filter for `level`.
    ///
    /// # Errors
    /// Returns [`SdkError::Internal`] if the subscriber has been dropped.
    pub fn set_level(&self, level: LogLevel) -> Result<(), SdkError> {
        self.filter
            .reload(EnvFilter::new(filter_directive(level)))
            .map_err(|e| SdkError::Internal(format!("failed to reload log filter: {e}")))?;
        tracing::debug!(%level, "Log level changed");
        Ok(())
    }

    /// Switch to the level carried by `config`.
    pub fn apply(&self, config: &SdkConfig) -> Result<(), SdkError> {
        self.set_level(config.log_level)
    }

    /// The directive currently in effect.
    pub fn current(&self) -> Option<String> {
        self.filter.with_current(ToString::to_string).ok()
    }
}

impl std::fmt::Debug for LoggingHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoggingHandle").field("filter", &self.current()).finish()
    }
}

fn reloadable(level: LogLevel) -> (reload::Layer<EnvFilter, Registry>, LoggingHandle) {
    let (layer, filter) = reload::Layer::new(EnvFilter::new(filter_directive(level)));
    (layer, LoggingHandle { filter })
}

/// Install the global fmt subscriber at `level`.
///
/// # Errors
/// Returns [`SdkError::Config`] if a global subscriber is already set.
pub fn init_logging(level: LogLevel) -> Result<LoggingHandle, SdkError> {
    let (filter, handle) = reloadable(level);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .try_init()
        .map_err(|e| SdkError::Config(format!("failed to install logging: {e}")))?;

    Ok(handle)
}

/// Install the global fmt subscriber at the level carried by `config`.
///
/// ```no_run
/// let config = wwsdk_infra::config::load()?;
/// let _logging = wwsdk_infra::init_logging_from(&config)?;
/// # Ok::<(), wwsdk_domain::SdkError>(())
/// ```
pub fn init_logging_from(config: &SdkConfig) -> Result<LoggingHandle, SdkError> {
    init_logging(config.log_level)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directives_follow_level_mapping() {
        assert_eq!(filter_directive(LogLevel::Error), "error,wwsdk::http=off");
        assert_eq!(filter_directive(LogLevel::Info), "info,wwsdk::http=off");
        assert_eq!(filter_directive(LogLevel::Verbose), "debug,wwsdk::http=off");
        assert_eq!(filter_directive(LogLevel::Debug), "trace,wwsdk::http=trace");
    }

    #[test]
    fn handle_reloads_while_subscriber_is_alive() {
        let (filter, handle) = reloadable(LogLevel::Warn);
        let subscriber = tracing_subscriber::registry().with(filter);
        let _guard = tracing::subscriber::set_default(subscriber);

        assert!(handle.current().unwrap().contains("warn"));
        handle.set_level(LogLevel::Debug).unwrap();
        assert!(handle.current().unwrap().contains("wwsdk::http=trace"));
    }

    #[test]
    fn handle_applies_configured_level() {
        let (filter, handle) = reloadable(LogLevel::Error);
        let subscriber = tracing_subscriber::registry().with(filter);
        let _guard = tracing::subscriber::set_default(subscriber);

        let config = SdkConfig { log_level: LogLevel::Verbose, ..SdkConfig::with_token("t") };
        handle.apply(&config).unwrap();
        let current = handle.current().unwrap();
        assert!(current.contains("debug"));
        assert!(current.contains("wwsdk::http=off"));
    }

    #[test]
    fn reload_fails_once_subscriber_is_gone() {
        let (filter, handle) = reloadable(LogLevel::Info);
        drop(tracing_subscriber::registry().with(filter));
        assert!(matches!(handle.set_level(LogLevel::Error), Err(SdkError::Internal(_))));
    }
}
