//! Logging for the client
//!
//! All diagnostics are `tracing` events. [`init_logging`] installs an fmt
//! subscriber behind a reloadable `EnvFilter`; raw request and response
//! bodies are emitted on the `wwsdk::http` target and only pass the filter
//! at [`LogLevel::Debug`](wwsdk_domain::LogLevel::Debug).

pub mod logging;

pub use logging::{filter_directive, init_logging, init_logging_from, LoggingHandle};
