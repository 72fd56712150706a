//! Logging setup shared by every binary and test harness in the workspace.

/// Initialize process-wide logging from the environment.
///
/// Safe to call multiple times; subsequent calls are no-ops. An unreadable
/// configuration falls back to the defaults.
pub fn init() {
    tracing::init();
}

/// Like [`init`], but routes output through the test harness capture.
pub fn init_for_tests() {
    tracing::init_for_tests();
}

/// Environment-driven logging configuration.
pub mod config;

/// Subscriber installation (filters, formatters).
pub mod tracing;

pub use config::{ConfigError, LogFormat, ObservabilityConfig};
