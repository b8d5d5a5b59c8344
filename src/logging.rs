//! Logging configuration for Crimewatch.
//!
//! Logs go to stderr with an env-filterable level; request-level logging is
//! handled by the HTTP layer's trace middleware.

use tracing_subscriber::EnvFilter;

/// Initializes stderr logging.
///
/// The level defaults to `info` and can be overridden with `RUST_LOG`.
pub fn init() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}
