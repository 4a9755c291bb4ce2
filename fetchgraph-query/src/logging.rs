//! Logging infrastructure for fetchgraph.
//!
//! This module provides structured logging controlled by the `FETCHGRAPH_DEBUG`
//! environment variable.
//!
//! # Environment Variables
//!
//! - `FETCHGRAPH_DEBUG=true` - Enable debug logging
//! - `FETCHGRAPH_DEBUG=1` - Enable debug logging
//! - `FETCHGRAPH_LOG_LEVEL=debug|info|warn|error|trace` - Set specific log level
//! - `FETCHGRAPH_LOG_FORMAT=json|pretty|compact` - Set output format (default: json)
//!
//! # Usage
//!
//! ```rust,no_run
//! use fetchgraph_query::logging;
//!
//! // Initialize logging (call once at startup)
//! logging::init();
//! ```
//!
//! # Emitted Events
//!
//! - `debug` for every fetch issued against the row store (kind, keys, rows)
//! - `trace` for identity-map hits
//! - `info` for session open and close
//! - `warn` when a single load issues more child fetches than the configured
//!   N+1 threshold

use std::env;
use std::sync::Once;

static INIT: Once = Once::new();

/// Check if debug logging is enabled via `FETCHGRAPH_DEBUG`.
///
/// Returns `true` if `FETCHGRAPH_DEBUG` is set to "true", "1", or "yes" (case-insensitive).
#[inline]
pub fn is_debug_enabled() -> bool {
    env::var("FETCHGRAPH_DEBUG")
        .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"))
        .unwrap_or(false)
}

/// Normalize a level name, returning `None` for anything unrecognized.
fn parse_level(level: &str) -> Option<&'static str> {
    match level.to_lowercase().as_str() {
        "trace" => Some("trace"),
        "debug" => Some("debug"),
        "info" => Some("info"),
        "warn" => Some("warn"),
        "error" => Some("error"),
        _ => None,
    }
}

/// Get the configured log level from `FETCHGRAPH_LOG_LEVEL`.
///
/// Defaults to "debug" if `FETCHGRAPH_DEBUG` is enabled, otherwise "warn".
pub fn get_log_level() -> &'static str {
    env::var("FETCHGRAPH_LOG_LEVEL")
        .ok()
        .and_then(|level| parse_level(&level))
        .unwrap_or_else(|| if is_debug_enabled() { "debug" } else { "warn" })
}

/// Get the configured log format from `FETCHGRAPH_LOG_FORMAT`.
///
/// Defaults to "json" for structured logging.
pub fn get_log_format() -> &'static str {
    env::var("FETCHGRAPH_LOG_FORMAT")
        .map(|f| match f.to_lowercase().as_str() {
            "pretty" => "pretty",
            "compact" => "compact",
            _ => "json",
        })
        .unwrap_or("json")
}

/// Initialize the fetchgraph logging system.
///
/// Does nothing unless `FETCHGRAPH_DEBUG` or `FETCHGRAPH_LOG_LEVEL` is set.
/// Subsequent calls are no-ops.
pub fn init() {
    if !is_debug_enabled() && env::var("FETCHGRAPH_LOG_LEVEL").is_err() {
        return;
    }
    install(get_log_level());
}

/// Initialize logging with a specific level, ignoring the environment.
///
/// Unrecognized levels fall back to "warn".
pub fn init_with_level(level: &str) {
    install(parse_level(level).unwrap_or("warn"));
}

fn install(level: &'static str) {
    INIT.call_once(|| {
        #[cfg(feature = "tracing-subscriber")]
        {
            use tracing_subscriber::{EnvFilter, fmt, prelude::*};

            let filter = EnvFilter::try_new(format!(
                "fetchgraph={},fetchgraph_query={},fetchgraph_schema={}",
                level, level, level
            ))
            .unwrap_or_else(|_| EnvFilter::new("warn"));

            let installed = match get_log_format() {
                "json" => tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt::layer().json())
                    .try_init(),
                "compact" => tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt::layer().compact())
                    .try_init(),
                _ => tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt::layer().pretty())
                    .try_init(),
            };

            if installed.is_ok() {
                tracing::info!(
                    level = level,
                    format = get_log_format(),
                    "fetchgraph logging initialized"
                );
            }
        }

        #[cfg(not(feature = "tracing-subscriber"))]
        {
            // Without the subscriber feature, events reach whatever
            // subscriber the application installs.
            let _ = level;
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("TRACE"), Some("trace"));
        assert_eq!(parse_level("Warn"), Some("warn"));
        assert_eq!(parse_level("loud"), None);
    }

    #[test]
    fn test_log_format_default() {
        if env::var("FETCHGRAPH_LOG_FORMAT").is_err() {
            assert_eq!(get_log_format(), "json");
        }
    }

    #[test]
    fn test_log_level_default() {
        if env::var("FETCHGRAPH_DEBUG").is_err() && env::var("FETCHGRAPH_LOG_LEVEL").is_err() {
            assert!(!is_debug_enabled());
            assert_eq!(get_log_level(), "warn");
        }
    }

    #[test]
    fn test_init_is_idempotent() {
        init_with_level("debug");
        init_with_level("trace");
        init();
    }
}
