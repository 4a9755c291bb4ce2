//! Error types for policy parsing and configuration loading.

// These warnings are false positives - the fields are used by derive macros
#![allow(unused_assignments)]

use miette::Diagnostic;
use thiserror::Error;

/// Result type for schema operations.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Errors that can occur while parsing policies or configuration.
#[derive(Error, Debug, Diagnostic)]
pub enum SchemaError {
    /// Error reading a file.
    #[error("failed to read file: {path}")]
    #[diagnostic(code(fetchgraph::schema::io_error))]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// TOML parsing error.
    #[error("failed to parse TOML")]
    #[diagnostic(code(fetchgraph::schema::toml_error))]
    TomlError {
        #[source]
        source: toml::de::Error,
    },

    /// A loading policy that could not be parsed.
    #[error("invalid loading policy `{value}`: {message}")]
    #[diagnostic(
        code(fetchgraph::schema::invalid_policy),
        help("expected one of: eager, lazy, join-fetch, subselect, batch(<size>)")
    )]
    InvalidPolicy { value: String, message: String },

    /// Configuration error.
    #[error("configuration error: {message}")]
    #[diagnostic(code(fetchgraph::schema::config_error))]
    ConfigError { message: String },
}

impl SchemaError {
    /// Create an invalid policy error.
    pub fn invalid_policy(value: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidPolicy {
            value: value.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }
}
