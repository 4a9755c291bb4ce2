//! Error types for store and session operations.
//!
//! Every error carries an [`ErrorCode`] for programmatic handling, a message,
//! and optional context with suggestions.
//!
//! # Error Codes
//!
//! Error codes follow a pattern: F{category}{number}
//! - 2xxx: Constraint violations (missing foreign key target)
//! - 4xxx: Session errors (session closed, entity detached)
//! - 7xxx: Configuration errors
//!
//! ```rust
//! use fetchgraph_query::{ErrorCode, QueryError};
//!
//! let err = QueryError::session_closed("Artist.songs");
//! assert_eq!(err.code, ErrorCode::SessionClosed);
//! assert_eq!(err.code.code(), "F4004");
//! assert!(err.is_session_closed());
//! ```

use std::fmt;
use thiserror::Error;

use fetchgraph_schema::SchemaError;

/// Result type for query operations.
pub type QueryResult<T> = Result<T, QueryError>;

/// Error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Constraint errors (2xxx)
    /// A foreign key references a record that does not exist (F2002).
    ForeignKeyNotFound = 2002,

    // Session errors (4xxx)
    /// The owning session was closed, dropped or cleared (F4004).
    SessionClosed = 4004,

    // Configuration errors (7xxx)
    /// Invalid configuration (F7001).
    InvalidConfiguration = 7001,
}

impl ErrorCode {
    /// Get the error code string (e.g., "F2002").
    pub fn code(&self) -> String {
        format!("F{}", *self as u16)
    }

    /// Get a short description of the error code.
    pub fn description(&self) -> &'static str {
        match self {
            Self::ForeignKeyNotFound => "Referenced record not found",
            Self::SessionClosed => "Session closed",
            Self::InvalidConfiguration => "Invalid configuration",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Additional context for an error.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// The operation that was being performed.
    pub operation: Option<String>,
    /// The entity involved.
    pub model: Option<String>,
    /// The field involved.
    pub field: Option<String>,
    /// Suggestions for fixing the error.
    pub suggestions: Vec<String>,
    /// Help text.
    pub help: Option<String>,
}

/// Errors that can occur during store and session operations.
#[derive(Error, Debug)]
pub struct QueryError {
    /// The error code.
    pub code: ErrorCode,
    /// The error message.
    pub message: String,
    /// Additional context.
    pub context: ErrorContext,
    /// The source error (if any).
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.code(), self.message)
    }
}

impl QueryError {
    /// Create a new error with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: ErrorContext::default(),
            source: None,
        }
    }

    /// Add context about the operation.
    pub fn with_context(mut self, operation: impl Into<String>) -> Self {
        self.context.operation = Some(operation.into());
        self
    }

    /// Add a suggestion for fixing the error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.context.suggestions.push(suggestion.into());
        self
    }

    /// Add help text.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.context.help = Some(help.into());
        self
    }

    /// Set the entity.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.context.model = Some(model.into());
        self
    }

    /// Set the field.
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.context.field = Some(field.into());
        self
    }

    /// Set the source error.
    pub fn with_source<E: std::error::Error + Send + Sync + 'static>(mut self, source: E) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    // ============== Constructor Functions ==============

    /// Create an error for an insert whose foreign key has no target row.
    pub fn not_found(
        model: impl Into<String>,
        field: impl Into<String>,
        key: impl fmt::Display,
    ) -> Self {
        let model = model.into();
        let field = field.into();
        Self::new(
            ErrorCode::ForeignKeyNotFound,
            format!("{}.{} references missing record {}", model, field, key),
        )
        .with_model(&model)
        .with_field(&field)
        .with_suggestion("Insert the referenced record before the rows that point at it")
    }

    /// Create an error for work attempted after the owning session ended.
    pub fn session_closed(operation: impl Into<String>) -> Self {
        let operation = operation.into();
        Self::new(
            ErrorCode::SessionClosed,
            format!("Cannot run {}: the owning session is closed", operation),
        )
        .with_context(&operation)
        .with_suggestion("Access lazy collections before closing the session")
        .with_help("Use an eager, join-fetch, subselect or batch policy to load songs up front")
    }

    /// Create an invalid configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidConfiguration, message)
    }


    // ============== Error Type Checks ==============

    /// Check if this is a missing-record error.
    pub fn is_not_found(&self) -> bool {
        matches!(self.code, ErrorCode::ForeignKeyNotFound)
    }

    /// Check if this error comes from using a closed session.
    pub fn is_session_closed(&self) -> bool {
        matches!(self.code, ErrorCode::SessionClosed)
    }

    /// Display the full error with all context and suggestions.
    pub fn display_full(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("Error [{}]: {}\n", self.code.code(), self.message));

        if let Some(ref op) = self.context.operation {
            output.push_str(&format!("  → While: {}\n", op));
        }
        if let Some(ref model) = self.context.model {
            output.push_str(&format!("  → Model: {}\n", model));
        }
        if let Some(ref field) = self.context.field {
            output.push_str(&format!("  → Field: {}\n", field));
        }

        if !self.context.suggestions.is_empty() {
            output.push_str("\nSuggestions:\n");
            for (i, suggestion) in self.context.suggestions.iter().enumerate() {
                output.push_str(&format!("  {}. {}\n", i + 1, suggestion));
            }
        }

        if let Some(ref help) = self.context.help {
            output.push_str(&format!("\nHelp: {}\n", help));
        }

        output
    }
}

impl From<SchemaError> for QueryError {
    fn from(err: SchemaError) -> Self {
        QueryError::invalid_config(err.to_string()).with_source(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_format() {
        assert_eq!(ErrorCode::ForeignKeyNotFound.code(), "F2002");
        assert_eq!(ErrorCode::SessionClosed.code(), "F4004");
        assert_eq!(ErrorCode::InvalidConfiguration.to_string(), "F7001");
    }

    #[test]
    fn test_not_found_error() {
        let err = QueryError::not_found("Song", "artist_id", 42);
        assert!(err.is_not_found());
        assert!(!err.is_session_closed());
        assert_eq!(err.to_string(), "[F2002] Song.artist_id references missing record 42");
        assert_eq!(err.context.field.as_deref(), Some("artist_id"));
    }

    #[test]
    fn test_session_closed_error() {
        let err = QueryError::session_closed("Artist.songs");
        assert!(err.is_session_closed());
        assert_eq!(err.context.operation.as_deref(), Some("Artist.songs"));
        assert!(err.context.help.is_some());
    }

    #[test]
    fn test_display_full() {
        let err = QueryError::session_closed("Artist.songs");
        let full = err.display_full();
        assert!(full.contains("F4004"));
        assert!(full.contains("While: Artist.songs"));
        assert!(full.contains("Suggestions:"));
        assert!(full.contains("Help:"));
    }

    #[test]
    fn test_from_schema_error() {
        let schema_err = SchemaError::invalid_policy("batch(0)", "batch size must be at least 1");
        let err: QueryError = schema_err.into();
        assert_eq!(err.code, ErrorCode::InvalidConfiguration);
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_description() {
        assert_eq!(ErrorCode::SessionClosed.description(), "Session closed");
        assert_eq!(ErrorCode::ForeignKeyNotFound.description(), "Referenced record not found");
    }
}
