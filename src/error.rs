//! Error Handling Infrastructure
//!
//! This module defines all error types used throughout grnsh.
//! Every error maps to a stable error code.
//!
//! # Error Categories
//! - `ProcessUnavailable`: the engine pipe is closed or broken, or the engine could not be launched
//! - `SchemaUnavailable`: the startup table listing failed
//! - `MalformedResponse`: a response did not have the expected shape (absorbed by formatters)
//! - `ScriptNotFound`: a batch script could not be opened
//! - `InvalidInput`: command text that cannot be sent as a single line
//! - `ConfigError`: configuration file or path resolution errors
//! - `Input`: line editor, history file or console input errors

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for grnsh operations
#[derive(Error, Debug)]
pub enum GrnshError {
    /// Engine process is gone or its pipes are unusable
    #[error("Engine unavailable: {0}")]
    ProcessUnavailable(String),

    /// Table listing at startup failed
    #[error("Schema unavailable: {0}")]
    SchemaUnavailable(String),

    /// Response did not match the expected shape
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Batch script could not be opened
    #[error("Script not found: {}: {source}", .path.display())]
    ScriptNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Command text cannot be transmitted
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration error (file unreadable, invalid JSON, no home directory)
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Line editor, history file or console input error
    #[error("Input error: {0}")]
    Input(String),
}

impl GrnshError {
    /// Convert error to a stable error code string
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::ProcessUnavailable(_) => "PROCESS_UNAVAILABLE",
            Self::SchemaUnavailable(_) => "SCHEMA_UNAVAILABLE",
            Self::MalformedResponse(_) => "MALFORMED_RESPONSE",
            Self::ScriptNotFound { .. } => "SCRIPT_NOT_FOUND",
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::ConfigError(_) => "CONFIG_ERROR",
            Self::Input(_) => "INPUT_ERROR",
        }
    }

    /// Whether the console must stop after this error
    ///
    /// Unopenable scripts and unsendable commands are reported and the
    /// session continues.
    /// Everything else ends the session.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        !matches!(self, Self::ScriptNotFound { .. } | Self::InvalidInput(_))
    }

    /// Create a process unavailable error
    pub fn process_unavailable(message: impl Into<String>) -> Self {
        Self::ProcessUnavailable(message.into())
    }

    /// Create a schema unavailable error
    pub fn schema_unavailable(message: impl Into<String>) -> Self {
        Self::SchemaUnavailable(message.into())
    }

    /// Create a malformed response error
    pub fn malformed_response(message: impl Into<String>) -> Self {
        Self::MalformedResponse(message.into())
    }

    /// Create a script not found error
    pub fn script_not_found(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ScriptNotFound { path: path.into(), source }
    }

    /// Create an invalid input error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Create a configuration error
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError(message.into())
    }

    /// Create an input error
    pub fn input(message: impl Into<String>) -> Self {
        Self::Input(message.into())
    }
}

/// Result type alias for grnsh operations
pub type Result<T> = std::result::Result<T, GrnshError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(GrnshError::process_unavailable("test").error_code(), "PROCESS_UNAVAILABLE");
        assert_eq!(GrnshError::schema_unavailable("test").error_code(), "SCHEMA_UNAVAILABLE");
        assert_eq!(GrnshError::malformed_response("test").error_code(), "MALFORMED_RESPONSE");
        let missing = std::io::Error::from(std::io::ErrorKind::NotFound);
        assert_eq!(GrnshError::script_not_found("a.grn", missing).error_code(), "SCRIPT_NOT_FOUND");
        assert_eq!(GrnshError::invalid_input("test").error_code(), "INVALID_INPUT");
        assert_eq!(GrnshError::config_error("test").error_code(), "CONFIG_ERROR");
        assert_eq!(GrnshError::input("test").error_code(), "INPUT_ERROR");
    }

    #[test]
    fn test_error_messages() {
        let err = GrnshError::process_unavailable("broken pipe");
        assert!(err.to_string().contains("broken pipe"));

        let missing = std::io::Error::from(std::io::ErrorKind::NotFound);
        let err = GrnshError::script_not_found("load/users.grn", missing);
        assert!(err.to_string().contains("load/users.grn"));
    }

    #[test]
    fn test_fatality() {
        let missing = std::io::Error::from(std::io::ErrorKind::NotFound);
        assert!(!GrnshError::script_not_found("a.grn", missing).is_fatal());
        assert!(!GrnshError::invalid_input("two\nlines").is_fatal());
        assert!(GrnshError::process_unavailable("gone").is_fatal());
        assert!(GrnshError::schema_unavailable("gone").is_fatal());
    }
}
