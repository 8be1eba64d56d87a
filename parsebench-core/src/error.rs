//! Custom error types for parsebench.
//!
//! Explicit enum error types only. Input errors reject the whole run,
//! adapter errors are embedded in the affected library's result.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for the benchmark engine.
#[derive(Debug, Error)]
pub enum EngineError {
    // =========================================================================
    // Input Errors - Fatal to the Whole Run
    // =========================================================================
    #[error("validation error: {0}")]
    InvalidMessage(#[source] ValidationError),

    #[error("config error: {0}")]
    InvalidConfig(#[source] ValidationError),

    // =========================================================================
    // Configuration File Errors - Fail-Fast at Startup
    // =========================================================================
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    #[error("Configuration parse error: {message}")]
    ConfigParse { message: String },

    #[error("Invalid setting: {field} = {value} - {reason}")]
    InvalidSetting {
        field: &'static str,
        value: String,
        reason: String,
    },

    // =========================================================================
    // Run Lifecycle Errors
    // =========================================================================
    #[error("Invalid run state transition: {0}")]
    InvalidStateTransition(#[from] StateTransitionError),

    // =========================================================================
    // System Errors
    // =========================================================================
    #[error("IO error: {context} - {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
}

/// Violations found while checking a message or a run configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("HTTP message cannot be empty")]
    EmptyMessage,

    #[error("message size {size} exceeds maximum of {max} bytes")]
    TooLarge { size: usize, max: usize },

    #[error("unable to detect message type from first line: {first_line}")]
    UndetectableType { first_line: String },

    #[error("message_type must be 'request' or 'response', got '{value}'")]
    InvalidType { value: String },

    #[error("invalid HTTP message format: {reason}")]
    MalformedMessage { reason: String },

    #[error("{field} = {value} is out of range: {bound}")]
    OutOfRange {
        field: &'static str,
        value: String,
        bound: String,
    },
}

/// Failures raised by the adapter registry or by an adapter's parse routine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdapterError {
    #[error("adapter '{name}' not found")]
    NotFound { name: String },

    #[error("Parse error: {reason}")]
    Parse { reason: String },
}

impl AdapterError {
    /// Shorthand for a parse failure.
    pub fn parse(reason: impl Into<String>) -> Self {
        Self::Parse {
            reason: reason.into(),
        }
    }
}

/// Run lifecycle transition errors.
#[derive(Debug, Error)]
pub enum StateTransitionError {
    #[error("Cannot transition from {from} to {to}")]
    InvalidTransition {
        from: &'static str,
        to: &'static str,
    },

    #[error("Run is in terminal state: {state}")]
    TerminalState { state: &'static str },
}

/// Result type alias using EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
