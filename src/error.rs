//! Error types for the bridge.
//!
//! This module defines the decode-failure taxonomy and the main error type
//! used throughout the crate, plus stable error codes for metrics labels.

/// Reasons an inbound message fails decoding.
///
/// Every variant maps to a malformed request; none of them ever reaches the
/// process executor.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// The message is not a JSON object.
    #[error("message is not an object")]
    NotAnObject,

    /// The `correlationId` field is absent.
    #[error("correlationId is missing")]
    MissingCorrelationId,

    /// The `correlationId` field is present but not a string.
    #[error("correlationId is not a string")]
    InvalidCorrelationId,

    /// The `command` field is absent.
    #[error("command is missing")]
    MissingCommand,

    /// The `command` field is present but not an array.
    #[error("command is not an array")]
    InvalidCommand,

    /// The `command` array has zero elements.
    #[error("command array is empty")]
    EmptyCommand,

    /// A `command` element has no string representation.
    #[error("command[{index}] cannot be represented as a string")]
    UnsupportedArgument {
        /// Zero-based index of the offending element.
        index: usize,
    },
}

impl DecodeError {
    /// Stable SCREAMING_SNAKE code for metrics and log labels.
    pub fn code(&self) -> &'static str {
        match self {
            DecodeError::NotAnObject => "NOT_AN_OBJECT",
            DecodeError::MissingCorrelationId => "MISSING_CORRELATION_ID",
            DecodeError::InvalidCorrelationId => "INVALID_CORRELATION_ID",
            DecodeError::MissingCommand => "MISSING_COMMAND",
            DecodeError::InvalidCommand => "INVALID_COMMAND",
            DecodeError::EmptyCommand => "EMPTY_COMMAND",
            DecodeError::UnsupportedArgument { .. } => "UNSUPPORTED_ARGUMENT",
        }
    }
}

/// Main error type for bridge operations.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// The inbound message failed validation.
    #[error("malformed request: {0}")]
    MalformedRequest(#[from] DecodeError),

    /// The operating system could not create the child process.
    ///
    /// A child that starts and then misbehaves is not a spawn failure; it is
    /// reported through the exit code instead.
    #[error("failed to spawn '{program}': {source}")]
    SpawnFailed {
        /// The program name that was handed to the OS.
        program: String,
        /// The underlying OS error.
        #[source]
        source: std::io::Error,
    },

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

impl BridgeError {
    /// Stable SCREAMING_SNAKE code for metrics and log labels.
    pub fn code(&self) -> &'static str {
        match self {
            BridgeError::MalformedRequest(e) => e.code(),
            BridgeError::SpawnFailed { .. } => "SPAWN_FAILED",
            BridgeError::Config(_) => "INVALID_CONFIG",
        }
    }
}

/// Result type alias for bridge operations.
pub type Result<T> = std::result::Result<T, BridgeError>;
