//! Domain error types

use thiserror::Error;

/// Domain-level errors that can occur during validation or processing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The provided URL is invalid or malformed.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// A required header name is invalid.
    #[error("invalid header name: {0}")]
    InvalidHeaderName(String),

    /// A required header value is invalid.
    #[error("invalid header value: {0}")]
    InvalidHeaderValue(String),

    /// The HTTP method is not supported.
    #[error("unsupported HTTP method: {0}")]
    UnsupportedMethod(String),

    /// The request body could not be encoded.
    #[error("invalid body: {0}")]
    InvalidBody(String),

    /// The client configuration could not be loaded.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;

/// The body could not be decoded in the requested interpretation.
///
/// Raised when JSON-path or text checks run against a body that is not
/// valid JSON or not valid UTF-8. This is a usage error, not a violation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("body could not be decoded{}: {reason}", offset_suffix(.offset.as_ref()))]
pub struct DecodeError {
    /// Byte offset of the first offending byte, when known.
    pub offset: Option<usize>,
    /// Human-readable reason reported by the decoder.
    pub reason: String,
}

fn offset_suffix(offset: Option<&usize>) -> String {
    offset.map_or_else(String::new, |offset| format!(" at byte {offset}"))
}

impl DecodeError {
    /// Creates a decode error.
    #[must_use]
    pub fn new(offset: Option<usize>, reason: impl Into<String>) -> Self {
        Self {
            offset,
            reason: reason.into(),
        }
    }
}

/// A JSON path required to be present was not found.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("JSON path '{path}' not found")]
pub struct PathNotFoundError {
    /// The path that could not be resolved.
    pub path: String,
}

/// A JSON path expression could not be parsed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid JSON path '{path}': {reason}")]
pub struct PathSyntaxError {
    /// The offending path expression.
    pub path: String,
    /// Why the path was rejected.
    pub reason: String,
}
