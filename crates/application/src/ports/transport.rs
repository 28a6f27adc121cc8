//! HTTP transport port
//!
//! The capture use case never talks TCP or TLS itself. It hands a fully
//! prepared request to an [`HttpTransport`] and gets raw response parts back.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use url::Url;
use verity_domain::{HeaderMap, HttpMethod};

/// A request ready for the wire: URL resolved, headers merged, body encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedRequest {
    /// HTTP method
    pub method: HttpMethod,
    /// Absolute URL
    pub url: Url,
    /// Headers to send
    pub headers: HeaderMap,
    /// Encoded body (empty for none)
    pub body: Vec<u8>,
    /// Timeout for this exchange
    pub timeout: Duration,
}

/// The raw parts of a received response.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawResponse {
    /// Status code
    pub status: u16,
    /// Headers, repeated names preserved
    pub headers: HeaderMap,
    /// Entire body
    pub body: Vec<u8>,
}

/// Category of a transport failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportErrorKind {
    /// The connection could not be established or was dropped.
    ConnectionFailed,
    /// The exchange did not complete within the timeout.
    Timeout,
    /// TLS handshake or certificate failure.
    TlsError,
    /// The host name could not be resolved.
    DnsError,
    /// Any other transport-level failure (protocol errors, body read errors).
    Other,
}

impl TransportErrorKind {
    /// Returns a short title for this kind.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::ConnectionFailed => "connection failed",
            Self::Timeout => "timeout",
            Self::TlsError => "TLS error",
            Self::DnsError => "DNS error",
            Self::Other => "transport error",
        }
    }
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// The exchange could not be completed at the transport level.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {cause}")]
pub struct TransportError {
    /// Failure category.
    pub kind: TransportErrorKind,
    /// Description of the underlying cause.
    pub cause: String,
}

impl TransportError {
    /// Creates a transport error.
    #[must_use]
    pub fn new(kind: TransportErrorKind, cause: impl Into<String>) -> Self {
        Self {
            kind,
            cause: cause.into(),
        }
    }

    /// Creates a timeout error for the given limit.
    #[must_use]
    pub fn timeout(limit: Duration) -> Self {
        Self::new(
            TransportErrorKind::Timeout,
            format!("no complete response within {} ms", limit.as_millis()),
        )
    }
}

/// Port for sending one HTTP request and reading the full response.
///
/// Implementations perform exactly one round trip and never retry.
/// Any status code is a successful send; only transport failures are errors.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Sends the request and reads the whole response body.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] on connection, DNS, TLS or timeout failures.
    async fn send(&self, request: &PreparedRequest) -> Result<RawResponse, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_error_display() {
        let err = TransportError::new(TransportErrorKind::ConnectionFailed, "refused");
        assert_eq!(err.to_string(), "connection failed: refused");
    }

    #[test]
    fn test_timeout_error() {
        let err = TransportError::timeout(Duration::from_millis(250));
        assert_eq!(err.kind, TransportErrorKind::Timeout);
        assert_eq!(err.to_string(), "timeout: no complete response within 250 ms");
    }
}
