//! Application error types

use thiserror::Error;
use verity_domain::DomainError;

use crate::ports::{TransportError, TransportErrorKind};

/// Errors raised while capturing an exchange.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaptureError {
    /// The request could not be prepared (bad URL, header or body).
    #[error("invalid request: {0}")]
    InvalidRequest(#[from] DomainError),

    /// The transport failed; no exchange was produced.
    #[error("{0}")]
    Transport(#[from] TransportError),
}

impl CaptureError {
    /// Returns the transport failure kind, if this is a transport error.
    #[must_use]
    pub const fn transport_kind(&self) -> Option<TransportErrorKind> {
        match self {
            Self::Transport(e) => Some(e.kind),
            Self::InvalidRequest(_) => None,
        }
    }
}

/// Result type alias for capture operations.
pub type CaptureResult<T> = Result<T, CaptureError>;
