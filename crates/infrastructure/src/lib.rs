//! Verity Infrastructure - Adapters and verification
//!
//! This crate provides the reqwest transport and system clock behind the
//! application ports, the fluent assertion chain, and the exchange dump.

pub mod adapters;
pub mod testing;

use std::sync::Arc;

use verity_application::{CaptureExchange, TransportError};
use verity_domain::ClientConfig;

pub use adapters::{ReqwestTransport, SystemClock};
pub use testing::{
    AssertionChain, AssertionFailure, BodyJsonMatcher, BodyTextMatcher, ChainError, ChainState,
    ExchangeDump, HeaderMatcher, dump, verify,
};

/// Builds a capture use case over the reqwest transport and system clock.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be created.
pub fn http_client(config: ClientConfig) -> Result<CaptureExchange<ReqwestTransport>, TransportError> {
    let transport = ReqwestTransport::new(&config)?;
    Ok(CaptureExchange::new(
        Arc::new(transport),
        Arc::new(SystemClock::new()),
        config,
    ))
}
