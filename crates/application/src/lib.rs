//! Verity Application - Use cases and ports
//!
//! This crate holds the exchange capture use case and the ports it
//! depends on. Adapters for the ports live in the infrastructure crate.

pub mod capture;
pub mod error;
pub mod ports;

pub use capture::CaptureExchange;
pub use error::{CaptureError, CaptureResult};
pub use ports::{
    Clock, HttpTransport, PreparedRequest, RawResponse, TransportError, TransportErrorKind,
};
