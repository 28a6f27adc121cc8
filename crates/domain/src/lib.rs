//! Verity Domain - Core types
//!
//! This crate defines the data model of the Verity contract verification
//! engine: requests, captured exchanges, cookies, the JSON codec and
//! JSON-path evaluator, and the pure matchers.
//! All types here are pure Rust with no I/O dependencies.

pub mod codec;
pub mod config;
pub mod cookie;
pub mod error;
pub mod exchange;
pub mod json_path;
pub mod request;
pub mod response;
pub mod testing;

pub use config::ClientConfig;
pub use cookie::{Cookie, CookieMap, SameSite};
pub use error::{DecodeError, DomainError, DomainResult, PathNotFoundError, PathSyntaxError};
pub use exchange::{Exchange, ExchangeRequest, ExchangeResponse};
pub use json_path::{JsonPath, Lookup};
pub use request::{EncodedBody, HeaderMap, HttpMethod, RequestBody, RequestSpec};
pub use response::{StatusClass, StatusCode};
pub use testing::{CookieMatcher, StatusMatcher, Violation};
