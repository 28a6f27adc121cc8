//! Captured HTTP exchange.
//!
//! An [`Exchange`] is the immutable record of one request/response round
//! trip. It is built once by the capture use case and then read by any
//! number of assertion chains or dumps.

use std::sync::OnceLock;
use std::time::Duration;

use serde_json::Value;
use url::Url;
use uuid::Uuid;

use crate::codec;
use crate::cookie::CookieMap;
use crate::error::DecodeError;
use crate::request::{HeaderMap, HttpMethod};
use crate::response::StatusCode;

/// Request half of an exchange, as it was sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeRequest {
    /// HTTP method
    pub method: HttpMethod,
    /// URI as given by the caller
    pub uri: String,
    /// Fully resolved URL
    pub url: Url,
    /// Headers sent, default headers included
    pub headers: HeaderMap,
    /// Encoded body (empty when none was sent)
    pub body: Vec<u8>,
}

/// Response half of an exchange, as it was received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeResponse {
    /// Status code
    pub status: StatusCode,
    /// Headers in arrival order
    pub headers: HeaderMap,
    /// Cookies parsed from `Set-Cookie`
    pub cookies: CookieMap,
    /// Raw body bytes
    pub body: Vec<u8>,
}

/// Immutable record of one complete HTTP request/response round trip.
///
/// Clones share the id and any already decoded body.
#[derive(Debug, Clone)]
pub struct Exchange {
    id: Uuid,
    request: ExchangeRequest,
    response: ExchangeResponse,
    elapsed: Duration,
    decoded: OnceLock<Result<Value, DecodeError>>,
}

impl Exchange {
    /// Assembles an exchange from its captured parts.
    #[must_use]
    pub fn new(request: ExchangeRequest, response: ExchangeResponse, elapsed: Duration) -> Self {
        Self {
            id: Uuid::now_v7(),
            request,
            response,
            elapsed,
            decoded: OnceLock::new(),
        }
    }

    /// Unique identifier of this exchange.
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// The request as sent.
    #[must_use]
    pub const fn request(&self) -> &ExchangeRequest {
        &self.request
    }

    /// The response as received.
    #[must_use]
    pub const fn response(&self) -> &ExchangeResponse {
        &self.response
    }

    /// Request method.
    #[must_use]
    pub const fn request_method(&self) -> HttpMethod {
        self.request.method
    }

    /// Request URI as given by the caller.
    #[must_use]
    pub fn request_uri(&self) -> &str {
        &self.request.uri
    }

    /// Resolved request URL.
    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.request.url
    }

    /// Request headers.
    #[must_use]
    pub const fn request_headers(&self) -> &HeaderMap {
        &self.request.headers
    }

    /// Encoded request body.
    #[must_use]
    pub fn request_body(&self) -> &[u8] {
        &self.request.body
    }

    /// Response status.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.response.status
    }

    /// Response headers.
    #[must_use]
    pub const fn response_headers(&self) -> &HeaderMap {
        &self.response.headers
    }

    /// Response cookies.
    #[must_use]
    pub const fn response_cookies(&self) -> &CookieMap {
        &self.response.cookies
    }

    /// Raw response body.
    #[must_use]
    pub fn response_body(&self) -> &[u8] {
        &self.response.body
    }

    /// Time from send to full receipt of the body.
    #[must_use]
    pub const fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Response body decoded as JSON.
    ///
    /// Decoding happens on first call; the outcome (value or error) is
    /// cached for the lifetime of the exchange.
    ///
    /// # Errors
    ///
    /// Returns a [`DecodeError`] if the body is not valid JSON.
    pub fn json(&self) -> Result<&Value, DecodeError> {
        self.decoded
            .get_or_init(|| codec::decode(&self.response.body))
            .as_ref()
            .map_err(Clone::clone)
    }

    /// Response body decoded as UTF-8 text.
    ///
    /// # Errors
    ///
    /// Returns a [`DecodeError`] at the first invalid byte.
    pub fn text(&self) -> Result<&str, DecodeError> {
        std::str::from_utf8(&self.response.body)
            .map_err(|e| DecodeError::new(Some(e.valid_up_to()), e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn exchange(body: &[u8]) -> Exchange {
        let request = ExchangeRequest {
            method: HttpMethod::Get,
            uri: "/users/1".to_string(),
            url: Url::parse("https://example.com/users/1").unwrap(),
            headers: HeaderMap::new(),
            body: Vec::new(),
        };
        let response = ExchangeResponse {
            status: StatusCode::new(200),
            headers: HeaderMap::new().with("Content-Type", "application/json"),
            cookies: CookieMap::new(),
            body: body.to_vec(),
        };
        Exchange::new(request, response, Duration::from_millis(12))
    }

    #[test]
    fn test_accessors() {
        let ex = exchange(b"{}");
        assert_eq!(ex.request_method(), HttpMethod::Get);
        assert_eq!(ex.request_uri(), "/users/1");
        assert_eq!(ex.url().as_str(), "https://example.com/users/1");
        assert_eq!(ex.status().as_u16(), 200);
        assert_eq!(
            ex.response_headers().get("content-type"),
            Some("application/json")
        );
        assert!(ex.response_cookies().is_empty());
        assert!(ex.request_body().is_empty());
        assert_eq!(ex.elapsed(), Duration::from_millis(12));
    }

    #[test]
    fn test_json_is_decoded_once_and_cached() {
        let ex = exchange(br#"{"id": 1}"#);
        let first = ex.json().unwrap();
        let second = ex.json().unwrap();
        assert_eq!(first, &json!({"id": 1}));
        assert!(std::ptr::eq(first, second));
    }

    #[test]
    fn test_invalid_json_error_is_cached() {
        let ex = exchange(b"not json");
        let first = ex.json().unwrap_err();
        assert_eq!(ex.json().unwrap_err(), first);
    }

    #[test]
    fn test_text() {
        assert_eq!(exchange(b"hello").text().unwrap(), "hello");
        let err = exchange(&[b'o', b'k', 0xff]).text().unwrap_err();
        assert_eq!(err.offset, Some(2));
    }

    #[test]
    fn test_exchange_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Exchange>();
    }
}
