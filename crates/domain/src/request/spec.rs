//! Request specification type

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{HeaderMap, HttpMethod, RequestBody};

/// Everything the caller specifies about a request before it is sent.
///
/// The URI is either absolute or relative to the base URL of the
/// client configuration the request is executed with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RequestSpec {
    /// HTTP method
    pub method: HttpMethod,
    /// Target URI (path relative to the configured base, or absolute URL)
    pub uri: String,
    /// Request headers
    #[serde(default)]
    pub headers: HeaderMap,
    /// Request body
    #[serde(default)]
    pub body: RequestBody,
    /// Overrides the configured timeout for this request only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<Duration>,
}

impl RequestSpec {
    /// Creates a request with the given method and URI.
    #[must_use]
    pub fn new(method: HttpMethod, uri: impl Into<String>) -> Self {
        Self {
            method,
            uri: uri.into(),
            headers: HeaderMap::new(),
            body: RequestBody::None,
            timeout: None,
        }
    }

    /// Creates a GET request.
    #[must_use]
    pub fn get(uri: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, uri)
    }

    /// Creates a POST request.
    #[must_use]
    pub fn post(uri: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, uri)
    }

    /// Creates a PUT request.
    #[must_use]
    pub fn put(uri: impl Into<String>) -> Self {
        Self::new(HttpMethod::Put, uri)
    }

    /// Creates a PATCH request.
    #[must_use]
    pub fn patch(uri: impl Into<String>) -> Self {
        Self::new(HttpMethod::Patch, uri)
    }

    /// Creates a DELETE request.
    #[must_use]
    pub fn delete(uri: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, uri)
    }

    /// Appends a request header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.append(name, value);
        self
    }

    /// Sets the request body.
    #[must_use]
    pub fn body(mut self, body: RequestBody) -> Self {
        self.body = body;
        self
    }

    /// Sets a per-request timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Returns true if the URI is an absolute http(s) URL.
    #[must_use]
    pub fn is_absolute(&self) -> bool {
        let uri = self.uri.trim_start();
        ["http://", "https://"].iter().any(|scheme| {
            uri.get(..scheme.len())
                .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
        })
    }
}
