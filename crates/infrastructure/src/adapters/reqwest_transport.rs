//! HTTP transport implementation using reqwest.
//!
//! This adapter implements the `HttpTransport` port. It sends a prepared
//! request once and reads the entire response body before returning.

use std::error::Error as _;

use async_trait::async_trait;
use reqwest::{Client, Method};
use verity_application::ports::{
    HttpTransport, PreparedRequest, RawResponse, TransportError, TransportErrorKind,
};
use verity_domain::{ClientConfig, HeaderMap, HttpMethod};

/// HTTP transport backed by `reqwest::Client`.
///
/// Redirect limit, user agent and the default timeout come from the
/// [`ClientConfig`] the transport was built with. Connections are pooled
/// by the underlying client; requests are never retried.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Creates a transport configured from a client configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialised.
    pub fn new(config: &ClientConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .timeout(config.timeout)
            .build()
            .map_err(|e| TransportError::new(TransportErrorKind::Other, e.to_string()))?;

        Ok(Self { client })
    }

    const fn to_reqwest_method(method: HttpMethod) -> Method {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Patch => Method::PATCH,
            HttpMethod::Delete => Method::DELETE,
            HttpMethod::Head => Method::HEAD,
            HttpMethod::Options => Method::OPTIONS,
        }
    }

    /// Renders the source chain of an error, innermost last.
    fn causes(error: &reqwest::Error) -> String {
        let mut causes = Vec::new();
        let mut source = error.source();
        while let Some(cause) = source {
            causes.push(cause.to_string());
            source = cause.source();
        }
        causes.join(": ")
    }

    fn map_error(error: &reqwest::Error) -> TransportError {
        let causes = Self::causes(error);
        let lower = causes.to_lowercase();
        let is_tls = lower.contains("certificate") || lower.contains("tls") || lower.contains("handshake");

        let kind = if error.is_timeout() {
            TransportErrorKind::Timeout
        } else if error.is_connect() {
            if lower.contains("dns") || lower.contains("resolve") || lower.contains("lookup") {
                TransportErrorKind::DnsError
            } else if is_tls {
                TransportErrorKind::TlsError
            } else {
                TransportErrorKind::ConnectionFailed
            }
        } else if is_tls {
            TransportErrorKind::TlsError
        } else if lower.contains("connection reset") || lower.contains("connection closed") {
            TransportErrorKind::ConnectionFailed
        } else {
            TransportErrorKind::Other
        };

        if causes.is_empty() {
            TransportError::new(kind, error.to_string())
        } else {
            TransportError::new(kind, format!("{error}: {causes}"))
        }
    }

    fn collect_headers(headers: &reqwest::header::HeaderMap) -> HeaderMap {
        headers
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect()
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: &PreparedRequest) -> Result<RawResponse, TransportError> {
        let mut builder = self
            .client
            .request(Self::to_reqwest_method(request.method), request.url.clone())
            .timeout(request.timeout);

        for (name, value) in request.headers.pairs() {
            builder = builder.header(name, value);
        }
        if !request.body.is_empty() {
            builder = builder.body(request.body.clone());
        }

        let response = builder.send().await.map_err(|e| Self::map_error(&e))?;

        let status = response.status().as_u16();
        let headers = Self::collect_headers(response.headers());
        let body = response
            .bytes()
            .await
            .map_err(|e| {
                let mut error = Self::map_error(&e);
                if error.kind == TransportErrorKind::Other {
                    error.cause = format!("failed to read body: {}", error.cause);
                }
                error
            })?
            .to_vec();

        tracing::trace!(status, bytes = body.len(), "response read");

        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use reqwest::header::{HeaderValue, SET_COOKIE};

    #[test]
    fn test_to_reqwest_method() {
        assert_eq!(ReqwestTransport::to_reqwest_method(HttpMethod::Get), Method::GET);
        assert_eq!(ReqwestTransport::to_reqwest_method(HttpMethod::Patch), Method::PATCH);
        assert_eq!(ReqwestTransport::to_reqwest_method(HttpMethod::Head), Method::HEAD);
        assert_eq!(
            ReqwestTransport::to_reqwest_method(HttpMethod::Options),
            Method::OPTIONS
        );
    }

    #[test]
    fn test_transport_creation() {
        let transport = ReqwestTransport::new(&ClientConfig::default());
        assert!(transport.is_ok());
    }

    #[test]
    fn test_repeated_headers_are_kept() {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.append(SET_COOKIE, HeaderValue::from_static("a=1"));
        headers.append(SET_COOKIE, HeaderValue::from_static("b=2"));
        headers.append("x-trace", HeaderValue::from_static("t"));

        let collected = ReqwestTransport::collect_headers(&headers);

        assert_eq!(collected.get_all("Set-Cookie"), ["a=1", "b=2"]);
        assert_eq!(collected.get("X-Trace"), Some("t"));
    }
}
