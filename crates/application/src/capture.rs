//! Capture Exchange Use Case
//!
//! Turns a [`RequestSpec`] into a sent request and the response into an
//! immutable [`Exchange`]. Exactly one round trip per call, no retries.

use std::sync::Arc;
use std::time::Instant;

use verity_domain::{
    ClientConfig, CookieMap, Exchange, ExchangeRequest, ExchangeResponse, RequestSpec, StatusCode,
};

use crate::error::CaptureResult;
use crate::ports::{Clock, HttpTransport, PreparedRequest, TransportError, TransportErrorKind};

/// Use case for executing a request and capturing the exchange.
///
/// # Example
///
/// ```ignore
/// let config = ClientConfig::new().with_base_url("https://jsonplaceholder.typicode.com")?;
/// let capture = CaptureExchange::new(Arc::new(transport), Arc::new(SystemClock), config);
///
/// let exchange = capture.execute(&RequestSpec::get("/users/1")).await?;
/// ```
pub struct CaptureExchange<T: HttpTransport> {
    transport: Arc<T>,
    clock: Arc<dyn Clock>,
    config: ClientConfig,
}

impl<T: HttpTransport> CaptureExchange<T> {
    /// Creates the use case over a transport, a clock and a configuration.
    pub fn new(transport: Arc<T>, clock: Arc<dyn Clock>, config: ClientConfig) -> Self {
        Self {
            transport,
            clock,
            config,
        }
    }

    /// Returns the configuration requests are resolved against.
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Resolves, merges and encodes a request without sending it.
    ///
    /// - The URI is resolved against the configured base URL.
    /// - Default headers are added unless the request sets the same name.
    /// - `Content-Type` and `User-Agent` are added when missing.
    ///
    /// # Errors
    ///
    /// Returns `CaptureError::InvalidRequest` for unresolvable URIs,
    /// invalid headers or unencodable bodies.
    pub fn prepare(&self, request: &RequestSpec) -> CaptureResult<PreparedRequest> {
        let url = self.config.resolve(&request.uri)?;
        let body = request.body.encode()?;

        let mut headers = request.headers.clone();
        for (name, values) in self.config.default_headers.iter() {
            if !headers.contains(name) {
                for value in values {
                    headers.append(name, value.as_str());
                }
            }
        }
        if let Some(content_type) = body.content_type {
            if !headers.contains("content-type") {
                headers.insert("Content-Type", content_type);
            }
        }
        if !headers.contains("user-agent") {
            headers.insert("User-Agent", self.config.user_agent.as_str());
        }
        headers.validate()?;

        Ok(PreparedRequest {
            method: request.method,
            url,
            headers,
            body: body.bytes,
            timeout: request.timeout.unwrap_or(self.config.timeout),
        })
    }

    /// Executes the request and captures the complete exchange.
    ///
    /// Every status code, 4xx and 5xx included, produces an exchange.
    ///
    /// # Errors
    ///
    /// Returns `CaptureError::InvalidRequest` if the request cannot be
    /// prepared, and `CaptureError::Transport` if the transport fails or
    /// the timeout expires. No partial exchange is ever returned.
    pub async fn execute(&self, request: &RequestSpec) -> CaptureResult<Exchange> {
        let prepared = self.prepare(request)?;

        tracing::debug!(
            method = %prepared.method,
            url = %prepared.url,
            absolute = request.is_absolute(),
            timeout_ms = prepared.timeout.as_millis(),
            "sending request"
        );

        let start = Instant::now();
        let sent = tokio::time::timeout(prepared.timeout, self.transport.send(&prepared)).await;
        let raw = match sent {
            Ok(Ok(raw)) => raw,
            Ok(Err(e)) => return Err(Self::failed(&prepared, e).into()),
            Err(_) => {
                let e = TransportError::timeout(prepared.timeout);
                return Err(Self::failed(&prepared, e).into());
            }
        };
        let elapsed = start.elapsed();

        if !(100..=599).contains(&raw.status) {
            let e = TransportError::new(
                TransportErrorKind::Other,
                format!("invalid status code {}", raw.status),
            );
            return Err(Self::failed(&prepared, e).into());
        }

        let host = prepared.url.host_str().unwrap_or_default().to_string();
        let cookies = CookieMap::from_headers(&raw.headers, &host, self.clock.now());

        let exchange = Exchange::new(
            ExchangeRequest {
                method: prepared.method,
                uri: request.uri.clone(),
                url: prepared.url,
                headers: prepared.headers,
                body: prepared.body,
            },
            ExchangeResponse {
                status: StatusCode::new(raw.status),
                headers: raw.headers,
                cookies,
                body: raw.body,
            },
            elapsed,
        );

        tracing::info!(
            exchange = %exchange.id(),
            method = %exchange.request_method(),
            url = %exchange.url(),
            status = exchange.status().as_u16(),
            elapsed_ms = elapsed.as_millis(),
            "exchange captured"
        );

        Ok(exchange)
    }

    fn failed(prepared: &PreparedRequest, error: TransportError) -> TransportError {
        tracing::warn!(
            method = %prepared.method,
            url = %prepared.url,
            kind = %error.kind,
            "request failed: {}",
            error.cause
        );
        error
    }
}
