//! Client configuration.
//!
//! Base URL, default headers and timeouts are carried as a plain value
//! and handed to whatever builds requests. Nothing here reads the
//! environment.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{DomainError, DomainResult};
use crate::request::HeaderMap;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_MAX_REDIRECTS: usize = 10;

/// Settings applied to every request issued through a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL relative request URIs are appended to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<Url>,
    /// Headers added to every request unless the request sets them.
    pub default_headers: HeaderMap,
    /// Timeout for the whole exchange.
    #[serde(rename = "timeout_ms", with = "duration_millis")]
    pub timeout: Duration,
    /// User-Agent announced by the transport.
    pub user_agent: String,
    /// Maximum number of redirects the transport follows.
    pub max_redirects: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            default_headers: HeaderMap::new(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: concat!("verity/", env!("CARGO_PKG_VERSION")).to_string(),
            max_redirects: DEFAULT_MAX_REDIRECTS,
        }
    }
}

impl ClientConfig {
    /// Creates a configuration with defaults and no base URL.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a configuration from JSON; missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed, a field has the wrong type,
    /// or the base URL is not http(s).
    pub fn from_json(json: &str) -> DomainResult<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| DomainError::InvalidConfig(e.to_string()))?;
        if let Some(url) = &config.base_url {
            check_scheme(url)?;
        }
        config.default_headers.validate()?;
        Ok(config)
    }

    /// Sets the base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL cannot be parsed or is not http(s).
    pub fn with_base_url(mut self, base_url: &str) -> DomainResult<Self> {
        let url = Url::parse(base_url)
            .map_err(|e| DomainError::InvalidUrl(format!("{e}: {base_url}")))?;
        check_scheme(&url)?;
        self.base_url = Some(url);
        Ok(self)
    }

    /// Adds a default header.
    #[must_use]
    pub fn with_default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.append(name, value);
        self
    }

    /// Sets the exchange timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the User-Agent.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Resolves a request URI against the base URL.
    ///
    /// Absolute http(s) URIs are used unchanged. Relative URIs are appended
    /// to the base URL's path with exactly one `/` between them, so a base
    /// of `https://host/api` and a URI of `/users` give `https://host/api/users`.
    ///
    /// # Errors
    ///
    /// Returns an error if the result is not a valid URL, or the URI is
    /// relative and no base URL is configured.
    pub fn resolve(&self, uri: &str) -> DomainResult<Url> {
        let uri = uri.trim();
        if let Ok(url) = Url::parse(uri) {
            if matches!(url.scheme(), "http" | "https") {
                return Ok(url);
            }
        }

        let base = self.base_url.as_ref().ok_or_else(|| {
            DomainError::InvalidUrl(format!("relative URI '{uri}' without a base URL"))
        })?;

        let mut joined = base.as_str().to_string();
        if let Some(query_start) = joined.find(['?', '#']) {
            joined.truncate(query_start);
        }
        // a bare origin serializes with a trailing '/'
        let joined = format!(
            "{}/{}",
            joined.trim_end_matches('/'),
            uri.trim_start_matches('/')
        );

        Url::parse(&joined).map_err(|e| DomainError::InvalidUrl(format!("{e}: {joined}")))
    }
}

fn check_scheme(url: &Url) -> DomainResult<()> {
    if matches!(url.scheme(), "http" | "https") {
        Ok(())
    } else {
        Err(DomainError::InvalidUrl(format!(
            "unsupported scheme '{}': {url}",
            url.scheme()
        )))
    }
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    #[allow(clippy::cast_possible_truncation)]
    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
