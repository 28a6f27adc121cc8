//! Response cookie types.
//!
//! Cookies are parsed from the `Set-Cookie` headers of a response and
//! kept by name in arrival order.

use chrono::{DateTime, NaiveDateTime, TimeDelta, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::request::HeaderMap;

/// A single cookie set by a response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Cookie {
    /// Cookie name.
    pub name: String,
    /// Cookie value.
    pub value: String,
    /// Domain the cookie belongs to (request host unless overridden).
    pub domain: String,
    /// Path the cookie applies to.
    #[serde(default = "default_path")]
    pub path: String,
    /// Expiration time (None for session cookies).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<DateTime<Utc>>,
    /// HttpOnly flag.
    #[serde(default)]
    pub http_only: bool,
    /// Secure flag.
    #[serde(default)]
    pub secure: bool,
    /// SameSite attribute, if the server sent one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub same_site: Option<SameSite>,
}

fn default_path() -> String {
    "/".to_string()
}

/// `Expires` layouts seen in the wild besides RFC 2822 (RFC 6265 §5.1.1).
const COOKIE_DATE_FORMATS: [&str; 4] = [
    "%a, %d-%b-%Y %H:%M:%S GMT",
    "%A, %d-%b-%y %H:%M:%S GMT",
    "%a, %d %b %Y %H:%M:%S GMT",
    "%a %b %e %H:%M:%S %Y",
];

fn parse_cookie_date(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(date) = DateTime::parse_from_rfc2822(value) {
        return Some(date.with_timezone(&Utc));
    }
    COOKIE_DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|naive| naive.and_utc())
}

/// `received_at + secs`, saturating at the representable range.
fn expiry_after(received_at: DateTime<Utc>, secs: i64) -> DateTime<Utc> {
    TimeDelta::try_seconds(secs)
        .and_then(|delta| received_at.checked_add_signed(delta))
        .unwrap_or(if secs < 0 {
            DateTime::<Utc>::MIN_UTC
        } else {
            DateTime::<Utc>::MAX_UTC
        })
}

impl Cookie {
    /// Create a new session cookie with default attributes.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        value: impl Into<String>,
        domain: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            domain: domain.into(),
            path: default_path(),
            expires: None,
            http_only: false,
            secure: false,
            same_site: None,
        }
    }

    /// Parse one `Set-Cookie` header value.
    ///
    /// `Max-Age` is resolved against `received_at`, and takes precedence
    /// over `Expires` as in RFC 6265. Returns `None` if the header has no
    /// `name=value` pair or the name is empty.
    #[must_use]
    pub fn from_set_cookie(
        header: &str,
        request_domain: &str,
        received_at: DateTime<Utc>,
    ) -> Option<Self> {
        let mut parts = header.split(';');

        let (name, value) = parts.next()?.split_once('=')?;
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        let mut cookie = Self::new(name, value.trim().trim_matches('"'), request_domain);
        let mut max_age_set = false;

        for part in parts {
            let part = part.trim();
            if let Some((attr, val)) = part.split_once('=') {
                let val = val.trim();
                match attr.trim().to_ascii_lowercase().as_str() {
                    "domain" if !val.is_empty() => {
                        cookie.domain = val.trim_start_matches('.').to_ascii_lowercase();
                    }
                    "path" if val.starts_with('/') => cookie.path = val.to_string(),
                    "expires" if !max_age_set => {
                        if let Some(expires) = parse_cookie_date(val) {
                            cookie.expires = Some(expires);
                        }
                    }
                    "max-age" => {
                        if let Ok(secs) = val.parse::<i64>() {
                            cookie.expires = Some(expiry_after(received_at, secs));
                            max_age_set = true;
                        }
                    }
                    "samesite" => cookie.same_site = SameSite::parse(val),
                    _ => {}
                }
            } else {
                match part.to_ascii_lowercase().as_str() {
                    "httponly" => cookie.http_only = true,
                    "secure" => cookie.secure = true,
                    _ => {}
                }
            }
        }

        Some(cookie)
    }

    /// Renders the cookie with its attributes, `Set-Cookie` style.
    #[must_use]
    pub fn describe(&self) -> String {
        let mut out = format!(
            "{}={}; Domain={}; Path={}",
            self.name, self.value, self.domain, self.path
        );
        if let Some(expires) = self.expires {
            out.push_str(&format!("; Expires={}", expires.to_rfc2822()));
        }
        if self.http_only {
            out.push_str("; HttpOnly");
        }
        if self.secure {
            out.push_str("; Secure");
        }
        if let Some(same_site) = self.same_site {
            out.push_str(&format!("; SameSite={}", same_site.display_name()));
        }
        out
    }
}

/// SameSite attribute values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SameSite {
    /// Cookies are sent with all requests.
    None,
    /// Cookies are sent with top-level navigations and GET from third-party sites.
    Lax,
    /// Cookies are only sent in first-party context.
    Strict,
}

impl SameSite {
    fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "strict" => Some(Self::Strict),
            "lax" => Some(Self::Lax),
            "none" => Some(Self::None),
            _ => None,
        }
    }

    /// Get human-readable name.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Lax => "Lax",
            Self::Strict => "Strict",
        }
    }
}

/// Cookies set by a response, keyed by name in arrival order.
///
/// When a response sets the same name twice the later header wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CookieMap {
    cookies: IndexMap<String, Cookie>,
}

impl CookieMap {
    /// Create an empty cookie map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse every `Set-Cookie` header of a response.
    ///
    /// Malformed headers are skipped.
    #[must_use]
    pub fn from_headers(
        headers: &HeaderMap,
        request_domain: &str,
        received_at: DateTime<Utc>,
    ) -> Self {
        headers
            .get_all("set-cookie")
            .iter()
            .filter_map(|header| Cookie::from_set_cookie(header, request_domain, received_at))
            .collect()
    }

    /// Add a cookie, replacing any cookie with the same name.
    pub fn insert(&mut self, cookie: Cookie) {
        self.cookies.insert(cookie.name.clone(), cookie);
    }

    /// Look up a cookie by name (case-sensitive).
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Cookie> {
        self.cookies.get(name)
    }

    /// Returns true if a cookie with this name was set.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.cookies.contains_key(name)
    }

    /// Iterate over cookies in arrival order.
    pub fn iter(&self) -> impl Iterator<Item = &Cookie> {
        self.cookies.values()
    }

    /// Get the number of cookies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    /// Check if no cookies were set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }
}

impl FromIterator<Cookie> for CookieMap {
    fn from_iter<T: IntoIterator<Item = Cookie>>(iter: T) -> Self {
        let mut map = Self::new();
        for cookie in iter {
            map.insert(cookie);
        }
        map
    }
}
