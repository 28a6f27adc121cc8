//! Status and cookie matchers, and the violation record.
//!
//! Matchers that need no external machinery live here; header and body
//! matchers (regular expressions, caller predicates) live with the
//! assertion chain in the infrastructure crate.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::cookie::CookieMap;
use crate::response::{StatusClass, StatusCode};

/// Expected status code, class, or named status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum StatusMatcher {
    /// Exact status code.
    Exact(u16),
    /// Any status except this one.
    NotEqualTo(u16),
    /// Any status in a class (2xx, 4xx, ...).
    Class(StatusClass),
    /// Any successful (2xx) status.
    Ok,
    /// 201 Created
    Created,
    /// 202 Accepted
    Accepted,
    /// 204 No Content
    NoContent,
    /// 400 Bad Request
    BadRequest,
    /// 401 Unauthorized
    Unauthorized,
    /// 403 Forbidden
    Forbidden,
    /// 404 Not Found
    NotFound,
    /// 500 Internal Server Error
    InternalServerError,
}

impl StatusMatcher {
    /// Any 2xx status.
    pub const SUCCESSFUL: Self = Self::Class(StatusClass::Success);
    /// Any 3xx status.
    pub const REDIRECTION: Self = Self::Class(StatusClass::Redirection);
    /// Any 4xx status.
    pub const CLIENT_ERROR: Self = Self::Class(StatusClass::ClientError);
    /// Any 5xx status.
    pub const SERVER_ERROR: Self = Self::Class(StatusClass::ServerError);

    /// Returns the exact code a named matcher stands for.
    #[must_use]
    pub const fn named_code(self) -> Option<u16> {
        match self {
            Self::Exact(code) => Some(code),
            Self::Created => Some(201),
            Self::Accepted => Some(202),
            Self::NoContent => Some(204),
            Self::BadRequest => Some(400),
            Self::Unauthorized => Some(401),
            Self::Forbidden => Some(403),
            Self::NotFound => Some(404),
            Self::InternalServerError => Some(500),
            Self::Ok | Self::NotEqualTo(_) | Self::Class(_) => None,
        }
    }

    /// Check if a status matches.
    #[must_use]
    pub fn matches(self, status: StatusCode) -> bool {
        match self {
            Self::NotEqualTo(code) => status.as_u16() != code,
            Self::Ok => status.is_success(),
            Self::Class(class) => status.class() == Some(class),
            named => named.named_code() == Some(status.as_u16()),
        }
    }

    /// Short rendering of the expectation, e.g. `200`, `2xx`, `not 404`.
    #[must_use]
    pub fn expected(self) -> String {
        match self {
            Self::NotEqualTo(code) => format!("not {code}"),
            Self::Ok => StatusClass::Success.label().to_string(),
            Self::Class(class) => class.label().to_string(),
            named => named
                .named_code()
                .map(|code| code.to_string())
                .unwrap_or_default(),
        }
    }
}

impl From<u16> for StatusMatcher {
    fn from(code: u16) -> Self {
        Self::Exact(code)
    }
}

impl From<StatusClass> for StatusMatcher {
    fn from(class: StatusClass) -> Self {
        Self::Class(class)
    }
}

/// Condition on a response cookie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum CookieMatcher {
    /// The cookie was set.
    Exists,
    /// The cookie was not set.
    DoesNotExist,
    /// The cookie was set with exactly this value.
    ValueEquals(String),
}

impl CookieMatcher {
    /// Creates a value-equality matcher.
    #[must_use]
    pub fn value_equals(value: impl Into<String>) -> Self {
        Self::ValueEquals(value.into())
    }

    /// Evaluates the matcher against response cookies.
    ///
    /// # Errors
    ///
    /// Returns the violation when the cookie does not satisfy the matcher.
    pub fn check(&self, name: &str, cookies: &CookieMap) -> Result<(), Violation> {
        let actual = cookies.get(name).map(|c| c.value.as_str());
        match (self, actual) {
            (Self::Exists, Some(_))
            | (Self::DoesNotExist, None) => Ok(()),
            (Self::ValueEquals(expected), Some(value)) if value == expected => Ok(()),
            (Self::Exists, None) => Err(Violation::new(
                format!("Cookie '{name}' exists"),
                "present",
                MISSING,
            )),
            (Self::DoesNotExist, Some(value)) => Err(Violation::new(
                format!("Cookie '{name}' does not exist"),
                MISSING,
                value,
            )),
            (Self::ValueEquals(expected), actual) => Err(Violation::new(
                format!("Cookie '{name}' equals '{expected}'"),
                expected.as_str(),
                actual.unwrap_or(MISSING),
            )),
        }
    }
}

/// Placeholder used as the actual value of something that was absent.
pub const MISSING: &str = "<not found>";

/// Recorded outcome of a failed check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Human-readable description of the check.
    pub description: String,
    /// Expected value, rendered for display.
    pub expected: String,
    /// Actual value, rendered for display.
    pub actual: String,
}

impl Violation {
    /// Create a violation.
    #[must_use]
    pub fn new(
        description: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self {
            description: description.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: expected {}, got {}",
            self.description, self.expected, self.actual
        )
    }
}
