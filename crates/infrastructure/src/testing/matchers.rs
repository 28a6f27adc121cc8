//! Header and body matchers.
//!
//! Each matcher evaluates one check and returns the [`Violation`] it
//! found, if any. Patterns are compiled when the matcher is built.

use std::fmt;

use regex::Regex;
use serde_json::Value;
use verity_domain::testing::MISSING;
use verity_domain::{HeaderMap, JsonPath, Lookup, Violation};

/// Predicate over a JSON value, as supplied by the caller.
pub type JsonPredicate = Box<dyn Fn(&Value) -> bool + Send + Sync>;

/// Expectation on a response header.
#[derive(Debug, Clone)]
pub enum HeaderMatcher {
    /// The header is present.
    Exists,
    /// The header is absent.
    DoesNotExist,
    /// The first value equals this string exactly.
    ValueEquals(String),
    /// The first value matches this pattern in full.
    ValueMatches(Regex),
}

impl HeaderMatcher {
    /// Creates a value-equality matcher.
    #[must_use]
    pub fn value_equals(value: impl Into<String>) -> Self {
        Self::ValueEquals(value.into())
    }

    /// Compiles a pattern the whole header value must match.
    ///
    /// # Errors
    ///
    /// Returns an error if the pattern is not a valid regular expression.
    pub fn value_matches(pattern: &str) -> Result<Self, regex::Error> {
        Regex::new(&format!("^(?:{pattern})$")).map(Self::ValueMatches)
    }

    /// Evaluates the matcher against response headers.
    ///
    /// # Errors
    ///
    /// Returns the violation when the header does not satisfy the matcher.
    pub fn check(&self, name: &str, headers: &HeaderMap) -> Result<(), Violation> {
        let values = headers.get_all(name);
        let actual = if values.is_empty() {
            MISSING.to_string()
        } else {
            values.join(", ")
        };
        let first = values.first().map(String::as_str);

        let (passed, description, expected) = match self {
            Self::Exists => (first.is_some(), format!("Header '{name}' exists"), "present".to_string()),
            Self::DoesNotExist => (
                first.is_none(),
                format!("Header '{name}' does not exist"),
                MISSING.to_string(),
            ),
            Self::ValueEquals(expected) => (
                first == Some(expected.as_str()),
                format!("Header '{name}' equals '{expected}'"),
                expected.clone(),
            ),
            Self::ValueMatches(regex) => (
                first.is_some_and(|value| regex.is_match(value)),
                format!("Header '{name}' matches /{}/", regex.as_str()),
                format!("/{}/", regex.as_str()),
            ),
        };

        if passed {
            Ok(())
        } else {
            Err(Violation::new(description, expected, actual))
        }
    }
}

/// Expectation on a value located by a JSON path.
pub enum BodyJsonMatcher {
    /// The value is structurally equal to this one.
    IsEqualTo(Value),
    /// The value is missing or differs from this one.
    IsNotEqualTo(Value),
    /// The value is missing, `null`, `""`, `[]` or `{}`.
    IsEmpty,
    /// The value is present and not empty.
    IsNotEmpty,
    /// The path resolves to a value (`null` included).
    Exists,
    /// The path does not resolve.
    DoesNotExist,
    /// The value satisfies a caller predicate.
    Satisfies(JsonPredicate),
}

impl BodyJsonMatcher {
    /// Creates an equality matcher from anything convertible to JSON.
    #[must_use]
    pub fn is_equal_to(value: impl Into<Value>) -> Self {
        Self::IsEqualTo(value.into())
    }

    /// Creates an inequality matcher from anything convertible to JSON.
    #[must_use]
    pub fn is_not_equal_to(value: impl Into<Value>) -> Self {
        Self::IsNotEqualTo(value.into())
    }

    /// Wraps a predicate.
    #[must_use]
    pub fn satisfies<F>(predicate: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Self::Satisfies(Box::new(predicate))
    }

    /// Evaluates the matcher against a decoded document.
    ///
    /// # Errors
    ///
    /// Returns the violation when the located value does not satisfy the
    /// matcher. A missing path under `Satisfies` is a violation.
    pub fn check(&self, path: &JsonPath, document: &Value) -> Result<(), Violation> {
        let lookup = path.get(document);
        let actual = match lookup {
            Lookup::Found(value) => value.to_string(),
            Lookup::NotFound => MISSING.to_string(),
        };

        let (passed, expected) = match self {
            Self::IsEqualTo(value) => (path.equals(document, value), value.to_string()),
            Self::IsNotEqualTo(value) => (!path.equals(document, value), format!("not {value}")),
            Self::IsEmpty => (path.is_empty(document), "empty".to_string()),
            Self::IsNotEmpty => (!path.is_empty(document), "not empty".to_string()),
            Self::Exists => (lookup.is_found(), "present".to_string()),
            Self::DoesNotExist => (!lookup.is_found(), MISSING.to_string()),
            Self::Satisfies(predicate) => (
                path.test(document, |value| predicate(value)).unwrap_or(false),
                "a value satisfying the predicate".to_string(),
            ),
        };

        if passed {
            Ok(())
        } else {
            Err(Violation::new(
                format!("JSON path '{path}' {}", self.verb()),
                expected,
                actual,
            ))
        }
    }

    const fn verb(&self) -> &'static str {
        match self {
            Self::IsEqualTo(_) => "is equal",
            Self::IsNotEqualTo(_) => "is not equal",
            Self::IsEmpty => "is empty",
            Self::IsNotEmpty => "is not empty",
            Self::Exists => "exists",
            Self::DoesNotExist => "does not exist",
            Self::Satisfies(_) => "satisfies predicate",
        }
    }
}

impl fmt::Debug for BodyJsonMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IsEqualTo(value) => f.debug_tuple("IsEqualTo").field(value).finish(),
            Self::IsNotEqualTo(value) => f.debug_tuple("IsNotEqualTo").field(value).finish(),
            Self::IsEmpty => f.write_str("IsEmpty"),
            Self::IsNotEmpty => f.write_str("IsNotEmpty"),
            Self::Exists => f.write_str("Exists"),
            Self::DoesNotExist => f.write_str("DoesNotExist"),
            Self::Satisfies(_) => f.write_str("Satisfies(<predicate>)"),
        }
    }
}

/// Expectation on the body decoded as UTF-8 text.
#[derive(Debug, Clone)]
pub enum BodyTextMatcher {
    /// The text equals this string exactly.
    IsEqualTo(String),
    /// The text contains this substring.
    Contains(String),
    /// The body is empty.
    IsEmpty,
    /// The body is not empty.
    IsNotEmpty,
    /// The pattern is found somewhere in the text.
    Matches(Regex),
}

impl BodyTextMatcher {
    /// Creates an equality matcher.
    #[must_use]
    pub fn is_equal_to(text: impl Into<String>) -> Self {
        Self::IsEqualTo(text.into())
    }

    /// Creates a substring matcher.
    #[must_use]
    pub fn contains(text: impl Into<String>) -> Self {
        Self::Contains(text.into())
    }

    /// Compiles a pattern searched for in the text.
    ///
    /// # Errors
    ///
    /// Returns an error if the pattern is not a valid regular expression.
    pub fn matches(pattern: &str) -> Result<Self, regex::Error> {
        Regex::new(pattern).map(Self::Matches)
    }

    /// Evaluates the matcher against the body text.
    ///
    /// # Errors
    ///
    /// Returns the violation when the text does not satisfy the matcher.
    pub fn check(&self, text: &str) -> Result<(), Violation> {
        let (passed, description, expected) = match self {
            Self::IsEqualTo(expected) => (text == expected, "Body equals", format!("{expected:?}")),
            Self::Contains(needle) => (
                text.contains(needle.as_str()),
                "Body contains",
                format!("text containing {needle:?}"),
            ),
            Self::IsEmpty => (text.is_empty(), "Body is empty", "empty".to_string()),
            Self::IsNotEmpty => (!text.is_empty(), "Body is not empty", "not empty".to_string()),
            Self::Matches(regex) => (
                regex.is_match(text),
                "Body matches",
                format!("/{}/", regex.as_str()),
            ),
        };

        if passed {
            Ok(())
        } else {
            Err(Violation::new(description, expected, format!("{text:?}")))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn headers() -> HeaderMap {
        HeaderMap::new()
            .with("Content-Type", "application/json; charset=utf-8")
            .with("Vary", "Origin")
            .with("Vary", "Accept-Encoding")
    }

    #[test]
    fn test_header_exists_is_case_insensitive() {
        assert!(HeaderMatcher::Exists.check("content-type", &headers()).is_ok());
        assert!(HeaderMatcher::DoesNotExist.check("X-Missing", &headers()).is_ok());
    }

    #[test]
    fn test_header_missing_violation() {
        let violation = HeaderMatcher::Exists.check("X-Trace", &headers()).unwrap_err();
        assert_eq!(violation.expected, "present");
        assert_eq!(violation.actual, "<not found>");
    }

    #[test]
    fn test_header_value_equals_checks_first_value() {
        assert!(HeaderMatcher::value_equals("Origin").check("vary", &headers()).is_ok());

        let violation = HeaderMatcher::value_equals("Accept-Encoding")
            .check("vary", &headers())
            .unwrap_err();
        assert_eq!(violation.actual, "Origin, Accept-Encoding");
    }

    #[test]
    fn test_header_value_matches_whole_value() {
        let full = HeaderMatcher::value_matches(r"application/json.*").unwrap();
        assert!(full.check("Content-Type", &headers()).is_ok());

        let partial = HeaderMatcher::value_matches("json").unwrap();
        let violation = partial.check("Content-Type", &headers()).unwrap_err();
        assert_eq!(violation.actual, "application/json; charset=utf-8");
    }

    #[test]
    fn test_header_invalid_pattern_rejected_at_construction() {
        assert!(HeaderMatcher::value_matches("(unclosed").is_err());
    }

    #[test]
    fn test_json_equality_and_emptiness() {
        let document = json!({"id": 1, "name": "Leanne", "tags": [], "address": {"city": "Gwenborough"}});
        let path = |p: &str| JsonPath::parse(p).unwrap();

        assert!(BodyJsonMatcher::is_equal_to(1.0).check(&path("id"), &document).is_ok());
        assert!(BodyJsonMatcher::is_equal_to("Gwenborough")
            .check(&path("$.address.city"), &document)
            .is_ok());
        assert!(BodyJsonMatcher::is_not_equal_to(2).check(&path("id"), &document).is_ok());
        assert!(BodyJsonMatcher::IsEmpty.check(&path("tags"), &document).is_ok());
        assert!(BodyJsonMatcher::IsEmpty.check(&path("missing"), &document).is_ok());
        assert!(BodyJsonMatcher::IsNotEmpty.check(&path("name"), &document).is_ok());
        assert!(BodyJsonMatcher::Exists.check(&path("address"), &document).is_ok());
        assert!(BodyJsonMatcher::DoesNotExist.check(&path("zip"), &document).is_ok());
    }

    #[test]
    fn test_json_violation_renders_values() {
        let document = json!({"name": "Leanne"});
        let violation = BodyJsonMatcher::is_equal_to("Ervin")
            .check(&JsonPath::parse("name").unwrap(), &document)
            .unwrap_err();

        assert_eq!(violation.description, "JSON path 'name' is equal");
        assert_eq!(violation.expected, "\"Ervin\"");
        assert_eq!(violation.actual, "\"Leanne\"");
    }

    #[test]
    fn test_json_satisfies_missing_path_is_violation() {
        let document = json!({"id": 1});
        let matcher = BodyJsonMatcher::satisfies(Value::is_number);

        assert!(matcher.check(&JsonPath::parse("id").unwrap(), &document).is_ok());
        let violation = matcher
            .check(&JsonPath::parse("missing").unwrap(), &document)
            .unwrap_err();
        assert_eq!(violation.actual, "<not found>");
    }

    #[test]
    fn test_json_matcher_debug_hides_predicate() {
        let matcher = BodyJsonMatcher::satisfies(|_| true);
        assert_eq!(format!("{matcher:?}"), "Satisfies(<predicate>)");
    }

    #[test]
    fn test_text_matchers() {
        let text = r#"{"status":"ok"}"#;
        assert!(BodyTextMatcher::is_equal_to(text).check(text).is_ok());
        assert!(BodyTextMatcher::contains("\"ok\"").check(text).is_ok());
        assert!(BodyTextMatcher::IsNotEmpty.check(text).is_ok());
        assert!(BodyTextMatcher::IsEmpty.check("").is_ok());
        assert!(BodyTextMatcher::matches(r#""status":"\w+""#).unwrap().check(text).is_ok());

        let violation = BodyTextMatcher::contains("error").check(text).unwrap_err();
        assert_eq!(violation.description, "Body contains");
        assert_eq!(violation.expected, "text containing \"error\"");
    }
}
