//! Multi-valued HTTP header map.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Ordered mapping of header name to every value received for it.
///
/// Names keep the spelling of their first occurrence; all lookups are
/// case-insensitive. Repeated headers are preserved as multiple values
/// in arrival order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HeaderMap {
    entries: IndexMap<String, Vec<String>>,
}

impl HeaderMap {
    /// Creates an empty header map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a value, keeping any values already present for the name.
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.key_of(&name) {
            Some(key) => {
                if let Some(values) = self.entries.get_mut(&key) {
                    values.push(value);
                }
            }
            None => {
                self.entries.insert(name, vec![value]);
            }
        }
    }

    /// Sets a header, replacing every value previously stored for the name.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        match self.key_of(&name) {
            Some(key) => {
                if let Some(values) = self.entries.get_mut(&key) {
                    *values = vec![value.into()];
                }
            }
            None => {
                self.entries.insert(name, vec![value.into()]);
            }
        }
    }

    /// Builder-style [`HeaderMap::append`].
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.append(name, value);
        self
    }

    /// Returns the first value for a header.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.get_all(name).first().map(String::as_str)
    }

    /// Returns every value for a header, or an empty slice if absent.
    #[must_use]
    pub fn get_all(&self, name: &str) -> &[String] {
        self.entries
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, values)| values.as_slice())
            .unwrap_or_default()
    }

    /// Returns true if the header is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.key_of(name).is_some()
    }

    /// Iterates over header names with their values, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    /// Iterates over every (name, value) pair, one item per value.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().flat_map(|(name, values)| {
            values
                .iter()
                .map(move |value| (name.as_str(), value.as_str()))
        })
    }

    /// Returns the number of distinct header names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no headers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Checks that every name is an RFC 7230 token and no value contains CR or LF.
    ///
    /// # Errors
    ///
    /// Returns the first invalid name or value found.
    pub fn validate(&self) -> DomainResult<()> {
        for (name, value) in self.pairs() {
            if name.is_empty() || !name.bytes().all(is_token_byte) {
                return Err(DomainError::InvalidHeaderName(name.to_string()));
            }
            if value.contains(['\r', '\n']) {
                return Err(DomainError::InvalidHeaderValue(format!("{name}: {value}")));
            }
        }
        Ok(())
    }

    fn key_of(&self, name: &str) -> Option<String> {
        self.entries
            .keys()
            .find(|key| key.eq_ignore_ascii_case(name))
            .cloned()
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for HeaderMap {
    fn from_iter<T: IntoIterator<Item = (N, V)>>(iter: T) -> Self {
        let mut map = Self::new();
        for (name, value) in iter {
            map.append(name, value);
        }
        map
    }
}

const fn is_token_byte(b: u8) -> bool {
    matches!(b,
        b'!' | b'#' | b'$' | b'%' | b'&' | b'\'' | b'*' | b'+' | b'-' | b'.'
        | b'^' | b'_' | b'`' | b'|' | b'~' | b'0'..=b'9' | b'a'..=b'z' | b'A'..=b'Z')
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_lookup_is_case_insensitive() {
        let headers = HeaderMap::new().with("Content-Type", "application/json");
        assert_eq!(headers.get("content-type"), Some("application/json"));
        assert_eq!(headers.get("CONTENT-TYPE"), Some("application/json"));
        assert!(headers.contains("Content-type"));
    }

    #[test]
    fn test_repeated_headers_are_preserved_in_order() {
        let headers = HeaderMap::new()
            .with("Set-Cookie", "a=1")
            .with("X-Trace", "t")
            .with("set-cookie", "b=2");

        assert_eq!(headers.len(), 2);
        assert_eq!(headers.get_all("SET-COOKIE"), ["a=1", "b=2"]);
        let names: Vec<_> = headers.iter().map(|(name, _)| name).collect();
        assert_eq!(names, ["Set-Cookie", "X-Trace"]);
    }

    #[test]
    fn test_insert_replaces_all_values() {
        let mut headers = HeaderMap::new().with("Accept", "text/plain").with("accept", "*/*");
        headers.insert("ACCEPT", "application/json");
        assert_eq!(headers.get_all("accept"), ["application/json"]);
        let names: Vec<_> = headers.iter().map(|(name, _)| name).collect();
        assert_eq!(names, ["Accept"]);
    }

    #[test]
    fn test_missing_header_yields_empty_slice() {
        let headers = HeaderMap::new();
        assert!(headers.get_all("X-Missing").is_empty());
        assert_eq!(headers.get("X-Missing"), None);
    }

    #[test]
    fn test_validate() {
        assert!(HeaderMap::new().with("X-Ok", "fine").validate().is_ok());
        assert_eq!(
            HeaderMap::new().with("Bad Name", "v").validate(),
            Err(DomainError::InvalidHeaderName("Bad Name".to_string()))
        );
        assert!(matches!(
            HeaderMap::new().with("X-Inject", "a\r\nb: c").validate(),
            Err(DomainError::InvalidHeaderValue(_))
        ));
    }
}
