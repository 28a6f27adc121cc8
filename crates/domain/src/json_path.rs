//! JSON-path evaluation over decoded documents.
//!
//! Paths are dot-separated field names with optional array indices:
//! `address.city`, `items.0.id` and `items[0].id` all work. A leading
//! `$` or `$.` is accepted and ignored; the empty path (or `$` alone)
//! refers to the document root.
//!
//! Absence is a normal outcome: [`JsonPath::get`] returns
//! [`Lookup::NotFound`], which is distinct from finding an explicit
//! `null`. Only [`JsonPath::test`] requires the path to be present.

use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use crate::error::{PathNotFoundError, PathSyntaxError};

/// One step of a path.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    /// Object key, or array index when the key is all digits.
    Field(String),
    /// Bracketed array index.
    Index(usize),
}

/// A parsed JSON-path expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonPath {
    raw: String,
    segments: Vec<Segment>,
}

/// Outcome of resolving a path against a document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Lookup<'a> {
    /// The path resolved to this value (which may be `null`).
    Found(&'a Value),
    /// The path does not exist in the document.
    NotFound,
}

impl<'a> Lookup<'a> {
    /// Returns the resolved value, if any.
    #[must_use]
    pub const fn value(self) -> Option<&'a Value> {
        match self {
            Self::Found(value) => Some(value),
            Self::NotFound => None,
        }
    }

    /// Returns true if the path resolved.
    #[must_use]
    pub const fn is_found(self) -> bool {
        matches!(self, Self::Found(_))
    }
}

impl JsonPath {
    /// Parses a path expression.
    ///
    /// # Errors
    ///
    /// Returns a [`PathSyntaxError`] for empty segments (`a..b`, `a.`),
    /// unclosed brackets and non-numeric bracket indices.
    pub fn parse(path: &str) -> Result<Self, PathSyntaxError> {
        let trimmed = path.trim();
        let body = match trimmed.strip_prefix('$') {
            Some(rest) if rest.is_empty() || rest.starts_with('[') => rest,
            Some(rest) => match rest.strip_prefix('.') {
                Some("") => return Err(syntax_error(path, "empty segment")),
                Some(body) => body,
                None => return Err(syntax_error(path, "expected '.' or '[' after '$'")),
            },
            None => trimmed,
        };

        Ok(Self {
            raw: path.to_string(),
            segments: parse_segments(path, body)?,
        })
    }

    /// The path that addresses the document root.
    #[must_use]
    pub fn root() -> Self {
        Self {
            raw: String::new(),
            segments: Vec::new(),
        }
    }

    /// Returns the expression as written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Resolves the path against a document.
    #[must_use]
    pub fn get<'a>(&self, document: &'a Value) -> Lookup<'a> {
        self.segments
            .iter()
            .try_fold(document, step)
            .map_or(Lookup::NotFound, Lookup::Found)
    }

    /// Returns true if the path resolves to a value deeply equal to `expected`.
    ///
    /// Numbers compare by numeric value, so `1` equals `1.0`.
    #[must_use]
    pub fn equals(&self, document: &Value, expected: &Value) -> bool {
        self.get(document)
            .value()
            .is_some_and(|actual| json_eq(actual, expected))
    }

    /// Returns true if the path is missing or resolves to `null`, `""`, `[]` or `{}`.
    #[must_use]
    pub fn is_empty(&self, document: &Value) -> bool {
        self.get(document).value().is_none_or(is_empty_value)
    }

    /// Applies a predicate to the resolved value.
    ///
    /// # Errors
    ///
    /// Returns a [`PathNotFoundError`] if the path does not resolve.
    pub fn test<F>(&self, document: &Value, predicate: F) -> Result<bool, PathNotFoundError>
    where
        F: FnOnce(&Value) -> bool,
    {
        match self.get(document) {
            Lookup::Found(value) => Ok(predicate(value)),
            Lookup::NotFound => Err(PathNotFoundError {
                path: self.raw.clone(),
            }),
        }
    }
}

impl FromStr for JsonPath {
    type Err = PathSyntaxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.raw.is_empty() {
            f.write_str("$")
        } else {
            f.write_str(&self.raw)
        }
    }
}

fn syntax_error(path: &str, reason: &str) -> PathSyntaxError {
    PathSyntaxError {
        path: path.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_segments(path: &str, body: &str) -> Result<Vec<Segment>, PathSyntaxError> {
    let mut segments = Vec::new();
    let mut field = String::new();
    let mut chars = body.chars().peekable();
    // set at the start and after every '.'
    let mut expect_name = true;

    while let Some(ch) = chars.next() {
        match ch {
            '.' => {
                if field.is_empty() && expect_name {
                    return Err(syntax_error(path, "empty segment"));
                }
                if !field.is_empty() {
                    segments.push(Segment::Field(std::mem::take(&mut field)));
                }
                expect_name = true;
            }
            '[' => {
                if !field.is_empty() {
                    segments.push(Segment::Field(std::mem::take(&mut field)));
                } else if expect_name && !segments.is_empty() {
                    return Err(syntax_error(path, "empty segment"));
                }

                let mut index = String::new();
                loop {
                    match chars.next() {
                        Some(']') => break,
                        Some(c) => index.push(c),
                        None => return Err(syntax_error(path, "unclosed '['")),
                    }
                }
                let index = index.trim();
                if index.is_empty() || !index.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(syntax_error(
                        path,
                        &format!("array index '{index}' is not a number"),
                    ));
                }
                let index = index
                    .parse::<usize>()
                    .map_err(|e| syntax_error(path, &e.to_string()))?;
                segments.push(Segment::Index(index));
                expect_name = false;

                if chars.peek().is_some_and(|next| *next != '.' && *next != '[') {
                    return Err(syntax_error(path, "expected '.' or '[' after ']'"));
                }
            }
            ']' => return Err(syntax_error(path, "unexpected ']'")),
            c => {
                field.push(c);
                expect_name = false;
            }
        }
    }

    if !field.is_empty() {
        segments.push(Segment::Field(field));
    } else if expect_name && !segments.is_empty() {
        return Err(syntax_error(path, "empty segment"));
    }

    Ok(segments)
}

fn step<'a>(value: &'a Value, segment: &Segment) -> Option<&'a Value> {
    match (value, segment) {
        (Value::Object(map), Segment::Field(name)) => map.get(name),
        (Value::Array(items), Segment::Field(name))
            if !name.is_empty() && name.bytes().all(|b| b.is_ascii_digit()) =>
        {
            name.parse::<usize>().ok().and_then(|i| items.get(i))
        }
        (Value::Array(items), Segment::Index(i)) => items.get(*i),
        _ => None,
    }
}

/// Returns true for `null`, `""`, `[]` and `{}`.
#[must_use]
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

/// Deep structural equality.
///
/// Numbers compare by numeric value regardless of integer or float
/// representation. Arrays are order-sensitive, object keys are not.
#[must_use]
pub fn json_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Number(x), Value::Number(y)) => numbers_eq(x, y),
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(l, r)| json_eq(l, r))
        }
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x
                    .iter()
                    .all(|(key, l)| y.get(key).is_some_and(|r| json_eq(l, r)))
        }
        _ => false,
    }
}

#[allow(clippy::float_cmp)] // exact numeric equality is the contract
fn integer_of(n: &serde_json::Number) -> Option<i128> {
    n.as_i64()
        .map(i128::from)
        .or_else(|| n.as_u64().map(i128::from))
}

// The cast saturates, and a saturated value is outside every i64/u64.
#[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
fn float_is_integer(float: f64, integer: i128) -> bool {
    float.is_finite() && float.fract() == 0.0 && float as i128 == integer
}

#[allow(clippy::float_cmp)]
fn numbers_eq(x: &serde_json::Number, y: &serde_json::Number) -> bool {
    match (integer_of(x), integer_of(y)) {
        (Some(a), Some(b)) => a == b,
        (Some(i), None) => y.as_f64().is_some_and(|f| float_is_integer(f, i)),
        (None, Some(i)) => x.as_f64().is_some_and(|f| float_is_integer(f, i)),
        (None, None) => matches!((x.as_f64(), y.as_f64()), (Some(a), Some(b)) if a == b),
    }
}
