//! Fluent assertion chain over a captured exchange.
//!
//! A chain starts `Open`. The first failing check records its violation
//! and moves the chain to `Failed`; every later check is a no-op. The
//! outcome is read with [`AssertionChain::finish`].

use std::time::Duration;

use thiserror::Error;
use verity_domain::{
    CookieMatcher, DecodeError, Exchange, JsonPath, PathSyntaxError, StatusMatcher, Violation,
};

use super::matchers::{BodyJsonMatcher, BodyTextMatcher, HeaderMatcher};

/// Lifecycle state of a chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainState {
    /// No check has failed yet.
    Open,
    /// A check failed; further checks are skipped.
    Failed,
}

/// Usage errors raised by body checks. These are not violations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    /// The body could not be decoded as JSON or UTF-8 text.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The JSON path is malformed.
    #[error(transparent)]
    InvalidPath(#[from] PathSyntaxError),
}

/// The first violation of a failed chain, with the exchange it was found on.
///
/// Owns a copy of the exchange so it can travel as `Box<dyn Error>`.
#[derive(Debug, Clone, Error)]
#[error("assertion failed: {violation}")]
pub struct AssertionFailure {
    /// The violation that failed the chain.
    pub violation: Violation,
    /// The exchange the chain ran against.
    pub exchange: Box<Exchange>,
}

/// Starts an assertion chain over an exchange.
#[must_use]
pub const fn verify(exchange: &Exchange) -> AssertionChain<'_> {
    AssertionChain::new(exchange)
}

/// Fail-fast fluent builder of checks against one exchange.
///
/// # Example
///
/// ```ignore
/// verify(&exchange)
///     .expect_status(StatusMatcher::Ok)
///     .expect_header("Content-Type", HeaderMatcher::Exists)
///     .expect_body_json("$.id", BodyJsonMatcher::is_equal_to(1))?
///     .finish()?;
/// ```
#[derive(Debug)]
pub struct AssertionChain<'a> {
    exchange: &'a Exchange,
    failures: Vec<Violation>,
    state: ChainState,
}

impl<'a> AssertionChain<'a> {
    /// Creates an open chain with no violations.
    #[must_use]
    pub const fn new(exchange: &'a Exchange) -> Self {
        Self {
            exchange,
            failures: Vec::new(),
            state: ChainState::Open,
        }
    }

    /// Returns the current state.
    #[must_use]
    pub const fn state(&self) -> ChainState {
        self.state
    }

    /// Returns the recorded violations (at most one).
    #[must_use]
    pub fn violations(&self) -> &[Violation] {
        &self.failures
    }

    /// Returns the exchange under test.
    #[must_use]
    pub const fn exchange(&self) -> &'a Exchange {
        self.exchange
    }

    /// Checks the response status.
    #[must_use]
    pub fn expect_status(self, matcher: impl Into<StatusMatcher>) -> Self {
        if self.state == ChainState::Failed {
            return self;
        }
        let matcher = matcher.into();
        let status = self.exchange.status();
        let outcome = if matcher.matches(status) {
            Ok(())
        } else {
            Err(Violation::new(
                "Status code",
                matcher.expected(),
                status.as_u16().to_string(),
            ))
        };
        self.record("status", outcome)
    }

    /// Checks a response header. Names are case-insensitive.
    #[must_use]
    pub fn expect_header(self, name: &str, matcher: HeaderMatcher) -> Self {
        if self.state == ChainState::Failed {
            return self;
        }
        let outcome = matcher.check(name, self.exchange.response_headers());
        self.record("header", outcome)
    }

    /// Checks a response cookie.
    #[must_use]
    pub fn expect_cookie(self, name: &str, matcher: CookieMatcher) -> Self {
        if self.state == ChainState::Failed {
            return self;
        }
        let outcome = matcher.check(name, self.exchange.response_cookies());
        self.record("cookie", outcome)
    }

    /// Checks a value located by a JSON path in the decoded body.
    ///
    /// # Errors
    ///
    /// Returns `ChainError::InvalidPath` if the path is malformed and
    /// `ChainError::Decode` if the body is not valid JSON.
    pub fn expect_body_json(self, path: &str, matcher: BodyJsonMatcher) -> Result<Self, ChainError> {
        if self.state == ChainState::Failed {
            return Ok(self);
        }
        let path = JsonPath::parse(path)?;
        let document = self.exchange.json()?;
        let outcome = matcher.check(&path, document);
        Ok(self.record("body json", outcome))
    }

    /// Checks the body decoded as UTF-8 text.
    ///
    /// # Errors
    ///
    /// Returns `ChainError::Decode` if the body is not valid UTF-8.
    pub fn expect_body_text(self, matcher: BodyTextMatcher) -> Result<Self, ChainError> {
        if self.state == ChainState::Failed {
            return Ok(self);
        }
        let text = self.exchange.text()?;
        let outcome = matcher.check(text);
        Ok(self.record("body text", outcome))
    }

    /// Checks that the exchange completed within `max`.
    #[must_use]
    pub fn expect_response_time(self, max: Duration) -> Self {
        if self.state == ChainState::Failed {
            return self;
        }
        let elapsed = self.exchange.elapsed();
        let outcome = if elapsed <= max {
            Ok(())
        } else {
            Err(Violation::new(
                "Response time",
                format!("<= {} ms", max.as_millis()),
                format!("{} ms", elapsed.as_millis()),
            ))
        };
        self.record("response time", outcome)
    }

    /// Hands the exchange to a caller closure while the chain is open.
    #[must_use]
    pub fn consume_with<F>(self, consumer: F) -> Self
    where
        F: FnOnce(&Exchange),
    {
        if self.state == ChainState::Open {
            consumer(self.exchange);
        }
        self
    }

    /// Returns the exchange if every check passed, or the first violation.
    ///
    /// Can be called any number of times with the same result.
    ///
    /// # Errors
    ///
    /// Returns an [`AssertionFailure`] when the chain is `Failed`.
    pub fn finish(&self) -> Result<&'a Exchange, AssertionFailure> {
        match self.failures.first() {
            None => Ok(self.exchange),
            Some(violation) => Err(AssertionFailure {
                violation: violation.clone(),
                exchange: Box::new(self.exchange.clone()),
            }),
        }
    }

    fn record(mut self, check: &str, outcome: Result<(), Violation>) -> Self {
        match outcome {
            Ok(()) => {
                tracing::debug!(exchange = %self.exchange.id(), check, "check passed");
            }
            Err(violation) => {
                tracing::debug!(
                    exchange = %self.exchange.id(),
                    check,
                    "check failed: {violation}"
                );
                self.failures.push(violation);
                self.state = ChainState::Failed;
            }
        }
        self
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use url::Url;
    use verity_domain::{
        CookieMap, ExchangeRequest, ExchangeResponse, HeaderMap, HttpMethod, StatusClass,
        StatusCode,
    };

    fn exchange(status: u16, headers: HeaderMap, body: &[u8]) -> Exchange {
        Exchange::new(
            ExchangeRequest {
                method: HttpMethod::Get,
                uri: "/users/1".to_string(),
                url: Url::parse("https://jsonplaceholder.typicode.com/users/1").unwrap(),
                headers: HeaderMap::new(),
                body: Vec::new(),
            },
            ExchangeResponse {
                status: StatusCode::new(status),
                headers,
                cookies: CookieMap::new(),
                body: body.to_vec(),
            },
            Duration::from_millis(120),
        )
    }

    fn user() -> Exchange {
        exchange(
            200,
            HeaderMap::new().with("Content-Type", "application/json"),
            br#"{"id":1,"name":"Leanne Graham","address":{"city":"Gwenborough"},"tags":[]}"#,
        )
    }

    #[test]
    fn test_passing_chain_finishes_with_exchange() {
        let exchange = user();
        let chain = verify(&exchange)
            .expect_status(StatusMatcher::Ok)
            .expect_status(StatusMatcher::SUCCESSFUL)
            .expect_header("content-type", HeaderMatcher::value_equals("application/json"))
            .expect_body_json("id", BodyJsonMatcher::is_equal_to(1))
            .unwrap()
            .expect_body_json("$.address.city", BodyJsonMatcher::is_equal_to("Gwenborough"))
            .unwrap()
            .expect_body_json("tags", BodyJsonMatcher::IsEmpty)
            .unwrap()
            .expect_response_time(Duration::from_secs(1));

        assert_eq!(chain.state(), ChainState::Open);
        assert!(chain.violations().is_empty());
        assert_eq!(chain.finish().unwrap().id(), exchange.id());
    }

    #[test]
    fn test_first_failure_wins_and_later_checks_are_skipped() {
        let exchange = user();
        let chain = verify(&exchange)
            .expect_status(404_u16)
            .expect_header("X-Missing", HeaderMatcher::Exists)
            .expect_body_json("name", BodyJsonMatcher::is_equal_to("nobody"))
            .unwrap();

        assert_eq!(chain.state(), ChainState::Failed);
        assert_eq!(chain.violations().len(), 1);

        let failure = chain.finish().unwrap_err();
        assert_eq!(failure.violation, Violation::new("Status code", "404", "200"));
        assert_eq!(failure.exchange.id(), exchange.id());
        assert_eq!(
            failure.to_string(),
            "assertion failed: Status code: expected 404, got 200"
        );
    }

    fn status_of(exchange: &Exchange, expected: u16) -> Result<u16, Box<dyn std::error::Error>> {
        let exchange = verify(exchange).expect_status(expected).finish()?;
        Ok(exchange.status().as_u16())
    }

    #[test]
    fn test_finish_works_with_question_mark() -> Result<(), Box<dyn std::error::Error>> {
        let exchange = user();
        let passed = verify(&exchange)
            .expect_status(200_u16)
            .expect_body_json("id", BodyJsonMatcher::is_equal_to(1))?
            .finish()?;
        assert_eq!(passed.id(), exchange.id());

        assert_eq!(status_of(&exchange, 200)?, 200);
        let err = status_of(&exchange, 404).unwrap_err();
        assert_eq!(
            err.to_string(),
            "assertion failed: Status code: expected 404, got 200"
        );
        Ok(())
    }

    #[test]
    fn test_failure_outlives_the_chain() {
        let exchange = user();
        let failure = {
            let chain = verify(&exchange).expect_status(StatusMatcher::NotFound);
            chain.finish().unwrap_err()
        };
        assert_eq!(failure.exchange.id(), exchange.id());
        assert_eq!(failure.exchange.json().unwrap()["id"], 1);
    }

    #[test]
    fn test_finish_is_idempotent() {
        let exchange = user();
        let chain = verify(&exchange).expect_status(StatusClass::ClientError);

        let first = chain.finish().unwrap_err();
        let second = chain.finish().unwrap_err();
        assert_eq!(first.violation, second.violation);
        assert_eq!(first.violation.expected, "4xx");
    }

    #[test]
    fn test_failed_chain_skips_body_decoding() {
        let exchange = exchange(500, HeaderMap::new(), b"not json");
        let chain = verify(&exchange)
            .expect_status(StatusMatcher::Ok)
            .expect_body_json("id", BodyJsonMatcher::Exists);

        assert!(chain.is_ok());
    }

    #[test]
    fn test_non_json_body_is_decode_error() {
        let exchange = exchange(200, HeaderMap::new(), b"<html></html>");
        let err = verify(&exchange)
            .expect_body_json("id", BodyJsonMatcher::Exists)
            .unwrap_err();
        assert!(matches!(err, ChainError::Decode(_)));
    }

    #[test]
    fn test_malformed_path_is_invalid_path_error() {
        let exchange = user();
        let err = verify(&exchange)
            .expect_body_json("address..city", BodyJsonMatcher::Exists)
            .unwrap_err();
        assert!(matches!(err, ChainError::InvalidPath(_)));
    }

    #[test]
    fn test_non_utf8_body_is_decode_error_for_text() {
        let exchange = exchange(200, HeaderMap::new(), &[0xff, 0xfe]);
        let err = verify(&exchange)
            .expect_body_text(BodyTextMatcher::IsNotEmpty)
            .unwrap_err();
        assert!(matches!(err, ChainError::Decode(_)));
    }

    #[test]
    fn test_text_and_cookie_checks() {
        let exchange = user();
        let chain = verify(&exchange)
            .expect_body_text(BodyTextMatcher::contains("Leanne"))
            .unwrap()
            .expect_cookie("sessionId", CookieMatcher::DoesNotExist)
            .expect_cookie("sessionId", CookieMatcher::Exists);

        let failure = chain.finish().unwrap_err();
        assert_eq!(failure.violation.description, "Cookie 'sessionId' exists");
    }

    #[test]
    fn test_response_time_violation() {
        let exchange = user();
        let failure = verify(&exchange)
            .expect_response_time(Duration::from_millis(50))
            .finish()
            .map(|_| ())
            .unwrap_err();
        assert_eq!(failure.violation.expected, "<= 50 ms");
        assert_eq!(failure.violation.actual, "120 ms");
    }

    #[test]
    fn test_consume_with_runs_only_while_open() {
        let exchange = user();
        let mut seen = Vec::new();

        let chain = verify(&exchange)
            .consume_with(|e| seen.push(e.status().as_u16()))
            .expect_status(201_u16)
            .consume_with(|e| seen.push(e.status().as_u16()));

        assert_eq!(chain.state(), ChainState::Failed);
        assert_eq!(seen, vec![200]);
    }

    #[test]
    fn test_empty_body_with_no_content() {
        let exchange = exchange(204, HeaderMap::new(), b"");
        let chain = verify(&exchange)
            .expect_status(StatusMatcher::NoContent)
            .expect_body_text(BodyTextMatcher::IsEmpty)
            .unwrap();
        assert!(chain.finish().is_ok());
    }
}
