//! Human-readable rendering of a captured exchange.

use std::fmt;

use verity_domain::{Exchange, HeaderMap};

/// Placeholder printed for a body that is not valid UTF-8.
pub const UNDECODABLE: &str = "<undecodable>";

/// Displays every captured field of an exchange, in a fixed order.
///
/// ```text
/// > GET /users/1
/// > URL: https://jsonplaceholder.typicode.com/users/1
/// > Accept: application/json
/// > Body: 0 bytes
/// < 200 OK
/// < Content-Type: application/json
/// < Set-Cookie: sessionId=abc; Domain=...; Path=/; HttpOnly
/// < Body: 8 bytes
/// {"id":1}
/// Elapsed: 42 ms
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ExchangeDump<'a>(pub &'a Exchange);

impl ExchangeDump<'_> {
    fn write_headers(f: &mut fmt::Formatter<'_>, prefix: char, headers: &HeaderMap) -> fmt::Result {
        for (name, value) in headers.pairs() {
            writeln!(f, "{prefix} {name}: {value}")?;
        }
        Ok(())
    }
}

impl fmt::Display for ExchangeDump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let exchange = self.0;

        writeln!(f, "> {} {}", exchange.request_method(), exchange.request_uri())?;
        writeln!(f, "> URL: {}", exchange.url())?;
        Self::write_headers(f, '>', exchange.request_headers())?;
        writeln!(f, "> Body: {} bytes", exchange.request_body().len())?;

        writeln!(f, "< {}", exchange.status())?;
        Self::write_headers(f, '<', exchange.response_headers())?;
        for cookie in exchange.response_cookies().iter() {
            writeln!(f, "< Cookie: {}", cookie.describe())?;
        }
        writeln!(f, "< Body: {} bytes", exchange.response_body().len())?;
        writeln!(f, "{}", exchange.text().unwrap_or(UNDECODABLE))?;

        write!(f, "Elapsed: {} ms", exchange.elapsed().as_millis())
    }
}

/// Renders an exchange for debugging. Never fails.
#[must_use]
pub fn dump(exchange: &Exchange) -> String {
    ExchangeDump(exchange).to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::time::Duration;

    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use url::Url;
    use verity_domain::{CookieMap, ExchangeRequest, ExchangeResponse, HttpMethod, StatusCode};

    fn exchange(body: &[u8]) -> Exchange {
        let response_headers = HeaderMap::new()
            .with("Content-Type", "application/json")
            .with("Set-Cookie", "sessionId=abc; Path=/; HttpOnly");
        let cookies = CookieMap::from_headers(
            &response_headers,
            "api.example.com",
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        );
        Exchange::new(
            ExchangeRequest {
                method: HttpMethod::Post,
                uri: "/posts".to_string(),
                url: Url::parse("https://api.example.com/posts").unwrap(),
                headers: HeaderMap::new()
                    .with("Accept", "application/json")
                    .with("X-Tag", "a")
                    .with("X-Tag", "b"),
                body: br#"{"title":"foo"}"#.to_vec(),
            },
            ExchangeResponse {
                status: StatusCode::new(201),
                headers: response_headers,
                cookies,
                body: body.to_vec(),
            },
            Duration::from_millis(42),
        )
    }

    #[test]
    fn test_dump_renders_every_field_in_order() {
        let rendered = dump(&exchange(br#"{"id":101}"#));

        let expected = "\
> POST /posts
> URL: https://api.example.com/posts
> Accept: application/json
> X-Tag: a
> X-Tag: b
> Body: 15 bytes
< 201 Created
< Content-Type: application/json
< Set-Cookie: sessionId=abc; Path=/; HttpOnly
< Cookie: sessionId=abc; Domain=api.example.com; Path=/; HttpOnly
< Body: 10 bytes
{\"id\":101}
Elapsed: 42 ms";
        assert_eq!(rendered, expected);
    }

    #[test]
    fn test_dump_is_deterministic() {
        let exchange = exchange(b"plain");
        assert_eq!(dump(&exchange), dump(&exchange));
    }

    #[test]
    fn test_dump_marks_binary_body() {
        let rendered = dump(&exchange(&[0xff, 0x00, 0xfe]));
        assert!(rendered.contains("< Body: 3 bytes\n<undecodable>\n"));
    }
}
