//! JSON codec used for request bodies and response decoding.
//!
//! Decode failures carry the byte offset of the offending input, derived
//! from the line/column position `serde_json` reports.

use serde_json::Value;
use thiserror::Error;

use crate::error::DecodeError;

/// A value could not be encoded as JSON.
#[derive(Debug, Error)]
#[error("JSON encoding failed: {0}")]
pub struct EncodeError(#[from] serde_json::Error);

/// Encodes a structural value into compact JSON bytes.
///
/// # Errors
///
/// Returns an error if the value cannot be serialized.
pub fn encode(value: &Value) -> Result<Vec<u8>, EncodeError> {
    Ok(serde_json::to_vec(value)?)
}

/// Decodes JSON bytes into a structural value.
///
/// # Errors
///
/// Returns a [`DecodeError`] with the byte offset of the failure.
pub fn decode(bytes: &[u8]) -> Result<Value, DecodeError> {
    serde_json::from_slice(bytes).map_err(|e| {
        let offset = byte_offset(bytes, e.line(), e.column());
        DecodeError::new(offset, e.to_string())
    })
}

/// Converts serde_json's 1-based line and column into a byte offset.
fn byte_offset(bytes: &[u8], line: usize, column: usize) -> Option<usize> {
    if line == 0 {
        return None;
    }
    let line_start = if line == 1 {
        0
    } else {
        bytes
            .iter()
            .enumerate()
            .filter(|(_, b)| **b == b'\n')
            .nth(line - 2)
            .map(|(i, _)| i + 1)?
    };
    Some((line_start + column.saturating_sub(1)).min(bytes.len()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_round_trip_preserves_structure() {
        let doc = json!({
            "id": 1,
            "ratio": 0.5,
            "name": "Leanne",
            "active": true,
            "manager": null,
            "tags": ["a", "b"],
            "address": {"city": "Gwenborough", "geo": {"lat": "-37.3159"}}
        });
        let bytes = encode(&doc).unwrap();
        assert_eq!(decode(&bytes).unwrap(), doc);
    }

    #[test]
    fn test_decode_reports_offset() {
        let err = decode(b"not json").unwrap_err();
        assert!(err.offset.is_some_and(|offset| offset < 3));
        assert!(err.reason.contains("expected"));
    }

    #[test]
    fn test_decode_reports_offset_on_later_line() {
        let err = decode(b"{\n  \"a\": 1,\n  \"b\": }").unwrap_err();
        // third line starts at byte 12
        let offset = err.offset.unwrap();
        assert!((12..=20).contains(&offset), "offset {offset}");
    }

    #[test]
    fn test_decode_empty_input() {
        let err = decode(b"").unwrap_err();
        assert_eq!(err.offset, Some(0));
    }
}
