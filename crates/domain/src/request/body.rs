//! HTTP Request body types

use serde::{Deserialize, Serialize};

use crate::codec;
use crate::error::{DomainError, DomainResult};

/// HTTP request body as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RequestBody {
    /// No body
    #[default]
    None,
    /// Raw bytes sent unchanged
    Bytes {
        /// Payload
        content: Vec<u8>,
        /// Content type to announce, if any
        content_type: Option<String>,
    },
    /// UTF-8 text
    Text {
        /// Payload
        content: String,
    },
    /// A structural value encoded with the JSON codec
    Json {
        /// Value to encode
        value: serde_json::Value,
    },
}

/// A body ready to be written to the wire.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EncodedBody {
    /// Encoded payload (empty for no body).
    pub bytes: Vec<u8>,
    /// Content type implied by the body kind.
    pub content_type: Option<String>,
}

impl RequestBody {
    /// Creates a JSON body from any serializable value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be represented as JSON.
    pub fn json<T: Serialize>(value: &T) -> DomainResult<Self> {
        let value =
            serde_json::to_value(value).map_err(|e| DomainError::InvalidBody(e.to_string()))?;
        Ok(Self::Json { value })
    }

    /// Creates a plain text body.
    #[must_use]
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text {
            content: content.into(),
        }
    }

    /// Creates a raw byte body.
    #[must_use]
    pub fn bytes(content: impl Into<Vec<u8>>, content_type: Option<String>) -> Self {
        Self::Bytes {
            content: content.into(),
            content_type,
        }
    }

    /// Returns the content type implied by the body kind.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        match self {
            Self::None => None,
            Self::Bytes { content_type, .. } => content_type.as_deref(),
            Self::Text { .. } => Some("text/plain; charset=utf-8"),
            Self::Json { .. } => Some("application/json"),
        }
    }

    /// Encodes the body into wire bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if a JSON value cannot be encoded.
    pub fn encode(&self) -> DomainResult<EncodedBody> {
        let bytes = match self {
            Self::None => Vec::new(),
            Self::Bytes { content, .. } => content.clone(),
            Self::Text { content } => content.clone().into_bytes(),
            Self::Json { value } => {
                codec::encode(value).map_err(|e| DomainError::InvalidBody(e.to_string()))?
            }
        };
        Ok(EncodedBody {
            bytes,
            content_type: self.content_type().map(str::to_string),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_json_body_encodes_with_content_type() {
        let body = RequestBody::json(&json!({"title": "foo", "userId": 1})).unwrap();
        let encoded = body.encode().unwrap();
        assert_eq!(encoded.content_type.as_deref(), Some("application/json"));
        let decoded = codec::decode(&encoded.bytes).unwrap();
        assert_eq!(decoded, json!({"title": "foo", "userId": 1}));
    }

    #[test]
    fn test_text_body() {
        let encoded = RequestBody::text("hello").encode().unwrap();
        assert_eq!(encoded.bytes, b"hello");
        assert_eq!(
            encoded.content_type.as_deref(),
            Some("text/plain; charset=utf-8")
        );
    }

    #[test]
    fn test_empty_body() {
        let body = RequestBody::None;
        assert_eq!(body.content_type(), None);
        assert_eq!(body.encode().unwrap(), EncodedBody::default());
    }

    #[test]
    fn test_bytes_body_keeps_caller_content_type() {
        let body = RequestBody::bytes(vec![0xde, 0xad], Some("application/octet-stream".into()));
        assert_eq!(body.content_type(), Some("application/octet-stream"));
        assert_eq!(body.encode().unwrap().bytes, [0xde_u8, 0xad]);
    }
}
