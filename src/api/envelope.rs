//! Response envelope decoding and status classification.
//!
//! Every API response has the same outer shape:
//!
//! ```text
//! {"status": 200, "msg": "OK", "response": <anything>}
//! ```
//!
//! The `response` member is kept as an unparsed [`Payload`]; nothing here
//! knows whether it holds a post, a list of posts, a blog or a counter. The
//! Tumblr wire nests `status`/`msg` in a `meta` object, which is read when
//! the top-level `status` is absent.

use std::ops::Range;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::value::RawValue;

use crate::api::error::{ApiError, ApiResult};
use crate::api::post::{PostList, RawPost};

/// Envelope statuses treated as success.
pub const SUCCESS_STATUS: Range<i64> = 200..300;

// ============================================================================
// Payload
// ============================================================================

/// The opaque `response` member of an envelope.
///
/// Holds the exact JSON text sent by the server until a caller picks a shape
/// to decode it as.
#[derive(Debug, Clone)]
pub struct Payload(Box<RawValue>);

impl Payload {
    /// Wrap a JSON document, validating that it is well formed.
    pub fn from_json(json: impl Into<String>) -> ApiResult<Self> {
        Ok(Self(RawValue::from_string(json.into())?))
    }

    /// The raw JSON text.
    pub fn as_json(&self) -> &str {
        self.0.get()
    }

    pub fn is_null(&self) -> bool {
        self.0.get().trim() == "null"
    }

    /// Decode into any deserializable type.
    pub fn decode<T: DeserializeOwned>(&self) -> ApiResult<T> {
        serde_json::from_str(self.0.get()).map_err(|e| {
            ApiError::Decode(format!(
                "Failed to decode {}: {}",
                std::any::type_name::<T>(),
                e
            ))
        })
    }

    /// Treat the payload as a single post record.
    pub fn as_post(&self) -> ApiResult<RawPost> {
        self.decode()
    }

    /// Treat the payload as a list of post records.
    pub fn as_posts(&self) -> ApiResult<PostList> {
        self.decode()
    }

    pub fn into_raw(self) -> Box<RawValue> {
        self.0
    }
}

impl PartialEq for Payload {
    fn eq(&self, other: &Self) -> bool {
        self.0.get() == other.0.get()
    }
}

// ============================================================================
// Envelope
// ============================================================================

/// A decoded response envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub status: i64,
    /// Server message; empty when the server sent none.
    pub message: String,
    pub payload: Payload,
}

#[derive(Deserialize)]
struct WireEnvelope {
    status: Option<i64>,
    message: Option<String>,
    msg: Option<String>,
    meta: Option<WireMeta>,
    response: Option<Box<RawValue>>,
}

#[derive(Deserialize)]
struct WireMeta {
    status: Option<i64>,
    message: Option<String>,
    msg: Option<String>,
}

impl Envelope {
    /// Decode an envelope from a raw response body.
    ///
    /// Unknown top-level members are ignored. A body that is not JSON or has
    /// no status is a [`ApiError::Decode`].
    pub fn decode(body: &[u8]) -> ApiResult<Self> {
        let wire: WireEnvelope = serde_json::from_slice(body)
            .map_err(|e| ApiError::Decode(format!("Malformed response envelope: {}", e)))?;

        let (meta_status, meta_message) = match wire.meta {
            Some(meta) => (meta.status, meta.message.or(meta.msg)),
            None => (None, None),
        };

        let status = match wire.status.or(meta_status) {
            Some(status) => status,
            None => {
                return Err(ApiError::Decode(
                    "Response envelope has no status".to_string(),
                ))
            }
        };
        let message = wire
            .message
            .or(wire.msg)
            .or(meta_message)
            .unwrap_or_default();
        let payload = match wire.response {
            Some(raw) => Payload(raw),
            None => Payload(RawValue::from_string("null".to_string())?),
        };

        Ok(Self {
            status,
            message,
            payload,
        })
    }

    pub fn is_success(&self) -> bool {
        SUCCESS_STATUS.contains(&self.status)
    }

    /// Split into the payload on success or an [`ApiError::Status`].
    pub fn classify(self) -> ApiResult<Payload> {
        if self.is_success() {
            tracing::debug!(status = self.status, "Envelope classified as success");
            return Ok(self.payload);
        }
        tracing::warn!(
            status = self.status,
            message = %self.message,
            "API returned error status"
        );
        Err(ApiError::Status {
            status: self.status,
            message: self.message,
        })
    }
}

/// Free-function form of [`Envelope::classify`].
pub fn classify(envelope: Envelope) -> ApiResult<Payload> {
    envelope.classify()
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn envelope(status: i64, message: &str) -> Envelope {
        Envelope {
            status,
            message: message.to_string(),
            payload: Payload::from_json(r#"{"total_posts": 8}"#).unwrap(),
        }
    }

    #[test]
    fn test_decode_top_level_fields() {
        let env = Envelope::decode(br#"{"status":200,"message":"OK","response":{"a":1}}"#).unwrap();
        assert_eq!(env.status, 200);
        assert_eq!(env.message, "OK");
        assert_eq!(env.payload.as_json(), r#"{"a":1}"#);
    }

    #[test]
    fn test_decode_msg_alias() {
        let env = Envelope::decode(br#"{"status":404,"msg":"Not Found"}"#).unwrap();
        assert_eq!(env.status, 404);
        assert_eq!(env.message, "Not Found");
        assert!(env.payload.is_null());
    }

    #[test]
    fn test_decode_meta_fallback() {
        let env = Envelope::decode(
            br#"{"meta": {"status": 201, "msg": "Created"}, "response": {"id": 5}}"#,
        )
        .unwrap();
        assert_eq!(env.status, 201);
        assert_eq!(env.message, "Created");
    }

    #[test]
    fn test_payload_preserved_byte_for_byte() {
        let body = br#"{"status":200,"response":{ "b" : [1, 2.50, "x"],  "a":null }}"#;
        let env = Envelope::decode(body).unwrap();
        assert_eq!(env.payload.as_json(), r#"{ "b" : [1, 2.50, "x"],  "a":null }"#);
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let env = Envelope::decode(br#"{"status":200,"errors":[],"extra":{"x":1},"response":[]}"#).unwrap();
        assert_eq!(env.payload.as_json(), "[]");
    }

    #[test]
    fn test_missing_status_is_decode_error() {
        let err = Envelope::decode(br#"{"response":{"a":1}}"#).unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[test]
    fn test_malformed_body_is_decode_error() {
        let err = Envelope::decode(b"<html>502 Bad Gateway</html>").unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
        let err = Envelope::decode(br#"{"status":200,"response":{"a":"#).unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[test]
    fn test_non_integer_status_is_decode_error() {
        let err = Envelope::decode(br#"{"status":"200"}"#).unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[test]
    fn test_classify_success_returns_payload_unchanged() {
        for status in [200, 201, 204, 299] {
            let env = envelope(status, "");
            let expected = env.payload.clone();
            assert_eq!(env.classify().unwrap(), expected);
        }
    }

    #[test]
    fn test_classify_failure_keeps_message_verbatim() {
        for status in [0, -1, 199, 300, 301, 401, 404, 429, 500, 503, 1000] {
            let err = classify(envelope(status, "Something  went wrong!")).unwrap_err();
            match err {
                ApiError::Status { status: s, message } => {
                    assert_eq!(s, status);
                    assert_eq!(message, "Something  went wrong!");
                }
                other => panic!("unexpected error: {other:?}"),
            }
        }
    }

    #[test]
    fn test_classify_boundaries() {
        assert!(envelope(200, "").classify().is_ok());
        assert!(envelope(300, "").classify().is_err());
        assert!(envelope(199, "").classify().is_err());
    }

    #[test]
    fn test_payload_decode_error_names_type() {
        let payload = Payload::from_json("[1,2]").unwrap();
        let err = payload.decode::<std::collections::HashMap<String, i64>>().unwrap_err();
        assert!(matches!(err, ApiError::Decode(ref msg) if msg.contains("HashMap")));
    }

    proptest! {
        #[test]
        fn test_classify_any_status(status in any::<i64>(), message in "\\PC*") {
            let env = Envelope {
                status,
                message: message.clone(),
                payload: Payload::from_json(r#"{"total_posts": 8}"#).unwrap(),
            };
            match env.classify() {
                Ok(payload) => {
                    prop_assert!((200..300).contains(&status));
                    prop_assert_eq!(payload.as_json(), r#"{"total_posts": 8}"#);
                }
                Err(ApiError::Status { status: s, message: m }) => {
                    prop_assert!(!(200..300).contains(&status));
                    prop_assert_eq!(s, status);
                    prop_assert_eq!(m, message);
                }
                Err(other) => prop_assert!(false, "unexpected error: {:?}", other),
            }
        }

        #[test]
        fn test_decode_keeps_status_and_message(status in any::<i64>(), message in "\\PC*") {
            let body = serde_json::json!({"status": status, "msg": message, "response": [1]});
            let env = Envelope::decode(body.to_string().as_bytes()).unwrap();
            prop_assert_eq!(env.status, status);
            prop_assert_eq!(env.message, message);
            prop_assert_eq!(env.payload.as_json(), "[1]");
        }
    }
}
