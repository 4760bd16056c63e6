//! Signed request construction.
//!
//! Requests are described as plain data ([`HttpRequest`]) so that building,
//! signing and sending stay separate steps. [`RequestBuilder`] turns a verb,
//! a relative path and a set of [`RequestOptions`] into a signed request:
//!
//! - `GET`: options go into the query string, there is no body.
//! - `POST`: options go into an `application/x-www-form-urlencoded` body,
//!   there is no query string.

use std::collections::btree_map;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::api::error::{ApiError, ApiResult};
use crate::auth::{Credentials, RequestSigner};

/// Content type used for POST bodies.
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Parameter injected into every GET request, carrying the consumer key.
pub const API_KEY_PARAM: &str = "api_key";

// ============================================================================
// HTTP request data
// ============================================================================

/// HTTP verb supported by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    /// Upper-case verb as it appears on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
        }
    }
}

/// An HTTP request described as plain data.
///
/// `url` never carries a query string; the encoded query lives in `query` so
/// that a signer can see the exact parameters that will be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub query: Option<String>,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    /// Create a request with no query, headers or body.
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            query: None,
            headers: Vec::new(),
            body: None,
        }
    }

    /// The URL including the query string, as sent on the wire.
    pub fn full_url(&self) -> String {
        match &self.query {
            Some(query) if !query.is_empty() => format!("{}?{}", self.url, query),
            _ => self.url.clone(),
        }
    }

    /// First header value with the given name (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Whether the body is form-encoded.
    pub fn has_form_body(&self) -> bool {
        self.body.is_some()
            && self
                .header("content-type")
                .is_some_and(|value| value.starts_with(FORM_CONTENT_TYPE))
    }
}

// ============================================================================
// RequestOptions
// ============================================================================

/// Request parameters: a mapping from parameter name to string value.
///
/// Keys are unique and the last write wins. ASCII letters in keys are
/// lower-cased on insertion, so `Limit` and `limit` name the same
/// parameter. Iteration and encoding happen in sorted key order, but the
/// remote API must not depend on parameter order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOptions {
    params: BTreeMap<String, String>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Insert a parameter, returning the value it replaced.
    pub fn set(&mut self, key: impl AsRef<str>, value: impl Into<String>) -> Option<String> {
        self.params.insert(normalize_key(key.as_ref()), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(&normalize_key(key)).map(String::as_str)
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.params.remove(&normalize_key(key))
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.params.contains_key(&normalize_key(key))
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, String> {
        self.params.iter()
    }

    /// Encode as `application/x-www-form-urlencoded`.
    ///
    /// The same encoding is used for query strings and POST bodies.
    pub fn encode(&self) -> ApiResult<String> {
        serde_urlencoded::to_string(&self.params)
            .map_err(|e| ApiError::InvalidParameter(format!("Failed to encode parameters: {}", e)))
    }

    /// Parse a form-encoded string. Duplicate keys resolve to the last value.
    pub fn decode(encoded: &str) -> ApiResult<Self> {
        let pairs: Vec<(String, String)> = serde_urlencoded::from_str(encoded)
            .map_err(|e| ApiError::Decode(format!("Invalid form encoding: {}", e)))?;
        Ok(pairs.into_iter().collect())
    }
}

fn normalize_key(key: &str) -> String {
    key.to_ascii_lowercase()
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for RequestOptions {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut options = Self::new();
        options.extend(iter);
        options
    }
}

impl<K: AsRef<str>, V: Into<String>> Extend<(K, V)> for RequestOptions {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.set(key, value);
        }
    }
}

impl<'a> IntoIterator for &'a RequestOptions {
    type Item = (&'a String, &'a String);
    type IntoIter = btree_map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.params.iter()
    }
}

// ============================================================================
// RequestBuilder
// ============================================================================

/// Builds and signs requests against a fixed host with fixed credentials.
///
/// Holds only immutable configuration, so one builder is shared by every
/// call a client makes.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    host: String,
    credentials: Arc<Credentials>,
    signer: Arc<dyn RequestSigner>,
    default_headers: Vec<(String, String)>,
}

impl RequestBuilder {
    pub fn new(
        host: impl Into<String>,
        credentials: Arc<Credentials>,
        signer: Arc<dyn RequestSigner>,
    ) -> Self {
        Self {
            host: host.into().trim_end_matches('/').to_string(),
            credentials,
            signer,
            default_headers: Vec::new(),
        }
    }

    /// Headers added to every request before signing.
    pub fn with_default_headers(mut self, headers: Vec<(String, String)>) -> Self {
        self.default_headers = headers;
        self
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Build and sign a request.
    ///
    /// `options` is never modified; the `api_key` parameter injected into
    /// GET requests is added to a private copy. A query string already
    /// present in `path` is merged into that copy, with `options` taking
    /// precedence on duplicate keys.
    pub fn build(&self, method: Method, path: &str, options: &RequestOptions) -> ApiResult<HttpRequest> {
        let (path, mut params) = match path.split_once('?') {
            Some((path, inline)) => {
                let inline = RequestOptions::decode(inline).map_err(|e| {
                    ApiError::InvalidParameter(format!("Invalid query in path '{}': {}", path, e))
                })?;
                (path, inline)
            }
            None => (path, RequestOptions::new()),
        };
        params.extend(options);

        let url = format!("{}/{}", self.host, path.trim_start_matches('/'));
        let mut request = HttpRequest::new(method, url);
        request.headers.extend(self.default_headers.iter().cloned());

        match method {
            Method::Get => {
                params.set(API_KEY_PARAM, self.credentials.consumer_key());
                request.query = Some(params.encode()?);
            }
            Method::Post => {
                request
                    .headers
                    .push(("Content-Type".to_string(), FORM_CONTENT_TYPE.to_string()));
                request.body = Some(params.encode()?);
            }
        }

        Ok(self.signer.sign(request, &self.credentials)?)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::auth::{OAuth1Signer, SigningError};

    fn builder() -> RequestBuilder {
        RequestBuilder::new(
            "https://api.tumblr.com/",
            Arc::new(Credentials::new("ckey", "csecret", "token", "tsecret")),
            Arc::new(OAuth1Signer::new()),
        )
    }

    #[derive(Debug)]
    struct FailingSigner;

    impl RequestSigner for FailingSigner {
        fn sign(&self, _request: HttpRequest, _credentials: &Credentials) -> Result<HttpRequest, SigningError> {
            Err(SigningError::Clock("clock went backwards".to_string()))
        }
    }

    #[test]
    fn test_options_last_write_wins() {
        let mut options = RequestOptions::new();
        assert_eq!(options.set("limit", "1"), None);
        assert_eq!(options.set("limit", "2"), Some("1".to_string()));
        assert_eq!(options.get("limit"), Some("2"));
        assert_eq!(options.len(), 1);
    }

    #[test]
    fn test_options_keys_are_case_consistent() {
        let options = RequestOptions::new().with("Limit", "5").with("LIMIT", "6");
        assert_eq!(options.len(), 1);
        assert_eq!(options.get("limit"), Some("6"));
        assert!(options.contains_key("LiMiT"));
    }

    #[test]
    fn test_options_query_round_trip() {
        let options: RequestOptions = [
            ("tag", "rust lang"),
            ("before", "1392218146"),
            ("filter", "text&html=raw"),
            ("tag", "golang"),
        ]
        .into_iter()
        .collect();

        let encoded = options.encode().unwrap();
        let decoded = RequestOptions::decode(&encoded).unwrap();
        assert_eq!(decoded, options);
        assert_eq!(decoded.get("tag"), Some("golang"));
        assert_eq!(decoded.get("filter"), Some("text&html=raw"));
    }

    #[test]
    fn test_decode_duplicate_keys_keeps_last() {
        let decoded = RequestOptions::decode("limit=1&offset=3&limit=20").unwrap();
        assert_eq!(decoded.get("limit"), Some("20"));
        assert_eq!(decoded.get("offset"), Some("3"));
    }

    #[test]
    fn test_get_uses_query_string_only() {
        let options = RequestOptions::new().with("limit", "1");
        let request = builder().build(Method::Get, "/posts", &options).unwrap();

        assert_eq!(request.method, Method::Get);
        assert_eq!(request.url, "https://api.tumblr.com/posts");
        let query = request.query.as_deref().unwrap();
        assert!(query.split('&').any(|pair| pair == "limit=1"));
        assert!(query.split('&').any(|pair| pair == "api_key=ckey"));
        assert!(request.body.is_none());
        assert!(request.header("authorization").unwrap().starts_with("OAuth "));
    }

    #[test]
    fn test_post_uses_form_body_only() {
        let options = RequestOptions::new().with("limit", "1");
        let request = builder().build(Method::Post, "/posts", &options).unwrap();

        assert_eq!(request.method, Method::Post);
        assert!(request.query.is_none());
        assert_eq!(request.body.as_deref(), Some("limit=1"));
        assert_eq!(request.header("content-type"), Some(FORM_CONTENT_TYPE));
        assert!(request.has_form_body());
        assert_eq!(request.full_url(), "https://api.tumblr.com/posts");
    }

    #[test]
    fn test_build_does_not_mutate_caller_options() {
        let options = RequestOptions::new().with("limit", "1");
        let before = options.clone();
        builder().build(Method::Get, "/v2/user/likes", &options).unwrap();
        assert_eq!(options, before);
        assert!(!options.contains_key(API_KEY_PARAM));
    }

    #[test]
    fn test_default_headers_are_sent() {
        let request = builder()
            .with_default_headers(vec![("X-Client".to_string(), "test".to_string())])
            .build(Method::Get, "/v2/user/info", &RequestOptions::new())
            .unwrap();
        assert_eq!(request.header("x-client"), Some("test"));
    }

    #[test]
    fn test_signing_failure_is_surfaced() {
        let builder = RequestBuilder::new(
            "https://api.tumblr.com",
            Arc::new(Credentials::new("ckey", "csecret", "token", "tsecret")),
            Arc::new(FailingSigner),
        );
        let err = builder
            .build(Method::Get, "/v2/user/info", &RequestOptions::new())
            .unwrap_err();
        assert!(matches!(err, ApiError::Signing(SigningError::Clock(_))));
    }

    #[test]
    fn test_inline_query_is_merged_into_params() {
        let options = RequestOptions::new().with("offset", "2");
        let request = builder()
            .build(Method::Get, "/v2/blog/staff/posts?limit=1", &options)
            .unwrap();

        assert_eq!(request.url, "https://api.tumblr.com/v2/blog/staff/posts");
        let query = RequestOptions::decode(request.query.as_deref().unwrap()).unwrap();
        assert_eq!(query.get("limit"), Some("1"));
        assert_eq!(query.get("offset"), Some("2"));
        assert_eq!(query.get(API_KEY_PARAM), Some("ckey"));
        assert_eq!(request.full_url().matches('?').count(), 1);
    }

    #[test]
    fn test_inline_query_loses_to_options() {
        let options = RequestOptions::new().with("limit", "5");
        let request = builder()
            .build(Method::Post, "/v2/blog/staff/post?limit=1&state=draft", &options)
            .unwrap();

        assert_eq!(request.url, "https://api.tumblr.com/v2/blog/staff/post");
        assert!(request.query.is_none());
        assert_eq!(request.body.as_deref(), Some("limit=5&state=draft"));
    }

    #[test]
    fn test_inline_query_matches_options() {
        let signed_inline = builder()
            .build(Method::Get, "/v2/tagged?tag=rust", &RequestOptions::new())
            .unwrap();
        let signed_options = builder()
            .build(Method::Get, "/v2/tagged", &RequestOptions::new().with("tag", "rust"))
            .unwrap();
        assert_eq!(signed_inline.url, signed_options.url);
        assert_eq!(signed_inline.query, signed_options.query);
    }

    #[test]
    fn test_full_url_joins_query() {
        let mut request = HttpRequest::new(Method::Get, "https://api.tumblr.com/v2/tagged");
        request.query = Some("tag=rust".to_string());
        assert_eq!(request.full_url(), "https://api.tumblr.com/v2/tagged?tag=rust");
    }

    proptest! {
        #[test]
        fn test_encode_decode_round_trip(
            params in prop::collection::btree_map("[a-z_]{1,12}", "\\PC*", 0..8)
        ) {
            let options: RequestOptions = params.iter().collect();
            let decoded = RequestOptions::decode(&options.encode().unwrap()).unwrap();
            prop_assert_eq!(decoded, options);
        }

        #[test]
        fn test_get_never_has_body_and_post_never_has_query(
            params in prop::collection::btree_map("[a-z_]{1,12}", "\\PC*", 0..8)
        ) {
            let options: RequestOptions = params.iter().collect();
            let get = builder().build(Method::Get, "/posts", &options).unwrap();
            let post = builder().build(Method::Post, "/posts", &options).unwrap();

            prop_assert!(get.body.is_none());
            prop_assert!(post.query.is_none());
            let mut sent = RequestOptions::decode(get.query.as_deref().unwrap()).unwrap();
            sent.remove(API_KEY_PARAM);
            let mut expected = options.clone();
            expected.remove(API_KEY_PARAM);
            prop_assert_eq!(&sent, &expected);
            prop_assert_eq!(RequestOptions::decode(post.body.as_deref().unwrap()).unwrap(), options);
        }
    }
}
