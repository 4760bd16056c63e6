//! Request signing for the Tumblr API.
//!
//! The engine treats signing as an opaque capability: anything implementing
//! [`RequestSigner`] can be plugged into the client. [`OAuth1Signer`] is the
//! default and implements OAuth 1.0a with HMAC-SHA1, which is what the
//! Tumblr v2 API expects for user-authenticated calls.
//!
//! # Signing Flow
//!
//! 1. Collect the `oauth_*` protocol parameters (consumer key, token, nonce,
//!    timestamp, method, version)
//! 2. Merge them with the request's query and form-body parameters
//! 3. Build the signature base string: `METHOD&url&params`
//! 4. HMAC-SHA1 it with `consumer_secret&token_secret`
//! 5. Attach everything as an `Authorization: OAuth ...` header

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use hmac::{Hmac, Mac};
use rand::distributions::Alphanumeric;
use rand::Rng;
use sha1::Sha1;
use thiserror::Error;

use crate::api::request::{HttpRequest, Method};

type HmacSha1 = Hmac<Sha1>;

/// Length of the generated `oauth_nonce`.
const NONCE_LEN: usize = 32;

/// Signing-specific errors
#[derive(Debug, Clone, Error)]
pub enum SigningError {
    /// A required credential is missing or unusable
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    /// System time error (before UNIX epoch)
    #[error("System time error: {0}")]
    Clock(String),

    /// The request could not be read for signing
    #[error("Malformed request: {0}")]
    MalformedRequest(String),
}

/// Result type alias for signing operations
pub type SigningResult<T> = Result<T, SigningError>;

// ============================================================================
// Credentials
// ============================================================================

/// OAuth 1.0a credentials: the application's consumer pair plus the user's
/// access token pair.
///
/// Constructed once and never changed afterwards. `Debug` output redacts
/// both secrets.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    consumer_key: String,
    consumer_secret: String,
    token: String,
    token_secret: String,
}

impl Credentials {
    /// # Arguments
    ///
    /// * `consumer_key` - Consumer key of the registered application
    /// * `consumer_secret` - Consumer secret of the registered application
    /// * `token` - User token from the `/access_token` endpoint
    /// * `token_secret` - User secret from the `/access_token` endpoint
    pub fn new(
        consumer_key: impl Into<String>,
        consumer_secret: impl Into<String>,
        token: impl Into<String>,
        token_secret: impl Into<String>,
    ) -> Self {
        Self {
            consumer_key: consumer_key.into(),
            consumer_secret: consumer_secret.into(),
            token: token.into(),
            token_secret: token_secret.into(),
        }
    }

    /// Credentials for calls that only need the application key
    /// (`api_key` endpoints), with no user token.
    pub fn application(consumer_key: impl Into<String>, consumer_secret: impl Into<String>) -> Self {
        Self::new(consumer_key, consumer_secret, "", "")
    }

    pub fn consumer_key(&self) -> &str {
        &self.consumer_key
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// Whether a user token is present.
    pub fn has_token(&self) -> bool {
        !self.token.is_empty()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("consumer_key", &self.consumer_key)
            .field("consumer_secret", &"<redacted>")
            .field("token", &self.token)
            .field("token_secret", &"<redacted>")
            .finish()
    }
}

// ============================================================================
// Signing capability
// ============================================================================

/// Signs a fully built request.
///
/// Implementations receive the request after its query string or form body
/// has been encoded and return it with whatever authentication material the
/// scheme requires.
pub trait RequestSigner: Send + Sync + fmt::Debug {
    fn sign(&self, request: HttpRequest, credentials: &Credentials) -> SigningResult<HttpRequest>;
}

/// OAuth 1.0a HMAC-SHA1 signer.
#[derive(Debug, Clone, Copy, Default)]
pub struct OAuth1Signer;

impl OAuth1Signer {
    pub fn new() -> Self {
        Self
    }

    /// Sign with an explicit nonce and timestamp.
    ///
    /// [`RequestSigner::sign`] generates both; this entry point exists so the
    /// signature can be reproduced.
    pub fn sign_with(
        &self,
        mut request: HttpRequest,
        credentials: &Credentials,
        nonce: &str,
        timestamp: u64,
    ) -> SigningResult<HttpRequest> {
        if credentials.consumer_key.is_empty() || credentials.consumer_secret.is_empty() {
            return Err(SigningError::InvalidCredentials(
                "consumer key and secret are required".to_string(),
            ));
        }

        let oauth_params = protocol_params(credentials, nonce, timestamp);

        let mut params = oauth_params.clone();
        if let Some(query) = request.query.as_deref() {
            params.extend(parse_form(query)?);
        }
        if request.has_form_body() {
            if let Some(body) = request.body.as_deref() {
                params.extend(parse_form(body)?);
            }
        }

        let base = signature_base_string(request.method, &request.url, &params);
        let key = format!(
            "{}&{}",
            percent_encode(&credentials.consumer_secret),
            percent_encode(&credentials.token_secret)
        );
        let signature = hmac_sha1_base64(&key, &base)?;

        let mut header_params = oauth_params;
        header_params.push(("oauth_signature".to_string(), signature));
        header_params.sort();
        let header = header_params
            .iter()
            .map(|(k, v)| format!("{}=\"{}\"", percent_encode(k), percent_encode(v)))
            .collect::<Vec<_>>()
            .join(", ");

        request
            .headers
            .retain(|(name, _)| !name.eq_ignore_ascii_case("authorization"));
        request
            .headers
            .push(("Authorization".to_string(), format!("OAuth {}", header)));
        Ok(request)
    }
}

impl RequestSigner for OAuth1Signer {
    fn sign(&self, request: HttpRequest, credentials: &Credentials) -> SigningResult<HttpRequest> {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|_| SigningError::Clock("System time before UNIX epoch".to_string()))?
            .as_secs();
        self.sign_with(request, credentials, &generate_nonce(), timestamp)
    }
}

fn protocol_params(credentials: &Credentials, nonce: &str, timestamp: u64) -> Vec<(String, String)> {
    let mut params = vec![
        ("oauth_consumer_key".to_string(), credentials.consumer_key.clone()),
        ("oauth_nonce".to_string(), nonce.to_string()),
        ("oauth_signature_method".to_string(), "HMAC-SHA1".to_string()),
        ("oauth_timestamp".to_string(), timestamp.to_string()),
        ("oauth_version".to_string(), "1.0".to_string()),
    ];
    if credentials.has_token() {
        params.push(("oauth_token".to_string(), credentials.token.clone()));
    }
    params
}

fn parse_form(encoded: &str) -> SigningResult<Vec<(String, String)>> {
    serde_urlencoded::from_str(encoded).map_err(|e| SigningError::MalformedRequest(e.to_string()))
}

/// Build the OAuth 1.0a signature base string.
///
/// `url` must not include the query string; its parameters belong in
/// `params`.
pub fn signature_base_string(method: Method, url: &str, params: &[(String, String)]) -> String {
    let mut encoded: Vec<(String, String)> = params
        .iter()
        .map(|(k, v)| (percent_encode(k), percent_encode(v)))
        .collect();
    encoded.sort();

    let normalized = encoded
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    format!(
        "{}&{}&{}",
        method.as_str(),
        percent_encode(url),
        percent_encode(&normalized)
    )
}

fn hmac_sha1_base64(key: &str, message: &str) -> SigningResult<String> {
    let mut mac = HmacSha1::new_from_slice(key.as_bytes())
        .map_err(|e| SigningError::InvalidCredentials(e.to_string()))?;
    mac.update(message.as_bytes());
    Ok(BASE64.encode(mac.finalize().into_bytes()))
}

/// RFC 3986 percent-encoding: everything but `A-Z a-z 0-9 - . _ ~`.
fn percent_encode(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

fn generate_nonce() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(NONCE_LEN)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn twitter_credentials() -> Credentials {
        Credentials::new(
            "xvz1evFS4wEEPTGEFPHBog",
            "kAcSOqF21Fu85e7zjz7ZN2U4ZRhfV3WpwPAoE3Z7kBw",
            "370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb",
            "LswwdoUaIvS8ltyTt5jkRh4J50vUPVVHtR2YPi5kE",
        )
    }

    fn twitter_request() -> HttpRequest {
        let mut request = HttpRequest::new(Method::Post, "https://api.twitter.com/1.1/statuses/update.json");
        request.query = Some("include_entities=true".to_string());
        request.headers.push((
            "Content-Type".to_string(),
            "application/x-www-form-urlencoded".to_string(),
        ));
        request.body = Some("status=Hello+Ladies+%2B+Gentlemen%2C+a+signed+OAuth+request%21".to_string());
        request
    }

    #[test]
    fn test_signature_base_string() {
        let params = vec![
            ("b".to_string(), "2".to_string()),
            ("a".to_string(), "x y".to_string()),
        ];
        let base = signature_base_string(Method::Get, "https://api.tumblr.com/v2/user/info", &params);
        assert_eq!(
            base,
            "GET&https%3A%2F%2Fapi.tumblr.com%2Fv2%2Fuser%2Finfo&a%3Dx%2520y%26b%3D2"
        );
    }

    #[test]
    fn test_known_signature_vector() {
        let signed = OAuth1Signer::new()
            .sign_with(
                twitter_request(),
                &twitter_credentials(),
                "kYjzVBB8Y0ZFabxSWbWovY3uYSQ2pTgmZeNu2VS4cg",
                1318622958,
            )
            .unwrap();

        let header = signed.header("Authorization").unwrap();
        assert!(header.starts_with("OAuth "));
        assert!(header.contains("oauth_signature=\"hCtSmYh%2BiHYCEqBWrE7C7hYmtUk%3D\""));
        assert!(header.contains("oauth_signature_method=\"HMAC-SHA1\""));
        assert!(header.contains("oauth_timestamp=\"1318622958\""));
    }

    #[test]
    fn test_signature_covers_parameters() {
        let signer = OAuth1Signer::new();
        let creds = twitter_credentials();
        let a = signer.sign_with(twitter_request(), &creds, "nonce", 1).unwrap();

        let mut changed = twitter_request();
        changed.query = Some("include_entities=false".to_string());
        let b = signer.sign_with(changed, &creds, "nonce", 1).unwrap();

        assert_ne!(a.header("Authorization"), b.header("Authorization"));
    }

    #[test]
    fn test_sign_replaces_existing_authorization() {
        let mut request = HttpRequest::new(Method::Get, "https://api.tumblr.com/v2/user/info");
        request.headers.push(("authorization".to_string(), "Bearer stale".to_string()));
        let signed = OAuth1Signer::new().sign(request, &twitter_credentials()).unwrap();

        let auth_headers: Vec<_> = signed
            .headers
            .iter()
            .filter(|(name, _)| name.eq_ignore_ascii_case("authorization"))
            .collect();
        assert_eq!(auth_headers.len(), 1);
        assert!(auth_headers[0].1.starts_with("OAuth "));
    }

    #[test]
    fn test_token_omitted_for_application_credentials() {
        let request = HttpRequest::new(Method::Get, "https://api.tumblr.com/v2/tagged");
        let signed = OAuth1Signer::new()
            .sign(request, &Credentials::application("key", "secret"))
            .unwrap();
        let header = signed.header("Authorization").unwrap();
        assert!(!header.contains("oauth_token="));
        assert!(header.contains("oauth_consumer_key=\"key\""));
    }

    #[test]
    fn test_missing_consumer_secret_is_rejected() {
        let request = HttpRequest::new(Method::Get, "https://api.tumblr.com/v2/user/info");
        let err = OAuth1Signer::new()
            .sign(request, &Credentials::new("key", "", "token", "secret"))
            .unwrap_err();
        assert!(matches!(err, SigningError::InvalidCredentials(_)));
    }

    #[test]
    fn test_nonce_is_alphanumeric() {
        let nonce = generate_nonce();
        assert_eq!(nonce.len(), NONCE_LEN);
        assert!(nonce.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let debug = format!("{:?}", twitter_credentials());
        assert!(!debug.contains("kAcSOqF21Fu85e7zjz7ZN2U4ZRhfV3WpwPAoE3Z7kBw"));
        assert!(debug.contains("<redacted>"));
    }
}
