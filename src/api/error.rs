//! API error types for the Tumblr client engine.

use thiserror::Error;

use crate::auth::SigningError;

/// Boxed cause of a transport failure.
pub type TransportCause = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error returned by every engine operation.
///
/// Each call fails with exactly one of these, from the first layer that
/// failed:
/// - [`ApiError::Signing`]: the signing capability rejected the request
/// - [`ApiError::Transport`]: the network round-trip failed
/// - [`ApiError::Decode`]: the envelope or a record did not match the schema
/// - [`ApiError::Status`]: a well-formed envelope reported a non-2xx status
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request signing failed
    #[error("Signing error: {0}")]
    Signing(#[from] SigningError),

    /// Connection, TLS, timeout or body read failure
    #[error("Transport error: {0}")]
    Transport(#[source] TransportCause),

    /// Malformed envelope or record
    #[error("Decode error: {0}")]
    Decode(String),

    /// Envelope status outside [200, 300)
    #[error("API error {status}: {message}")]
    Status { status: i64, message: String },

    /// Invalid parameter provided
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Result type alias for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    /// Wrap any error as a transport failure.
    pub fn transport(cause: impl Into<TransportCause>) -> Self {
        Self::Transport(cause.into())
    }

    /// The envelope status, for [`ApiError::Status`] errors.
    pub fn status(&self) -> Option<i64> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The server-supplied message, for [`ApiError::Status`] errors.
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Status { message, .. } => Some(message),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    pub fn is_rate_limited(&self) -> bool {
        self.status() == Some(429)
    }

    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Transport(cause) => cause
                .downcast_ref::<reqwest::Error>()
                .is_some_and(reqwest::Error::is_timeout),
            _ => false,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(Box::new(err))
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}
