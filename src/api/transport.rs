//! Transport layer: sends a signed [`HttpRequest`] and collects the body.
//!
//! The HTTP status line is recorded for logging but never interpreted here;
//! success and failure are decided from the envelope. Any network failure is
//! an [`ApiError::Transport`], never an empty success.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::api::error::ApiResult;
use crate::api::request::HttpRequest;

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Raw response: the HTTP status and the complete body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

/// Sends requests over the network.
///
/// Implementations must either return the complete body or fail; a partially
/// read body is never returned. Timeouts and cancellation belong to the
/// implementation.
#[async_trait]
pub trait Transport: Send + Sync + fmt::Debug {
    async fn send(&self, request: &HttpRequest) -> ApiResult<RawResponse>;
}

/// [`Transport`] backed by a pooled `reqwest` client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Create a transport with the given request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new(timeout: Duration) -> ApiResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(10)
            .build()?;
        Ok(Self { client })
    }

    /// Wrap an already configured `reqwest` client.
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: &HttpRequest) -> ApiResult<RawResponse> {
        let mut builder = self
            .client
            .request(request.method.into(), request.full_url());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        // The response is consumed by `bytes()` and dropped at the end of
        // this scope whether or not the read succeeds.
        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;

        tracing::debug!(
            method = %request.method,
            url = %request.url,
            http_status = status,
            body_len = body.len(),
            "Received response"
        );

        Ok(RawResponse {
            status,
            body: body.to_vec(),
        })
    }
}
