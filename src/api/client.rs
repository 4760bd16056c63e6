//! Tumblr v2 API client implementation.
//!
//! The [`TumblrClient`] runs every call through the same pipeline: build and
//! sign the request, send it, decode the envelope, classify its status. The
//! endpoint methods only pick a path and a verb and decode the payload.
//!
//! # Example
//!
//! ```rust,ignore
//! use tumblr_client::api::{RequestOptions, TumblrClient};
//! use tumblr_client::auth::Credentials;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let credentials = Credentials::new("consumer_key", "consumer_secret", "token", "token_secret");
//!     let client = TumblrClient::new(credentials)?;
//!
//!     let page = client
//!         .posts("staff.tumblr.com", None, &RequestOptions::new().with("limit", "5"))
//!         .await?;
//!     for post in page.posts.resolved() {
//!         println!("{:?}", post?.kind());
//!     }
//!
//!     Ok(())
//! }
//! ```

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::api::envelope::{Envelope, Payload};
use crate::api::error::{ApiError, ApiResult};
use crate::api::post::{PostKind, PostList};
use crate::api::request::{Method, RequestBuilder, RequestOptions};
use crate::api::transport::{ReqwestTransport, Transport, DEFAULT_TIMEOUT_SECS};
use crate::api::types::*;
use crate::auth::{Credentials, OAuth1Signer, RequestSigner};
use crate::network::DEFAULT_API_URL;

/// Builder for configuring [`TumblrClient`].
#[derive(Debug, Clone)]
pub struct TumblrClientBuilder {
    host: String,
    credentials: Credentials,
    timeout: Duration,
    default_headers: Vec<(String, String)>,
    transport: Option<Arc<dyn Transport>>,
    signer: Option<Arc<dyn RequestSigner>>,
}

impl TumblrClientBuilder {
    /// Create a new builder for the given credentials.
    pub fn new(credentials: Credentials) -> Self {
        Self {
            host: DEFAULT_API_URL.to_string(),
            credentials,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            default_headers: Vec::new(),
            transport: None,
            signer: None,
        }
    }

    /// Set the API host (scheme and authority, e.g. `https://api.tumblr.com`).
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the timeout in seconds.
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }

    /// Add a default header to all requests.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.push((name.into(), value.into()));
        self
    }

    /// Use a custom transport. The timeout setting is then ignored.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Use a custom request signer instead of OAuth 1.0a.
    pub fn signer(mut self, signer: Arc<dyn RequestSigner>) -> Self {
        self.signer = Some(signer);
        self
    }

    /// Build the client.
    pub fn build(self) -> ApiResult<TumblrClient> {
        for (name, value) in &self.default_headers {
            reqwest::header::HeaderName::try_from(name.as_str())
                .map_err(|e| ApiError::InvalidParameter(format!("Invalid header name '{}': {}", name, e)))?;
            reqwest::header::HeaderValue::from_str(value)
                .map_err(|e| ApiError::InvalidParameter(format!("Invalid header value for '{}': {}", name, e)))?;
        }

        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::new(self.timeout)?),
        };
        let signer = self
            .signer
            .unwrap_or_else(|| Arc::new(OAuth1Signer::new()));

        let requests = RequestBuilder::new(self.host, Arc::new(self.credentials), signer)
            .with_default_headers(self.default_headers);

        Ok(TumblrClient {
            requests,
            transport,
        })
    }
}

/// Tumblr v2 API client.
///
/// Cheap to clone; clones share the transport and credentials. Calls carry no
/// shared mutable state and may run concurrently.
#[derive(Debug, Clone)]
pub struct TumblrClient {
    requests: RequestBuilder,
    transport: Arc<dyn Transport>,
}

impl TumblrClient {
    /// Create a client for `api.tumblr.com` with default settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new(credentials: Credentials) -> ApiResult<Self> {
        TumblrClientBuilder::new(credentials).build()
    }

    /// Create a new client builder for custom configuration.
    pub fn builder(credentials: Credentials) -> TumblrClientBuilder {
        TumblrClientBuilder::new(credentials)
    }

    /// Get the API host.
    pub fn host(&self) -> &str {
        self.requests.host()
    }

    // =========================================================================
    // Engine
    // =========================================================================

    /// Perform one call and return the classified payload.
    ///
    /// Fails with the error of the first stage that fails: signing,
    /// transport, envelope decoding, then status classification.
    pub async fn call(
        &self,
        method: Method,
        path: &str,
        options: &RequestOptions,
    ) -> ApiResult<Payload> {
        let request = self.requests.build(method, path, options)?;
        tracing::debug!(method = %method, path, params = options.len(), "Sending request");

        let response = self.transport.send(&request).await?;
        Envelope::decode(&response.body)?.classify()
    }

    /// GET an arbitrary API path.
    pub async fn get(&self, path: &str, options: &RequestOptions) -> ApiResult<Payload> {
        self.call(Method::Get, path, options).await
    }

    /// POST an arbitrary API path with form-encoded options.
    pub async fn post(&self, path: &str, options: &RequestOptions) -> ApiResult<Payload> {
        self.call(Method::Post, path, options).await
    }

    async fn get_as<T: DeserializeOwned>(&self, path: &str, options: &RequestOptions) -> ApiResult<T> {
        self.get(path, options).await?.decode()
    }

    async fn post_unit(&self, path: &str, options: &RequestOptions) -> ApiResult<()> {
        self.post(path, options).await.map(|_| ())
    }

    // =========================================================================
    // User endpoints
    // =========================================================================

    /// Get the authenticated user's account information.
    pub async fn user_info(&self) -> ApiResult<UserInfo> {
        let response: UserInfoResponse = self.get_as("/v2/user/info", &RequestOptions::new()).await?;
        Ok(response.user)
    }

    /// Get the posts the user has liked.
    ///
    /// Options: `limit`, `offset`, `before`, `after`.
    pub async fn likes(&self, options: &RequestOptions) -> ApiResult<LikesResponse> {
        self.get_as("/v2/user/likes", options).await
    }

    /// Get the blogs the user follows.
    ///
    /// Options: `limit`, `offset`.
    pub async fn following(&self, options: &RequestOptions) -> ApiResult<FollowingResponse> {
        self.get_as("/v2/user/following", options).await
    }

    /// Get the user's dashboard.
    ///
    /// Options: `limit`, `offset`, `type`, `since_id`, `reblog_info`,
    /// `notes_info`.
    pub async fn dashboard(&self, options: &RequestOptions) -> ApiResult<PostsPage> {
        self.get_as("/v2/user/dashboard", options).await
    }

    /// Follow a blog by URL.
    pub async fn follow(&self, blog_url: &str) -> ApiResult<()> {
        let options = RequestOptions::new().with("url", blog_url);
        self.post_unit("/v2/user/follow", &options).await
    }

    /// Stop following a blog by URL.
    pub async fn unfollow(&self, blog_url: &str) -> ApiResult<()> {
        let options = RequestOptions::new().with("url", blog_url);
        self.post_unit("/v2/user/unfollow", &options).await
    }

    /// Like a post.
    pub async fn like(&self, id: &str, reblog_key: &str) -> ApiResult<()> {
        let options = RequestOptions::new()
            .with("id", id)
            .with("reblog_key", reblog_key);
        self.post_unit("/v2/user/like", &options).await
    }

    /// Unlike a post.
    pub async fn unlike(&self, id: &str, reblog_key: &str) -> ApiResult<()> {
        let options = RequestOptions::new()
            .with("id", id)
            .with("reblog_key", reblog_key);
        self.post_unit("/v2/user/unlike", &options).await
    }

    // =========================================================================
    // Blog endpoints
    // =========================================================================

    /// Get general information about a blog.
    pub async fn blog_info(&self, blog: &str) -> ApiResult<BlogInfo> {
        let path = blog_path(blog, "info")?;
        let response: BlogInfoResponse = self.get_as(&path, &RequestOptions::new()).await?;
        Ok(response.blog)
    }

    /// Get the URL of a blog's avatar.
    ///
    /// `size` must be one of [`AVATAR_SIZES`].
    pub async fn avatar(&self, blog: &str, size: u32) -> ApiResult<AvatarResponse> {
        if !AVATAR_SIZES.contains(&size) {
            return Err(ApiError::InvalidParameter(format!(
                "Avatar size must be one of {:?}, got {}",
                AVATAR_SIZES, size
            )));
        }
        let path = blog_path(blog, &format!("avatar/{}", size))?;
        self.get_as(&path, &RequestOptions::new()).await
    }

    /// Get the users following a blog.
    ///
    /// Options: `limit`, `offset`.
    pub async fn followers(&self, blog: &str, options: &RequestOptions) -> ApiResult<FollowersResponse> {
        self.get_as(&blog_path(blog, "followers")?, options).await
    }

    /// Get the posts a blog has liked.
    ///
    /// Options: `limit`, `offset`, `before`, `after`.
    pub async fn blog_likes(&self, blog: &str, options: &RequestOptions) -> ApiResult<LikesResponse> {
        self.get_as(&blog_path(blog, "likes")?, options).await
    }

    /// Get a blog's published posts, optionally of a single type.
    ///
    /// Options: `id`, `tag`, `limit`, `offset`, `reblog_info`, `notes_info`,
    /// `filter`.
    pub async fn posts(
        &self,
        blog: &str,
        kind: Option<PostKind>,
        options: &RequestOptions,
    ) -> ApiResult<PostsPage> {
        let suffix = match kind {
            Some(kind) => format!("posts/{}", kind),
            None => "posts".to_string(),
        };
        self.get_as(&blog_path(blog, &suffix)?, options).await
    }

    /// Get the posts in a blog's queue.
    pub async fn queue(&self, blog: &str, options: &RequestOptions) -> ApiResult<PostsPage> {
        self.get_as(&blog_path(blog, "posts/queue")?, options).await
    }

    /// Get a blog's drafts.
    pub async fn drafts(&self, blog: &str, options: &RequestOptions) -> ApiResult<PostsPage> {
        self.get_as(&blog_path(blog, "posts/draft")?, options).await
    }

    /// Get a blog's submissions.
    pub async fn submissions(&self, blog: &str, options: &RequestOptions) -> ApiResult<PostsPage> {
        self.get_as(&blog_path(blog, "posts/submission")?, options).await
    }

    /// Get the notes on a post.
    ///
    /// Options: `mode` (`all`, `likes`, `conversation`, `rollup`,
    /// `reblogs_with_tags`), `before_timestamp`.
    pub async fn notes(&self, blog: &str, id: &str, options: &RequestOptions) -> ApiResult<NotesResponse> {
        let mut options = options.clone();
        options.set("id", id);
        self.get_as(&blog_path(blog, "notes")?, &options).await
    }

    // =========================================================================
    // Tagged
    // =========================================================================

    /// Get posts with a tag.
    ///
    /// Options: `before`, `limit`, `filter`.
    pub async fn tagged(&self, tag: &str, options: &RequestOptions) -> ApiResult<PostList> {
        let mut options = options.clone();
        options.set("tag", tag);
        self.get_as("/v2/tagged", &options).await
    }

    // =========================================================================
    // Posting
    // =========================================================================

    /// Create a post of the given type.
    ///
    /// `options` holds the common (`state`, `tags`, `tweet`, `date`,
    /// `format`, `slug`) and type-specific (`title`, `body`, `source`, ...)
    /// parameters; `type` is set from `kind`. Answer posts are only created
    /// by answering a question, so [`PostKind::Answer`] is rejected.
    pub async fn create_post(&self, blog: &str, kind: PostKind, options: &RequestOptions) -> ApiResult<()> {
        if kind == PostKind::Answer {
            return Err(ApiError::InvalidParameter(
                "Answer posts cannot be created directly".to_string(),
            ));
        }
        let mut options = options.clone();
        options.set("type", kind.as_str());
        self.post_unit(&blog_path(blog, "post")?, &options).await
    }

    /// Reblog a post onto `blog`.
    ///
    /// Options: `comment`, plus the common posting parameters.
    pub async fn reblog(
        &self,
        blog: &str,
        id: &str,
        reblog_key: &str,
        options: &RequestOptions,
    ) -> ApiResult<()> {
        let mut options = options.clone();
        options.set("id", id);
        options.set("reblog_key", reblog_key);
        self.post_unit(&blog_path(blog, "post/reblog")?, &options).await
    }

    /// Edit an existing post.
    pub async fn edit_post(&self, blog: &str, id: &str, options: &RequestOptions) -> ApiResult<()> {
        let mut options = options.clone();
        options.set("id", id);
        self.post_unit(&blog_path(blog, "post/edit")?, &options).await
    }

    /// Delete a post.
    pub async fn delete_post(&self, blog: &str, id: &str) -> ApiResult<()> {
        let options = RequestOptions::new().with("id", id);
        self.post_unit(&blog_path(blog, "post/delete")?, &options).await
    }
}

/// Path under `/v2/blog/{blog}/` with the blog identifier percent-encoded.
fn blog_path(blog: &str, suffix: &str) -> ApiResult<String> {
    if blog.is_empty() {
        return Err(ApiError::InvalidParameter("Blog identifier cannot be empty".to_string()));
    }
    Ok(format!("/v2/blog/{}/{}", urlencoding::encode(blog), suffix))
}
