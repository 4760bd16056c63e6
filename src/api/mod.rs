//! REST API client module for the Tumblr v2 API.
//!
//! This module provides the call engine (request building, transport,
//! envelope decoding, status classification) and a typed client for the
//! user, blog, tagged and posting endpoints.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use tumblr_client::api::{RequestOptions, TumblrClient};
//! use tumblr_client::auth::Credentials;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = TumblrClient::new(Credentials::new("ck", "cs", "token", "secret"))?;
//!
//!     // Account information
//!     let user = client.user_info().await?;
//!     println!("{} follows {} blogs", user.name, user.following);
//!
//!     // Posts are resolved lazily, one record at a time
//!     let page = client.dashboard(&RequestOptions::new().with("limit", "10")).await?;
//!     for post in page.posts.resolved() {
//!         match post {
//!             Ok(post) => println!("{} {}", post.kind(), post.id()),
//!             Err(e) => println!("Skipping record: {}", e),
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Client Configuration
//!
//! ```rust,ignore
//! use std::time::Duration;
//!
//! let client = TumblrClient::builder(credentials)
//!     .host("https://api.tumblr.com")
//!     .timeout(Duration::from_secs(60))
//!     .header("User-Agent", "my-app/1.0")
//!     .build()?;
//! ```
//!
//! # Error Handling
//!
//! All methods return `ApiResult<T>`, an alias for `Result<T, ApiError>`:
//!
//! ```rust,ignore
//! match client.blog_info("missing-blog").await {
//!     Ok(blog) => println!("Found {}", blog.title),
//!     Err(ApiError::Status { status: 404, message }) => println!("Not found: {}", message),
//!     Err(ApiError::Transport(e)) => println!("Network failure: {}", e),
//!     Err(e) => println!("Other error: {}", e),
//! }
//! ```
//!
//! # Endpoints Without a Typed Wrapper
//!
//! [`TumblrClient::get`] and [`TumblrClient::post`] return the raw
//! [`Payload`] for any path:
//!
//! ```rust,ignore
//! let payload = client.get("/v2/blog/staff/posts/text", &RequestOptions::new()).await?;
//! let posts = payload.decode::<PostsPage>()?;
//! ```

pub mod client;
pub mod envelope;
pub mod error;
pub mod post;
pub mod request;
pub mod transport;
pub mod types;

// Re-export main types for convenience
pub use client::{TumblrClient, TumblrClientBuilder};
pub use envelope::{classify, Envelope, Payload, SUCCESS_STATUS};
pub use error::{ApiError, ApiResult};
pub use post::{
    AnswerPost, AudioPost, BasePost, ChatPost, DialogueLine, LinkPost, Photo, PhotoPost, PhotoSize,
    Post, PostId, PostKind, PostList, QuotePost, RawPost, ReblogComment, ReblogLineage, TextPost,
    VideoPlayer, VideoPost,
};
pub use request::{HttpRequest, Method, RequestBuilder, RequestOptions};
pub use transport::{RawResponse, ReqwestTransport, Transport};
pub use types::*;
