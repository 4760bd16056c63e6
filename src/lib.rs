//! # Tumblr Client
//!
//! A Rust client for the Tumblr v2 REST API.
//!
//! ## Modules
//!
//! - [`api`]: the call engine, post resolution and the typed client
//! - [`auth`]: credentials and OAuth 1.0a request signing
//! - [`network`]: API and OAuth endpoint URLs
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tumblr_client::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let credentials = Credentials::new("consumer_key", "consumer_secret", "token", "token_secret");
//!     let client = TumblrClient::new(credentials)?;
//!
//!     let page = client.posts("staff", Some(PostKind::Photo), &RequestOptions::new()).await?;
//!     for post in page.posts.resolved() {
//!         if let Post::Photo(photo) = post? {
//!             println!("{} photos", photo.photos.len());
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```

// ============================================================================
// MODULES
// ============================================================================

/// REST API engine and client.
pub mod api;

/// Credentials and request signing.
pub mod auth;

/// Network URL constants (API and OAuth endpoints).
pub mod network;

/// Shared serde helpers.
pub mod shared;

// ============================================================================
// PRELUDE
// ============================================================================

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use tumblr_client::prelude::*;
/// ```
pub mod prelude {
    // API module exports
    pub use crate::api::{
        TumblrClient, TumblrClientBuilder, ApiError, ApiResult,
        // Engine
        Envelope, Payload, RequestOptions, Method, Transport, ReqwestTransport,
        // Posts
        Post, PostKind, PostId, PostList, RawPost, BasePost,
        // Common types
        UserInfo, BlogInfo, PostsPage, LikesResponse, NotesResponse, Note,
        FollowersResponse, FollowingResponse, AvatarResponse,
    };

    // Auth module exports
    pub use crate::auth::{Credentials, OAuth1Signer, RequestSigner, SigningError};

    // Network constants
    pub use crate::network::DEFAULT_API_URL;
}
