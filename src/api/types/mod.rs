//! Response types for the Tumblr v2 API.
//!
//! Each type mirrors the `response` member of one endpoint. Posts inside
//! these responses stay as [`PostList`](crate::api::post::PostList) until the
//! caller resolves them.

pub mod blog;
pub mod notes;
pub mod posts;
pub mod user;

// Re-export all types for convenience
pub use blog::*;
pub use notes::*;
pub use posts::*;
pub use user::*;
