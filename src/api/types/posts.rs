//! Post-list responses for the Tumblr v2 API.

use serde::{Deserialize, Serialize};

use crate::api::post::PostList;
use crate::api::types::BlogInfo;

/// A page of posts.
///
/// Returned by the blog posts, queue, drafts, submissions and dashboard
/// endpoints. Only the blog endpoints include `blog` and `total_posts`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PostsPage {
    /// The blog the posts belong to
    pub blog: Option<BlogInfo>,
    /// Unresolved post records, in server order
    pub posts: PostList,
    /// Total number of posts matching the request
    pub total_posts: Option<i64>,
}

/// Response from GET /v2/user/likes and GET /v2/blog/{blog}/likes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LikesResponse {
    /// Unresolved liked post records
    pub liked_posts: PostList,
    /// Total number of liked posts
    pub liked_count: i64,
}
