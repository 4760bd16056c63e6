//! User-related types for the Tumblr v2 API.

use serde::{Deserialize, Serialize};

use crate::api::types::BlogInfo;

/// A blog owned by the authenticated user.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OwnedBlog {
    /// Short blog name
    pub name: String,
    /// Blog URL
    pub url: String,
    /// Blog title
    pub title: String,
    pub description: String,
    /// Whether this is the user's primary blog
    pub primary: bool,
    /// Follower count
    pub followers: i64,
    /// Auto-tweet setting: "Y", "N" or "auto"
    pub tweet: String,
    /// Facebook cross-post setting
    pub facebook: String,
    /// "public" or "private"
    #[serde(rename = "type")]
    pub blog_type: String,
}

/// The authenticated user.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UserInfo {
    /// Number of blogs the user follows
    pub following: i64,
    /// Default post format: html, markdown or raw
    pub default_post_format: String,
    /// User name
    pub name: String,
    /// Number of liked posts
    pub likes: i64,
    /// Blogs owned by the user, primary blog included
    pub blogs: Vec<OwnedBlog>,
}

impl UserInfo {
    /// The user's primary blog.
    pub fn primary_blog(&self) -> Option<&OwnedBlog> {
        self.blogs.iter().find(|blog| blog.primary)
    }
}

/// Response from GET /v2/user/info.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfoResponse {
    pub user: UserInfo,
}

/// Response from GET /v2/user/following.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FollowingResponse {
    /// Total number of followed blogs
    pub total_blogs: i64,
    /// Followed blogs in this page
    pub blogs: Vec<BlogInfo>,
}
