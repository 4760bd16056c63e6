//! Blog-related types for the Tumblr v2 API.

use serde::{Deserialize, Serialize};

/// Avatar sizes the API accepts, in pixels.
pub const AVATAR_SIZES: [u32; 9] = [16, 24, 30, 40, 48, 64, 96, 128, 512];

/// Public information about a blog.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlogInfo {
    /// Blog title
    pub title: String,
    /// Number of posts
    pub posts: i64,
    /// Short blog name
    pub name: String,
    /// Blog URL
    pub url: String,
    /// Time of the most recent post (Unix seconds)
    pub updated: i64,
    pub description: String,
    /// Whether the blog accepts questions
    pub ask: bool,
    /// Whether anonymous questions are allowed
    pub ask_anon: bool,
    /// Number of liked posts, when the blog shares its likes
    pub likes: i64,
}

/// Response from GET /v2/blog/{blog}/info.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlogInfoResponse {
    pub blog: BlogInfo,
}

/// Response from GET /v2/blog/{blog}/avatar/{size}.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvatarResponse {
    /// URL of the avatar image
    pub avatar_url: String,
}

/// A user following a blog.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Follower {
    /// User name
    pub name: String,
    /// Whether the authenticated user follows this user back
    pub following: bool,
    /// URL of the user's primary blog
    pub url: String,
    /// Time of the user's most recent post (Unix seconds)
    pub updated: i64,
}

/// Response from GET /v2/blog/{blog}/followers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FollowersResponse {
    /// Total number of followers
    pub total_users: i64,
    /// Followers in this page
    pub users: Vec<Follower>,
}
