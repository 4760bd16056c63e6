//! Note types for the Tumblr v2 API.

use serde::{Deserialize, Serialize};

use crate::api::post::PostId;
use crate::shared::serde_util;

/// A single note (like, reblog or reply) on a post.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Note {
    /// "like", "reblog", "reply" or "posted"
    #[serde(rename = "type", deserialize_with = "serde_util::null_default")]
    pub note_type: String,
    /// Time of the note (Unix seconds)
    #[serde(deserialize_with = "serde_util::null_default")]
    pub timestamp: i64,
    #[serde(deserialize_with = "serde_util::null_default")]
    pub blog_name: String,
    #[serde(deserialize_with = "serde_util::null_default")]
    pub blog_uuid: String,
    #[serde(deserialize_with = "serde_util::null_default")]
    pub blog_url: String,
    /// Whether the authenticated user follows the noting blog
    #[serde(deserialize_with = "serde_util::null_default")]
    pub followed: bool,
    /// "circle" or "square"
    #[serde(deserialize_with = "serde_util::null_default")]
    pub avatar_shape: String,
    /// Reply text, for reply notes
    pub reply_text: Option<String>,
    /// Id of the reblog, for reblog notes
    pub post_id: Option<PostId>,
    /// Blog reblogged from, for reblog notes
    pub reblog_parent_blog_name: Option<String>,
}

/// Response from GET /v2/blog/{blog}/notes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NotesResponse {
    pub notes: Vec<Note>,
    /// Total number of notes on the post
    pub total_notes: Option<i64>,
}
