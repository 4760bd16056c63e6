//! Posts: the shared base record, the eight variants, and lazy resolution.
//!
//! A post record is decoded in two independent passes over the same JSON
//! text. The first pass ([`RawPost::base`]) reads only [`BasePost`], whose
//! `type` field is the discriminator. The second pass, run only when asked
//! for, decodes the same text again as the variant selected by that
//! discriminator. A record with a `type` this crate does not know still
//! yields its [`BasePost`]; only variant decoding of it fails.

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

use crate::api::error::{ApiError, ApiResult};
use crate::api::types::Note;
use crate::shared::serde_util;

// ============================================================================
// Discriminator
// ============================================================================

/// The closed set of post variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostKind {
    Text,
    Photo,
    Quote,
    Link,
    Chat,
    Audio,
    Video,
    Answer,
}

impl PostKind {
    pub const ALL: [PostKind; 8] = [
        Self::Text,
        Self::Photo,
        Self::Quote,
        Self::Link,
        Self::Chat,
        Self::Audio,
        Self::Video,
        Self::Answer,
    ];

    /// The value of the `type` field for this variant.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Photo => "photo",
            Self::Quote => "quote",
            Self::Link => "link",
            Self::Chat => "chat",
            Self::Audio => "audio",
            Self::Video => "video",
            Self::Answer => "answer",
        }
    }
}

impl fmt::Display for PostKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PostKind {
    type Err = ApiError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == tag)
            .ok_or_else(|| ApiError::Decode(format!("Unsupported post type '{}'", tag)))
    }
}

/// Post identifier. The API sends ids as JSON numbers or strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct PostId(String);

impl PostId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for PostId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_util::number_or_string(deserializer).map(Self)
    }
}

// ============================================================================
// BasePost
// ============================================================================

/// Reblog comment attached to a post.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReblogComment {
    #[serde(deserialize_with = "serde_util::null_default")]
    pub comment: String,
    #[serde(deserialize_with = "serde_util::null_default")]
    pub tree_html: String,
}

/// Where a reblogged post came from, and the post at the root of the chain.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReblogLineage {
    pub reblogged_from_id: Option<PostId>,
    pub reblogged_from_url: Option<String>,
    pub reblogged_from_name: Option<String>,
    pub reblogged_from_title: Option<String>,
    pub reblogged_from_uuid: Option<String>,
    #[serde(deserialize_with = "serde_util::null_default")]
    pub reblogged_from_can_message: bool,
    pub reblogged_root_id: Option<PostId>,
    pub reblogged_root_url: Option<String>,
    pub reblogged_root_name: Option<String>,
    pub reblogged_root_title: Option<String>,
    pub reblogged_root_uuid: Option<String>,
    #[serde(deserialize_with = "serde_util::null_default")]
    pub reblogged_root_can_message: bool,
}

impl ReblogLineage {
    /// Whether the post is a reblog of another post.
    pub fn is_reblog(&self) -> bool {
        self.reblogged_from_id.is_some() || self.reblogged_from_name.is_some()
    }
}

/// Fields shared by every post variant.
///
/// Only `type` is required; every other field falls back to its default
/// when absent or `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BasePost {
    pub id: PostId,
    #[serde(deserialize_with = "serde_util::null_default")]
    pub blog_name: String,
    #[serde(deserialize_with = "serde_util::null_default")]
    pub post_url: String,
    /// Discriminator, kept verbatim so unknown types survive.
    #[serde(rename = "type", deserialize_with = "serde_util::null_default")]
    pub kind: String,
    /// Publication time (Unix seconds)
    #[serde(deserialize_with = "serde_util::null_default")]
    pub timestamp: i64,
    /// Publication time as a GMT date string
    #[serde(deserialize_with = "serde_util::null_default")]
    pub date: String,
    #[serde(deserialize_with = "serde_util::null_default")]
    pub format: String,
    #[serde(deserialize_with = "serde_util::null_default")]
    pub reblog_key: String,
    #[serde(deserialize_with = "serde_util::null_default")]
    pub tags: Vec<String>,
    #[serde(deserialize_with = "serde_util::null_default")]
    pub bookmarklet: bool,
    #[serde(deserialize_with = "serde_util::null_default")]
    pub mobile: bool,
    pub source_url: Option<String>,
    pub source_title: Option<String>,
    #[serde(deserialize_with = "serde_util::null_default")]
    pub liked: bool,
    /// published, queued, draft or private
    #[serde(deserialize_with = "serde_util::null_default")]
    pub state: String,
    /// Post count of the owning blog, sent on some single-post responses
    #[serde(deserialize_with = "serde_util::null_default")]
    pub total_posts: i64,
    #[serde(deserialize_with = "serde_util::null_default")]
    pub note_count: i64,
    #[serde(deserialize_with = "serde_util::null_default")]
    pub notes: Vec<Note>,
    #[serde(deserialize_with = "serde_util::null_default")]
    pub reblog: ReblogComment,
    #[serde(flatten)]
    pub lineage: ReblogLineage,
}

impl BasePost {
    /// The variant named by the discriminator, if this crate knows it.
    pub fn post_kind(&self) -> Option<PostKind> {
        self.kind.parse().ok()
    }

    /// Publication time as a UTC datetime.
    pub fn published_at(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        chrono::DateTime::from_timestamp(self.timestamp, 0)
    }
}

// ============================================================================
// Variants
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextPost {
    #[serde(flatten)]
    pub base: BasePost,
    pub title: Option<String>,
    #[serde(deserialize_with = "serde_util::null_default")]
    pub body: String,
}

/// One rendition of a photo.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhotoSize {
    #[serde(deserialize_with = "serde_util::null_default")]
    pub width: i64,
    #[serde(deserialize_with = "serde_util::null_default")]
    pub height: i64,
    #[serde(deserialize_with = "serde_util::null_default")]
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Photo {
    #[serde(deserialize_with = "serde_util::null_default")]
    pub caption: String,
    /// Renditions, largest first as sent by the API
    #[serde(deserialize_with = "serde_util::null_default")]
    pub alt_sizes: Vec<PhotoSize>,
    pub original_size: Option<PhotoSize>,
}

impl Photo {
    /// The original rendition, or the widest alternative.
    pub fn largest(&self) -> Option<&PhotoSize> {
        self.original_size
            .as_ref()
            .or_else(|| self.alt_sizes.iter().max_by_key(|size| size.width))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhotoPost {
    #[serde(flatten)]
    pub base: BasePost,
    #[serde(deserialize_with = "serde_util::null_default")]
    pub photos: Vec<Photo>,
    #[serde(deserialize_with = "serde_util::null_default")]
    pub caption: String,
    #[serde(deserialize_with = "serde_util::null_default")]
    pub width: i64,
    #[serde(deserialize_with = "serde_util::null_default")]
    pub height: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuotePost {
    #[serde(flatten)]
    pub base: BasePost,
    #[serde(deserialize_with = "serde_util::null_default")]
    pub text: String,
    #[serde(deserialize_with = "serde_util::null_default")]
    pub source: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkPost {
    #[serde(flatten)]
    pub base: BasePost,
    pub title: Option<String>,
    #[serde(deserialize_with = "serde_util::null_default")]
    pub url: String,
    #[serde(deserialize_with = "serde_util::null_default")]
    pub description: String,
}

/// One line of a chat post.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DialogueLine {
    #[serde(deserialize_with = "serde_util::null_default")]
    pub name: String,
    #[serde(deserialize_with = "serde_util::null_default")]
    pub label: String,
    #[serde(deserialize_with = "serde_util::null_default")]
    pub phrase: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatPost {
    #[serde(flatten)]
    pub base: BasePost,
    pub title: Option<String>,
    #[serde(deserialize_with = "serde_util::null_default")]
    pub body: String,
    #[serde(deserialize_with = "serde_util::null_default")]
    pub dialogue: Vec<DialogueLine>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioPost {
    #[serde(flatten)]
    pub base: BasePost,
    #[serde(deserialize_with = "serde_util::null_default")]
    pub caption: String,
    /// HTML for the embedded player
    #[serde(deserialize_with = "serde_util::null_default")]
    pub player: String,
    #[serde(deserialize_with = "serde_util::null_default")]
    pub plays: i64,
    pub album_art: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub track_name: Option<String>,
    pub track_number: Option<i64>,
    pub year: Option<i64>,
}

/// One embeddable player for a video post.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoPlayer {
    #[serde(deserialize_with = "serde_util::null_default")]
    pub width: i64,
    #[serde(deserialize_with = "serde_util::null_default")]
    pub embed_code: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoPost {
    #[serde(flatten)]
    pub base: BasePost,
    #[serde(deserialize_with = "serde_util::null_default")]
    pub caption: String,
    #[serde(deserialize_with = "serde_util::null_default")]
    pub player: Vec<VideoPlayer>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnswerPost {
    #[serde(flatten)]
    pub base: BasePost,
    #[serde(deserialize_with = "serde_util::null_default")]
    pub asking_name: String,
    pub asking_url: Option<String>,
    #[serde(deserialize_with = "serde_util::null_default")]
    pub question: String,
    #[serde(deserialize_with = "serde_util::null_default")]
    pub answer: String,
}

/// A fully resolved post.
#[derive(Debug, Clone, PartialEq)]
pub enum Post {
    Text(TextPost),
    Photo(PhotoPost),
    Quote(QuotePost),
    Link(LinkPost),
    Chat(ChatPost),
    Audio(AudioPost),
    Video(VideoPost),
    Answer(AnswerPost),
}

impl Post {
    pub fn base(&self) -> &BasePost {
        match self {
            Self::Text(p) => &p.base,
            Self::Photo(p) => &p.base,
            Self::Quote(p) => &p.base,
            Self::Link(p) => &p.base,
            Self::Chat(p) => &p.base,
            Self::Audio(p) => &p.base,
            Self::Video(p) => &p.base,
            Self::Answer(p) => &p.base,
        }
    }

    pub fn kind(&self) -> PostKind {
        match self {
            Self::Text(_) => PostKind::Text,
            Self::Photo(_) => PostKind::Photo,
            Self::Quote(_) => PostKind::Quote,
            Self::Link(_) => PostKind::Link,
            Self::Chat(_) => PostKind::Chat,
            Self::Audio(_) => PostKind::Audio,
            Self::Video(_) => PostKind::Video,
            Self::Answer(_) => PostKind::Answer,
        }
    }

    pub fn id(&self) -> &PostId {
        &self.base().id
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// A post record kept as the server's JSON text.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawPost(Box<RawValue>);

impl RawPost {
    /// Wrap a JSON document, validating that it is well formed.
    pub fn from_json(json: impl Into<String>) -> ApiResult<Self> {
        Ok(Self(RawValue::from_string(json.into())?))
    }

    pub fn as_json(&self) -> &str {
        self.0.get()
    }

    /// Decode the shared base fields.
    ///
    /// Succeeds for any post type, known or not. Fails only if the record is
    /// not an object, a field has the wrong shape, or `type` is missing.
    pub fn base(&self) -> ApiResult<BasePost> {
        let base: BasePost = self.decode()?;
        if base.kind.is_empty() {
            return Err(ApiError::Decode(format!(
                "Post {} has no 'type' discriminator",
                base.id
            )));
        }
        Ok(base)
    }

    /// The variant named by the discriminator; `None` for unknown types.
    pub fn kind(&self) -> ApiResult<Option<PostKind>> {
        Ok(self.base()?.post_kind())
    }

    /// Decode the variant selected by the record's own discriminator.
    pub fn resolve(&self) -> ApiResult<Post> {
        let base = self.base()?;
        let kind: PostKind = base.kind.parse()?;
        self.decode_variant(kind)
    }

    /// Decode as the given variant.
    ///
    /// Fails with [`ApiError::Decode`] if the record's discriminator names a
    /// different variant.
    pub fn resolve_as(&self, kind: PostKind) -> ApiResult<Post> {
        let base = self.base()?;
        if base.kind != kind.as_str() {
            return Err(ApiError::Decode(format!(
                "Post {} has type '{}', cannot decode as '{}'",
                base.id, base.kind, kind
            )));
        }
        self.decode_variant(kind)
    }

    /// [`RawPost::resolve_as`] with the variant given by its tag.
    pub fn resolve_tag(&self, tag: &str) -> ApiResult<Post> {
        self.resolve_as(tag.parse()?)
    }

    /// Decode into any deserializable type.
    pub fn decode<T: DeserializeOwned>(&self) -> ApiResult<T> {
        serde_json::from_str(self.0.get())
            .map_err(|e| ApiError::Decode(format!("Malformed post record: {}", e)))
    }

    fn decode_variant(&self, kind: PostKind) -> ApiResult<Post> {
        Ok(match kind {
            PostKind::Text => Post::Text(self.decode()?),
            PostKind::Photo => Post::Photo(self.decode()?),
            PostKind::Quote => Post::Quote(self.decode()?),
            PostKind::Link => Post::Link(self.decode()?),
            PostKind::Chat => Post::Chat(self.decode()?),
            PostKind::Audio => Post::Audio(self.decode()?),
            PostKind::Video => Post::Video(self.decode()?),
            PostKind::Answer => Post::Answer(self.decode()?),
        })
    }
}

impl PartialEq for RawPost {
    fn eq(&self, other: &Self) -> bool {
        self.0.get() == other.0.get()
    }
}

/// An ordered list of post records, each resolved independently.
///
/// Iterators are lazy and can be restarted; a record that fails to resolve
/// yields an `Err` item without affecting the others.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostList(Vec<RawPost>);

impl PostList {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&RawPost> {
        self.0.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RawPost> {
        self.0.iter()
    }

    /// Base records, decoded one at a time.
    pub fn bases(&self) -> impl Iterator<Item = ApiResult<BasePost>> + '_ {
        self.0.iter().map(RawPost::base)
    }

    /// Fully resolved posts, decoded one at a time.
    pub fn resolved(&self) -> impl Iterator<Item = ApiResult<Post>> + '_ {
        self.0.iter().map(RawPost::resolve)
    }

    pub fn into_vec(self) -> Vec<RawPost> {
        self.0
    }
}

impl From<Vec<RawPost>> for PostList {
    fn from(posts: Vec<RawPost>) -> Self {
        Self(posts)
    }
}

impl IntoIterator for PostList {
    type Item = RawPost;
    type IntoIter = std::vec::IntoIter<RawPost>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a PostList {
    type Item = &'a RawPost;
    type IntoIter = std::slice::Iter<'a, RawPost>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
