use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Friendship edge status. Stored as a directed (requester, addressee) pair;
/// only `accepted` edges participate in feed ranking, and they are read
/// symmetrically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FriendshipStatus {
    Pending,
    Accepted,
    Rejected,
}

impl FriendshipStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FriendshipStatus::Pending => "pending",
            FriendshipStatus::Accepted => "accepted",
            FriendshipStatus::Rejected => "rejected",
        }
    }
}

/// Kind of a media attachment on a post
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    /// Map the stored text column to a kind. Anything that is not `video`
    /// is treated as an image, matching how uploads are classified.
    pub fn from_db(value: &str) -> Self {
        if value == "video" {
            MediaKind::Video
        } else {
            MediaKind::Image
        }
    }
}

/// A single media attachment as exposed to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaItem {
    pub url: String,
    #[serde(rename = "type")]
    pub kind: MediaKind,
}

/// An interest tag reference (id + display name)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct TagRef {
    pub id: Uuid,
    pub name: String,
}

/// A feed candidate: a post joined with everything the ranked projection
/// needs (author display fields, media, tags, counts). Produced by the post
/// store, consumed by the ranking engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidatePost {
    pub id: Uuid,
    pub author_id: Uuid,
    pub username: String,
    pub avatar_url: Option<String>,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub media: Vec<MediaItem>,
    pub tags: Vec<TagRef>,
    pub like_count: i64,
    pub comment_count: i64,
}

/// Client-facing projection of a post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostView {
    pub post_id: Uuid,
    pub user_id: Uuid,
    pub username: String,
    pub user_avatar: Option<String>,
    pub created_at: DateTime<Utc>,
    pub content: String,
    pub media: Vec<MediaItem>,
    pub like_count: i64,
    pub comment_count: i64,
    pub tags: Vec<TagRef>,
}

impl From<CandidatePost> for PostView {
    fn from(post: CandidatePost) -> Self {
        PostView {
            post_id: post.id,
            user_id: post.author_id,
            username: post.username,
            user_avatar: post.avatar_url,
            created_at: post.created_at,
            content: post.content,
            media: post.media,
            like_count: post.like_count,
            comment_count: post.comment_count,
            tags: post.tags,
        }
    }
}

/// A post with its derived priority tier. Computed per request, never
/// persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedPost {
    pub priority: u8,
    #[serde(flatten)]
    pub post: PostView,
}

/// One page of the ranked main feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedPage {
    pub posts: Vec<RankedPost>,
    pub next_cursor: Option<Uuid>,
}
