use crate::error::{AppError, Result};
use crate::models::{CandidatePost, MediaItem, MediaKind, TagRef};
use crate::services::ranking::priority_tier;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

/// Row shape shared by the candidate window and the per-user post listing
#[derive(Debug, sqlx::FromRow)]
struct PostRow {
    id: Uuid,
    author_id: Uuid,
    username: String,
    avatar_url: Option<String>,
    content: String,
    created_at: DateTime<Utc>,
    like_count: i64,
    comment_count: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct MediaRow {
    post_id: Uuid,
    url: String,
    media_type: String,
}

#[derive(Debug, sqlx::FromRow)]
struct PostTagRow {
    post_id: Uuid,
    tag_id: Uuid,
    name: String,
}

#[derive(Debug, sqlx::FromRow)]
struct CursorAnchor {
    author_id: Uuid,
    created_at: DateTime<Utc>,
    has_shared_tag: bool,
}

/// Repository for post reads: the feed candidate window and per-user
/// listings, both hydrated with media, tags and engagement counts.
#[derive(Clone)]
pub struct PostRepository {
    pool: PgPool,
}

impl PostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fetch one candidate window for the main feed.
    ///
    /// Candidates exclude the requesting user's own posts and are filtered
    /// to posts authored by a friend OR carrying one of the user's interest
    /// tags. The window is ordered by the same total order the ranking
    /// engine sorts by (priority tier desc, created_at desc, id asc).
    ///
    /// A cursor names the lowest-ranked post the previous page dropped; the
    /// next window begins at that post, so no post is dropped or duplicated
    /// across page boundaries. `cursor`, when present, must name an
    /// existing post; anything else is rejected as a bad request.
    pub async fn candidate_page(
        &self,
        user_id: Uuid,
        friend_ids: &[Uuid],
        interest_tag_ids: &[Uuid],
        cursor: Option<Uuid>,
        window: i64,
    ) -> Result<Vec<CandidatePost>> {
        let rows: Vec<PostRow> = match cursor {
            Some(cursor_id) => {
                let anchor = self.cursor_anchor(cursor_id, interest_tag_ids).await?;
                let anchor_priority = i32::from(priority_tier(
                    friend_ids.contains(&anchor.author_id),
                    anchor.has_shared_tag,
                ));

                sqlx::query_as(
                    r#"
                    SELECT c.id, c.author_id, c.username, c.avatar_url,
                           c.content, c.created_at, c.like_count, c.comment_count
                    FROM (
                        SELECT p.id,
                               p.user_id AS author_id,
                               u.username,
                               pr.profile_image_url AS avatar_url,
                               p.content,
                               p.created_at,
                               (SELECT COUNT(*) FROM likes l WHERE l.post_id = p.id) AS like_count,
                               (SELECT COUNT(*) FROM comments cm WHERE cm.post_id = p.id) AS comment_count,
                               (CASE WHEN p.user_id = ANY($2) THEN 2 ELSE 0 END)
                             + (CASE WHEN EXISTS (
                                    SELECT 1 FROM post_tags pt
                                    WHERE pt.post_id = p.id AND pt.tag_id = ANY($3)
                                ) THEN 1 ELSE 0 END) AS priority
                        FROM posts p
                        JOIN users u ON u.id = p.user_id
                        LEFT JOIN profiles pr ON pr.user_id = p.user_id
                        WHERE p.user_id <> $1
                          AND (p.user_id = ANY($2)
                               OR EXISTS (
                                   SELECT 1 FROM post_tags pt
                                   WHERE pt.post_id = p.id AND pt.tag_id = ANY($3)
                               ))
                    ) c
                    WHERE c.priority < $4
                       OR (c.priority = $4 AND c.created_at < $5)
                       OR (c.priority = $4 AND c.created_at = $5 AND c.id >= $6)
                    ORDER BY c.priority DESC, c.created_at DESC, c.id ASC
                    LIMIT $7
                    "#,
                )
                .bind(user_id)
                .bind(friend_ids)
                .bind(interest_tag_ids)
                .bind(anchor_priority)
                .bind(anchor.created_at)
                .bind(cursor_id)
                .bind(window)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as(
                    r#"
                    SELECT c.id, c.author_id, c.username, c.avatar_url,
                           c.content, c.created_at, c.like_count, c.comment_count
                    FROM (
                        SELECT p.id,
                               p.user_id AS author_id,
                               u.username,
                               pr.profile_image_url AS avatar_url,
                               p.content,
                               p.created_at,
                               (SELECT COUNT(*) FROM likes l WHERE l.post_id = p.id) AS like_count,
                               (SELECT COUNT(*) FROM comments cm WHERE cm.post_id = p.id) AS comment_count,
                               (CASE WHEN p.user_id = ANY($2) THEN 2 ELSE 0 END)
                             + (CASE WHEN EXISTS (
                                    SELECT 1 FROM post_tags pt
                                    WHERE pt.post_id = p.id AND pt.tag_id = ANY($3)
                                ) THEN 1 ELSE 0 END) AS priority
                        FROM posts p
                        JOIN users u ON u.id = p.user_id
                        LEFT JOIN profiles pr ON pr.user_id = p.user_id
                        WHERE p.user_id <> $1
                          AND (p.user_id = ANY($2)
                               OR EXISTS (
                                   SELECT 1 FROM post_tags pt
                                   WHERE pt.post_id = p.id AND pt.tag_id = ANY($3)
                               ))
                    ) c
                    ORDER BY c.priority DESC, c.created_at DESC, c.id ASC
                    LIMIT $4
                    "#,
                )
                .bind(user_id)
                .bind(friend_ids)
                .bind(interest_tag_ids)
                .bind(window)
                .fetch_all(&self.pool)
                .await?
            }
        };

        self.hydrate(rows).await
    }

    /// A user's own posts, newest first, with the same projection the feed
    /// uses
    pub async fn posts_by_user(&self, user_id: Uuid) -> Result<Vec<CandidatePost>> {
        let rows: Vec<PostRow> = sqlx::query_as(
            r#"
            SELECT p.id,
                   p.user_id AS author_id,
                   u.username,
                   pr.profile_image_url AS avatar_url,
                   p.content,
                   p.created_at,
                   (SELECT COUNT(*) FROM likes l WHERE l.post_id = p.id) AS like_count,
                   (SELECT COUNT(*) FROM comments cm WHERE cm.post_id = p.id) AS comment_count
            FROM posts p
            JOIN users u ON u.id = p.user_id
            LEFT JOIN profiles pr ON pr.user_id = p.user_id
            WHERE p.user_id = $1
            ORDER BY p.created_at DESC, p.id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        self.hydrate(rows).await
    }

    /// Resolve the cursor post to its position key. An id that matches no
    /// post cannot anchor a page.
    async fn cursor_anchor(
        &self,
        cursor_id: Uuid,
        interest_tag_ids: &[Uuid],
    ) -> Result<CursorAnchor> {
        let anchor: Option<CursorAnchor> = sqlx::query_as(
            r#"
            SELECT p.user_id AS author_id,
                   p.created_at,
                   EXISTS (
                       SELECT 1 FROM post_tags pt
                       WHERE pt.post_id = p.id AND pt.tag_id = ANY($2)
                   ) AS has_shared_tag
            FROM posts p
            WHERE p.id = $1
            "#,
        )
        .bind(cursor_id)
        .bind(interest_tag_ids)
        .fetch_optional(&self.pool)
        .await?;

        anchor.ok_or_else(|| AppError::BadRequest(format!("Unknown cursor: {cursor_id}")))
    }

    /// Attach media and tags to a batch of post rows, preserving row order
    async fn hydrate(&self, rows: Vec<PostRow>) -> Result<Vec<CandidatePost>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let post_ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();

        let media_rows: Vec<MediaRow> = sqlx::query_as(
            r#"
            SELECT post_id, url, media_type
            FROM post_media
            WHERE post_id = ANY($1)
            ORDER BY post_id, position
            "#,
        )
        .bind(&post_ids)
        .fetch_all(&self.pool)
        .await?;

        let tag_rows: Vec<PostTagRow> = sqlx::query_as(
            r#"
            SELECT pt.post_id, t.id AS tag_id, t.name
            FROM post_tags pt
            JOIN interest_tags t ON t.id = pt.tag_id
            WHERE pt.post_id = ANY($1)
            ORDER BY pt.post_id, t.name
            "#,
        )
        .bind(&post_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut media_by_post: HashMap<Uuid, Vec<MediaItem>> = HashMap::new();
        for row in media_rows {
            media_by_post.entry(row.post_id).or_default().push(MediaItem {
                url: row.url,
                kind: MediaKind::from_db(&row.media_type),
            });
        }

        let mut tags_by_post: HashMap<Uuid, Vec<TagRef>> = HashMap::new();
        for row in tag_rows {
            tags_by_post.entry(row.post_id).or_default().push(TagRef {
                id: row.tag_id,
                name: row.name,
            });
        }

        Ok(rows
            .into_iter()
            .map(|row| CandidatePost {
                id: row.id,
                author_id: row.author_id,
                username: row.username,
                avatar_url: row.avatar_url,
                content: row.content,
                created_at: row.created_at,
                media: media_by_post.remove(&row.id).unwrap_or_default(),
                tags: tags_by_post.remove(&row.id).unwrap_or_default(),
                like_count: row.like_count,
                comment_count: row.comment_count,
            })
            .collect())
    }
}
