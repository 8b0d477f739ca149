//! Feed orchestration: user check, relation sets, candidate window, ranking
//!
//! Wires the store collaborators and the relation cache in front of the pure
//! ranking engine. Any collaborator error aborts the whole computation;
//! there is no partial-result mode.

use crate::cache::RelationCache;
use crate::db::{FriendshipRepository, InterestRepository, PostRepository, UserRepository};
use crate::error::{AppError, Result};
use crate::models::{CandidatePost, FeedPage};
use crate::services::ranking::compute_feed;
use async_trait::async_trait;
use sqlx::PgPool;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

/// Store capabilities the feed computation consumes.
///
/// Kept behind a trait so the orchestration runs against fixture data in
/// tests; the ranking engine itself never touches a store.
#[async_trait]
pub trait FeedStore: Send + Sync {
    async fn user_exists(&self, user_id: Uuid) -> Result<bool>;

    async fn accepted_friend_ids(&self, user_id: Uuid) -> Result<HashSet<Uuid>>;

    async fn interest_tag_ids(&self, user_id: Uuid) -> Result<HashSet<Uuid>>;

    /// One candidate window sized `window`, ordered by the ranking total
    /// order, beginning at the `cursor` post when one is given
    async fn candidate_page(
        &self,
        user_id: Uuid,
        friend_ids: &HashSet<Uuid>,
        interest_tag_ids: &HashSet<Uuid>,
        cursor: Option<Uuid>,
        window: usize,
    ) -> Result<Vec<CandidatePost>>;
}

/// Postgres-backed store
#[derive(Clone)]
pub struct PgFeedStore {
    users: UserRepository,
    friendships: FriendshipRepository,
    interests: InterestRepository,
    posts: PostRepository,
}

impl PgFeedStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            friendships: FriendshipRepository::new(pool.clone()),
            interests: InterestRepository::new(pool.clone()),
            posts: PostRepository::new(pool),
        }
    }
}

#[async_trait]
impl FeedStore for PgFeedStore {
    async fn user_exists(&self, user_id: Uuid) -> Result<bool> {
        self.users.exists(user_id).await
    }

    async fn accepted_friend_ids(&self, user_id: Uuid) -> Result<HashSet<Uuid>> {
        self.friendships.accepted_friend_ids(user_id).await
    }

    async fn interest_tag_ids(&self, user_id: Uuid) -> Result<HashSet<Uuid>> {
        self.interests.interest_tag_ids(user_id).await
    }

    async fn candidate_page(
        &self,
        user_id: Uuid,
        friend_ids: &HashSet<Uuid>,
        interest_tag_ids: &HashSet<Uuid>,
        cursor: Option<Uuid>,
        window: usize,
    ) -> Result<Vec<CandidatePost>> {
        let friend_ids: Vec<Uuid> = friend_ids.iter().copied().collect();
        let interest_tag_ids: Vec<Uuid> = interest_tag_ids.iter().copied().collect();
        self.posts
            .candidate_page(
                user_id,
                &friend_ids,
                &interest_tag_ids,
                cursor,
                window as i64,
            )
            .await
    }
}

/// Main feed service
pub struct FeedService {
    store: Arc<dyn FeedStore>,
    cache: Option<RelationCache>,
}

impl FeedService {
    pub fn new(store: Arc<dyn FeedStore>, cache: Option<RelationCache>) -> Self {
        Self { store, cache }
    }

    /// Compute one page of the ranked main feed for `user_id`.
    ///
    /// `limit` must be positive; defaulting and clamping belong to the
    /// caller.
    pub async fn main_feed(
        &self,
        user_id: Uuid,
        cursor: Option<Uuid>,
        limit: usize,
    ) -> Result<FeedPage> {
        if limit == 0 {
            return Err(AppError::BadRequest("limit must be positive".to_string()));
        }

        if !self.store.user_exists(user_id).await? {
            return Err(AppError::NotFound(format!("User {user_id} not found")));
        }

        let friend_ids = self.friend_ids(user_id).await?;
        let interest_tag_ids = self.interest_tag_ids(user_id).await?;

        // Lookahead window: one extra candidate signals another page
        let candidates = self
            .store
            .candidate_page(user_id, &friend_ids, &interest_tag_ids, cursor, limit + 1)
            .await?;

        debug!(
            %user_id,
            friends = friend_ids.len(),
            interests = interest_tag_ids.len(),
            candidates = candidates.len(),
            "feed candidates fetched"
        );

        Ok(compute_feed(
            user_id,
            &friend_ids,
            &interest_tag_ids,
            candidates,
            limit,
        ))
    }

    async fn friend_ids(&self, user_id: Uuid) -> Result<HashSet<Uuid>> {
        if let Some(cache) = &self.cache {
            if let Some(ids) = cache.get_friend_ids(user_id).await {
                return Ok(ids);
            }
        }

        let ids = self.store.accepted_friend_ids(user_id).await?;

        if let Some(cache) = &self.cache {
            if let Err(e) = cache.set_friend_ids(user_id, &ids).await {
                warn!("Failed to cache friend ids for {}: {}", user_id, e);
            }
        }

        Ok(ids)
    }

    async fn interest_tag_ids(&self, user_id: Uuid) -> Result<HashSet<Uuid>> {
        if let Some(cache) = &self.cache {
            if let Some(ids) = cache.get_interest_tag_ids(user_id).await {
                return Ok(ids);
            }
        }

        let ids = self.store.interest_tag_ids(user_id).await?;

        if let Some(cache) = &self.cache {
            if let Err(e) = cache.set_interest_tag_ids(user_id, &ids).await {
                warn!("Failed to cache interest tags for {}: {}", user_id, e);
            }
        }

        Ok(ids)
    }
}
