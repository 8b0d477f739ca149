//! Redis-based caching for per-user relation sets
//!
//! The feed recomputes ranking on every request, but the relation sets it
//! ranks against (accepted friend ids, declared interest tags) change far
//! less often than posts do. Those sets are cached per user with short TTLs.
//!
//! Cache keys:
//! - relations:friends:{user_id} → JSON array of user ids
//! - relations:interests:{user_id} → JSON array of tag ids
//!
//! Feed pages themselves are never cached: a stale page could disagree with
//! a freshly computed cursor chain.

use crate::error::{AppError, Result};
use redis::aio::ConnectionManager;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

/// Cache configuration
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Friend-id set TTL in seconds
    pub friend_ttl: u64,
    /// Interest-tag set TTL in seconds
    pub interest_ttl: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            friend_ttl: 300,
            interest_ttl: 900,
        }
    }
}

/// Relation-set cache layer using Redis
#[derive(Clone)]
pub struct RelationCache {
    client: Arc<ConnectionManager>,
    config: CacheConfig,
}

impl RelationCache {
    /// Create a new relation cache instance
    pub async fn new(redis_url: &str, config: CacheConfig) -> Result<Self> {
        let client = redis::Client::open(redis_url)
            .map_err(|e| AppError::Internal(format!("Failed to create Redis client: {}", e)))?;

        let manager = ConnectionManager::new(client)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to create Redis connection: {}", e)))?;

        Ok(Self {
            client: Arc::new(manager),
            config,
        })
    }

    /// Ping Redis to check connection health
    pub async fn ping(&self) -> Result<()> {
        redis::cmd("PING")
            .query_async::<_, String>(&mut self.client.as_ref().clone())
            .await
            .map_err(|e| {
                warn!("Redis PING failed: {}", e);
                AppError::Internal(format!("Redis health check failed: {}", e))
            })?;
        Ok(())
    }

    /// Cached friend-id set for a user. `None` on miss or on any Redis
    /// error: a degraded cache never fails a feed request.
    pub async fn get_friend_ids(&self, user_id: Uuid) -> Option<HashSet<Uuid>> {
        self.get_set(&Self::friends_key(user_id)).await
    }

    pub async fn set_friend_ids(&self, user_id: Uuid, ids: &HashSet<Uuid>) -> Result<()> {
        self.set_set(&Self::friends_key(user_id), ids, self.config.friend_ttl)
            .await
    }

    /// Cached interest-tag set for a user, `None` on miss or error
    pub async fn get_interest_tag_ids(&self, user_id: Uuid) -> Option<HashSet<Uuid>> {
        self.get_set(&Self::interests_key(user_id)).await
    }

    pub async fn set_interest_tag_ids(&self, user_id: Uuid, ids: &HashSet<Uuid>) -> Result<()> {
        self.set_set(&Self::interests_key(user_id), ids, self.config.interest_ttl)
            .await
    }

    /// Drop both cached sets for a user. Called when a friendship or
    /// profile-interest mutation must become visible before the TTL runs
    /// out.
    pub async fn invalidate_user(&self, user_id: Uuid) -> Result<()> {
        redis::cmd("DEL")
            .arg(Self::friends_key(user_id))
            .arg(Self::interests_key(user_id))
            .query_async::<_, ()>(&mut self.client.as_ref().clone())
            .await
            .map_err(|e| {
                warn!("Redis DEL failed for user {}: {}", user_id, e);
                AppError::Cache(e)
            })?;

        debug!("Invalidated relation cache for user {}", user_id);
        Ok(())
    }

    fn friends_key(user_id: Uuid) -> String {
        format!("relations:friends:{}", user_id)
    }

    fn interests_key(user_id: Uuid) -> String {
        format!("relations:interests:{}", user_id)
    }

    async fn get_set(&self, key: &str) -> Option<HashSet<Uuid>> {
        let value: Option<String> = match redis::cmd("GET")
            .arg(key)
            .query_async(&mut self.client.as_ref().clone())
            .await
        {
            Ok(value) => value,
            Err(e) => {
                warn!("Redis GET failed for {}: {}", key, e);
                return None;
            }
        };

        match value {
            Some(json) => match serde_json::from_str::<HashSet<Uuid>>(&json) {
                Ok(ids) => {
                    debug!("Cache hit for {}", key);
                    Some(ids)
                }
                Err(e) => {
                    warn!("Cache deserialization failed for {}: {}", key, e);
                    None
                }
            },
            None => {
                debug!("Cache miss for {}", key);
                None
            }
        }
    }

    async fn set_set(&self, key: &str, ids: &HashSet<Uuid>, ttl: u64) -> Result<()> {
        let json = serde_json::to_string(ids)
            .map_err(|e| AppError::Internal(format!("Cache serialization failed: {}", e)))?;

        redis::cmd("SETEX")
            .arg(key)
            .arg(ttl)
            .arg(&json)
            .query_async::<_, ()>(&mut self.client.as_ref().clone())
            .await
            .map_err(AppError::Cache)?;

        debug!("Cached {} with TTL={}s", key, ttl);
        Ok(())
    }
}
