use crate::error::Result;
use crate::models::FriendshipStatus;
use sqlx::PgPool;
use std::collections::HashSet;
use uuid::Uuid;

/// Repository for friendship-edge reads
#[derive(Clone)]
pub struct FriendshipRepository {
    pool: PgPool,
}

impl FriendshipRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Accepted counterparties of `user_id`, regardless of which side sent
    /// the original request. Edges are stored directed but read
    /// symmetrically.
    pub async fn accepted_friend_ids(&self, user_id: Uuid) -> Result<HashSet<Uuid>> {
        let edges: Vec<(Uuid, Uuid)> = sqlx::query_as(
            r#"
            SELECT requester_id, addressee_id
            FROM friendships
            WHERE status = $2
              AND (requester_id = $1 OR addressee_id = $1)
            "#,
        )
        .bind(user_id)
        .bind(FriendshipStatus::Accepted.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(edges
            .into_iter()
            .map(|(requester, addressee)| {
                if requester == user_id {
                    addressee
                } else {
                    requester
                }
            })
            .collect())
    }
}
