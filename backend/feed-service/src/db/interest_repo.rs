use crate::error::Result;
use crate::models::TagRef;
use sqlx::PgPool;
use std::collections::HashSet;
use uuid::Uuid;

/// Repository for interest-tag reads
#[derive(Clone)]
pub struct InterestRepository {
    pool: PgPool,
}

impl InterestRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Interest tags the user has declared on their profile
    pub async fn interest_tag_ids(&self, user_id: Uuid) -> Result<HashSet<Uuid>> {
        let ids: Vec<Uuid> = sqlx::query_scalar(
            r#"
            SELECT tag_id
            FROM profile_interest_tags
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids.into_iter().collect())
    }

    /// All interest tags, for tag pickers
    pub async fn list_tags(&self) -> Result<Vec<TagRef>> {
        let tags = sqlx::query_as::<_, TagRef>(
            r#"
            SELECT id, name
            FROM interest_tags
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(tags)
    }
}
