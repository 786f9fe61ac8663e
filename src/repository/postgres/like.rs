use std::collections::HashSet;

use async_trait::async_trait;
use sqlx::PgPool;

use crate::{
    models::like::TargetType,
    repository::{LikeRepository, RepoResult},
};

pub struct PgLikeRepository {
    pool: PgPool,
}

impl PgLikeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn counter_sql(target: TargetType, delta_positive: bool) -> &'static str {
    match (target, delta_positive) {
        (TargetType::Article, true) => "UPDATE articles SET like_count = like_count + 1 WHERE id = $1",
        (TargetType::Article, false) => {
            "UPDATE articles SET like_count = GREATEST(like_count - 1, 0) WHERE id = $1"
        }
        (TargetType::Comment, true) => "UPDATE comments SET like_count = like_count + 1 WHERE id = $1",
        (TargetType::Comment, false) => {
            "UPDATE comments SET like_count = GREATEST(like_count - 1, 0) WHERE id = $1"
        }
    }
}

#[async_trait]
impl LikeRepository for PgLikeRepository {
    async fn toggle(&self, user_id: i64, target: TargetType, target_id: i64) -> RepoResult<bool> {
        let mut tx = self.pool.begin().await?;

        let removed = sqlx::query(
            "DELETE FROM likes WHERE user_id = $1 AND target_type = $2 AND target_id = $3",
        )
        .bind(user_id)
        .bind(target.as_str())
        .bind(target_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        let liked = if removed > 0 {
            sqlx::query(counter_sql(target, false))
                .bind(target_id)
                .execute(&mut *tx)
                .await?;
            false
        } else {
            // A concurrent toggle may have inserted the row already; the unique
            // constraint keeps it at one.
            let inserted = sqlx::query(
                r#"
                INSERT INTO likes (user_id, target_type, target_id)
                VALUES ($1, $2, $3)
                ON CONFLICT ON CONSTRAINT uq_likes_user_target DO NOTHING
                "#,
            )
            .bind(user_id)
            .bind(target.as_str())
            .bind(target_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

            if inserted > 0 {
                sqlx::query(counter_sql(target, true))
                    .bind(target_id)
                    .execute(&mut *tx)
                    .await?;
            }
            true
        };

        tx.commit().await?;
        tracing::debug!(user_id, %target, target_id, liked, "Like toggled");
        Ok(liked)
    }

    async fn is_liked(&self, user_id: i64, target: TargetType, target_id: i64) -> RepoResult<bool> {
        let liked = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM likes
                WHERE user_id = $1 AND target_type = $2 AND target_id = $3
            )
            "#,
        )
        .bind(user_id)
        .bind(target.as_str())
        .bind(target_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(liked)
    }

    async fn liked_ids(
        &self,
        user_id: i64,
        target: TargetType,
        target_ids: &[i64],
    ) -> RepoResult<HashSet<i64>> {
        if target_ids.is_empty() {
            return Ok(HashSet::new());
        }
        let ids = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT target_id FROM likes
            WHERE user_id = $1 AND target_type = $2 AND target_id = ANY($3)
            "#,
        )
        .bind(user_id)
        .bind(target.as_str())
        .bind(target_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids.into_iter().collect())
    }
}
