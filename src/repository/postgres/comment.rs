use async_trait::async_trait;
use sqlx::PgPool;

use crate::{
    error::AppError,
    models::comment::{COMMENT_STATUS_PUBLISHED, Comment, NewComment},
    repository::{CommentRepository, RepoResult},
};

pub struct PgCommentRepository {
    pool: PgPool,
}

impl PgCommentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommentRepository for PgCommentRepository {
    async fn find_by_id(&self, id: i64) -> RepoResult<Option<Comment>> {
        let comment = sqlx::query_as::<_, Comment>(
            "SELECT * FROM comments WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(comment)
    }

    async fn create(&self, comment: NewComment) -> RepoResult<Comment> {
        let mut tx = self.pool.begin().await?;

        let created = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (article_id, user_id, parent_id, content, content_html, status)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(comment.article_id)
        .bind(comment.user_id)
        .bind(comment.parent_id)
        .bind(&comment.content)
        .bind(&comment.content_html)
        .bind(COMMENT_STATUS_PUBLISHED)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to insert comment: {:?}", e);
            AppError::from(e)
        })?;

        if let Some(parent_id) = comment.parent_id {
            sqlx::query("UPDATE comments SET reply_count = reply_count + 1 WHERE id = $1")
                .bind(parent_id)
                .execute(&mut *tx)
                .await?;
        }

        sqlx::query("UPDATE articles SET comment_count = comment_count + 1 WHERE id = $1")
            .bind(comment.article_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(created)
    }

    async fn list_top_level(
        &self,
        article_id: i64,
        offset: i64,
        limit: i64,
    ) -> RepoResult<(Vec<Comment>, i64)> {
        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM comments
            WHERE article_id = $1 AND parent_id IS NULL
              AND status = $2 AND deleted_at IS NULL
            "#,
        )
        .bind(article_id)
        .bind(COMMENT_STATUS_PUBLISHED)
        .fetch_one(&self.pool)
        .await?;

        let comments = sqlx::query_as::<_, Comment>(
            r#"
            SELECT * FROM comments
            WHERE article_id = $1 AND parent_id IS NULL
              AND status = $2 AND deleted_at IS NULL
            ORDER BY created_at DESC, id DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(article_id)
        .bind(COMMENT_STATUS_PUBLISHED)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok((comments, total))
    }

    async fn list_replies(&self, parent_ids: &[i64]) -> RepoResult<Vec<Comment>> {
        if parent_ids.is_empty() {
            return Ok(Vec::new());
        }
        let replies = sqlx::query_as::<_, Comment>(
            r#"
            SELECT * FROM comments
            WHERE parent_id = ANY($1) AND status = $2 AND deleted_at IS NULL
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(parent_ids)
        .bind(COMMENT_STATUS_PUBLISHED)
        .fetch_all(&self.pool)
        .await?;
        Ok(replies)
    }

    async fn update_content(&self, id: i64, content: &str, content_html: &str) -> RepoResult<Comment> {
        sqlx::query_as::<_, Comment>(
            r#"
            UPDATE comments
            SET content = $2, content_html = $3, updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(content)
        .bind(content_html)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::NotFound("Comment not found".to_string()))
    }

    async fn delete(&self, comment: &Comment) -> RepoResult<u64> {
        let mut tx = self.pool.begin().await?;

        let mut removed = sqlx::query(
            "UPDATE comments SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(comment.id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        // Someone else got there first.
        if removed == 0 {
            return Ok(0);
        }

        match comment.parent_id {
            None => {
                removed += sqlx::query(
                    "UPDATE comments SET deleted_at = NOW() WHERE parent_id = $1 AND deleted_at IS NULL",
                )
                .bind(comment.id)
                .execute(&mut *tx)
                .await?
                .rows_affected();
            }
            Some(parent_id) => {
                sqlx::query(
                    "UPDATE comments SET reply_count = GREATEST(reply_count - 1, 0) WHERE id = $1",
                )
                .bind(parent_id)
                .execute(&mut *tx)
                .await?;
            }
        }

        sqlx::query(
            "UPDATE articles SET comment_count = GREATEST(comment_count - $2, 0) WHERE id = $1",
        )
        .bind(comment.article_id)
        .bind(i32::try_from(removed).unwrap_or(i32::MAX))
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(removed)
    }
}
