use async_trait::async_trait;
use sqlx::PgPool;

use crate::{
    models::article_image::ArticleImage,
    repository::{ArticleImageRepository, RepoResult},
};

pub struct PgArticleImageRepository {
    pool: PgPool,
}

impl PgArticleImageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ArticleImageRepository for PgArticleImageRepository {
    async fn list_by_article(&self, article_id: i64) -> RepoResult<Vec<ArticleImage>> {
        let images = sqlx::query_as::<_, ArticleImage>(
            r#"
            SELECT * FROM article_images
            WHERE article_id = $1 AND deleted_at IS NULL
            ORDER BY id ASC
            "#,
        )
        .bind(article_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(images)
    }

    async fn find_by_url(&self, url: &str) -> RepoResult<Option<ArticleImage>> {
        let image = sqlx::query_as::<_, ArticleImage>(
            "SELECT * FROM article_images WHERE image_url = $1 AND deleted_at IS NULL LIMIT 1",
        )
        .bind(url)
        .fetch_optional(&self.pool)
        .await?;
        Ok(image)
    }

    async fn create(&self, article_id: i64, url: &str) -> RepoResult<ArticleImage> {
        let image = sqlx::query_as::<_, ArticleImage>(
            "INSERT INTO article_images (article_id, image_url) VALUES ($1, $2) RETURNING *",
        )
        .bind(article_id)
        .bind(url)
        .fetch_one(&self.pool)
        .await?;
        Ok(image)
    }

    async fn soft_delete(&self, id: i64) -> RepoResult<()> {
        sqlx::query("UPDATE article_images SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
