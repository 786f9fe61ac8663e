use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use super::like_pattern;
use crate::{
    error::AppError,
    models::article::{Article, ArticleChanges, ArticleFilter, ArticleStatus, NewArticle},
    repository::{ArticleRepository, RepoResult},
};

pub struct PgArticleRepository {
    pool: PgPool,
}

impl PgArticleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Appends the WHERE clause shared by the count and page queries.
fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &ArticleFilter) {
    qb.push(" WHERE a.deleted_at IS NULL");

    match filter.viewer_id {
        None => {
            qb.push(" AND a.status = ")
                .push_bind(ArticleStatus::Published.as_str());
        }
        Some(viewer_id) => {
            qb.push(" AND (a.status = ")
                .push_bind(ArticleStatus::Published.as_str())
                .push(" OR a.author_id = ")
                .push_bind(viewer_id)
                .push(")");
        }
    }

    if let Some(status) = filter.status {
        qb.push(" AND a.status = ").push_bind(status.as_str());
    }
    if let Some(category_id) = filter.category_id {
        qb.push(
            " AND EXISTS (SELECT 1 FROM article_categories ac WHERE ac.article_id = a.id AND ac.category_id = ",
        )
        .push_bind(category_id)
        .push(")");
    }
    if let Some(tag_id) = filter.tag_id {
        qb.push(" AND EXISTS (SELECT 1 FROM article_tags atg WHERE atg.article_id = a.id AND atg.tag_id = ")
            .push_bind(tag_id)
            .push(")");
    }
    if let Some(author_id) = filter.author_id {
        qb.push(" AND a.author_id = ").push_bind(author_id);
    }
    if let Some(keyword) = filter.keyword.as_deref() {
        let pattern = like_pattern(keyword);
        qb.push(" AND (a.title ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR a.content ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

#[async_trait]
impl ArticleRepository for PgArticleRepository {
    async fn create(&self, article: NewArticle) -> RepoResult<Article> {
        let article = sqlx::query_as::<_, Article>(
            r#"
            INSERT INTO articles
                (title, slug, content, content_html, summary, cover_image_url,
                 author_id, status, published_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(&article.title)
        .bind(&article.slug)
        .bind(&article.content)
        .bind(&article.content_html)
        .bind(&article.summary)
        .bind(&article.cover_image_url)
        .bind(article.author_id)
        .bind(article.status.as_str())
        .bind(article.published_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create article: {:?}", e);
            AppError::from(e)
        })?;

        Ok(article)
    }

    async fn find_by_id(&self, id: i64) -> RepoResult<Option<Article>> {
        let article = sqlx::query_as::<_, Article>(
            "SELECT * FROM articles WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(article)
    }

    async fn slug_exists(&self, slug: &str, exclude_id: Option<i64>) -> RepoResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM articles WHERE slug = $1 AND ($2::BIGINT IS NULL OR id <> $2))",
        )
        .bind(slug)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn list(&self, filter: &ArticleFilter) -> RepoResult<(Vec<Article>, i64)> {
        let mut count_qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM articles a");
        push_filters(&mut count_qb, filter);
        let total = count_qb
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        let mut qb = QueryBuilder::<Postgres>::new("SELECT a.* FROM articles a");
        push_filters(&mut qb, filter);
        // Column and direction come from closed enums, never from user text.
        let order = filter.order.keyword();
        qb.push(format!(
            " ORDER BY a.{} {} NULLS LAST, a.id {}",
            filter.sort.column(),
            order,
            order
        ));
        qb.push(" LIMIT ")
            .push_bind(filter.limit)
            .push(" OFFSET ")
            .push_bind(filter.offset);

        let articles = qb
            .build_query_as::<Article>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list articles: {:?}", e);
                AppError::from(e)
            })?;

        Ok((articles, total))
    }

    async fn update(&self, id: i64, changes: ArticleChanges) -> RepoResult<Article> {
        sqlx::query_as::<_, Article>(
            r#"
            UPDATE articles
            SET title = $2, slug = $3, content = $4, content_html = $5, summary = $6,
                cover_image_url = $7, status = $8, editor_id = $9, published_at = $10,
                edit_count = edit_count + 1, updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&changes.title)
        .bind(&changes.slug)
        .bind(&changes.content)
        .bind(&changes.content_html)
        .bind(&changes.summary)
        .bind(&changes.cover_image_url)
        .bind(&changes.status)
        .bind(changes.editor_id)
        .bind(changes.published_at)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::NotFound("Article not found".to_string()))
    }

    async fn soft_delete(&self, id: i64) -> RepoResult<()> {
        sqlx::query("UPDATE articles SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete article: {:?}", e);
                AppError::from(e)
            })?;
        Ok(())
    }

    async fn increment_view_count(&self, id: i64) -> RepoResult<()> {
        sqlx::query("UPDATE articles SET view_count = view_count + 1 WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn replace_categories(&self, article_id: i64, category_ids: &[i64]) -> RepoResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM article_categories WHERE article_id = $1")
            .bind(article_id)
            .execute(&mut *tx)
            .await?;

        if !category_ids.is_empty() {
            sqlx::query(
                r#"
                INSERT INTO article_categories (article_id, category_id)
                SELECT $1, id FROM categories WHERE id = ANY($2)
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(article_id)
            .bind(category_ids)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn replace_tags(&self, article_id: i64, tag_ids: &[i64]) -> RepoResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM article_tags WHERE article_id = $1")
            .bind(article_id)
            .execute(&mut *tx)
            .await?;

        if !tag_ids.is_empty() {
            sqlx::query(
                r#"
                INSERT INTO article_tags (article_id, tag_id)
                SELECT $1, id FROM tags WHERE id = ANY($2)
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(article_id)
            .bind(tag_ids)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}
