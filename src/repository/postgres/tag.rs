use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};

use super::like_pattern;
use crate::{
    error::AppError,
    models::tag::{NewTag, Tag, TagChanges, TagListParams, TagSummary},
    repository::{RepoResult, TagRepository},
};

/// Tag columns plus the live article count.
const TAG_COLUMNS: &str = r#"
    t.id, t.name, t.slug, t.description, t.color,
    (SELECT COUNT(*) FROM article_tags atg
        JOIN articles a ON a.id = atg.article_id
        WHERE atg.tag_id = t.id AND a.deleted_at IS NULL) AS article_count,
    t.created_at
"#;

pub struct PgTagRepository {
    pool: PgPool,
}

impl PgTagRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_by_column(&self, column: &str, value: &str) -> RepoResult<Option<Tag>> {
        let sql = format!("SELECT {} FROM tags t WHERE t.{} = $1", TAG_COLUMNS, column);
        let tag = sqlx::query_as::<_, Tag>(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;
        Ok(tag)
    }
}

#[derive(FromRow)]
struct ArticleTagRow {
    article_id: i64,
    id: i64,
    name: String,
    slug: String,
}

#[async_trait]
impl TagRepository for PgTagRepository {
    async fn create(&self, tag: NewTag) -> RepoResult<Tag> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO tags (name, slug, description, color)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(&tag.name)
        .bind(&tag.slug)
        .bind(&tag.description)
        .bind(&tag.color)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create tag: {:?}", e);
            AppError::from(e)
        })?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::InternalServerError("Tag vanished after insert".to_string()))
    }

    async fn find_by_id(&self, id: i64) -> RepoResult<Option<Tag>> {
        let sql = format!("SELECT {} FROM tags t WHERE t.id = $1", TAG_COLUMNS);
        let tag = sqlx::query_as::<_, Tag>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(tag)
    }

    async fn find_by_slug(&self, slug: &str) -> RepoResult<Option<Tag>> {
        self.find_by_column("slug", slug).await
    }

    async fn find_by_name(&self, name: &str) -> RepoResult<Option<Tag>> {
        self.find_by_column("name", name).await
    }

    async fn list(&self, params: &TagListParams) -> RepoResult<Vec<Tag>> {
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT * FROM (SELECT {} FROM tags t) counted",
            TAG_COLUMNS
        ));

        if let Some(keyword) = params.keyword.as_deref().filter(|k| !k.is_empty()) {
            let pattern = like_pattern(keyword);
            qb.push(" WHERE (name ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR description ILIKE ")
                .push_bind(pattern)
                .push(")");
        }

        let order = params.order.unwrap_or_default().keyword();
        qb.push(format!(
            " ORDER BY {} {}, id ASC",
            params.sort.unwrap_or_default().column(),
            order
        ));

        if let Some(limit) = params.limit.filter(|l| *l > 0) {
            qb.push(" LIMIT ").push_bind(limit);
        }

        let tags = qb.build_query_as::<Tag>().fetch_all(&self.pool).await?;
        Ok(tags)
    }

    async fn update(&self, id: i64, changes: TagChanges) -> RepoResult<Tag> {
        let updated = sqlx::query("UPDATE tags SET name = $2, description = $3, color = $4 WHERE id = $1")
            .bind(id)
            .bind(&changes.name)
            .bind(&changes.description)
            .bind(&changes.color)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if updated == 0 {
            return Err(AppError::NotFound("Tag not found".to_string()));
        }

        self.find_by_id(id)
            .await?
            .ok_or(AppError::NotFound("Tag not found".to_string()))
    }

    async fn delete(&self, id: i64) -> RepoResult<()> {
        sqlx::query("DELETE FROM tags WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn summaries_for_articles(
        &self,
        article_ids: &[i64],
    ) -> RepoResult<HashMap<i64, Vec<TagSummary>>> {
        if article_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows = sqlx::query_as::<_, ArticleTagRow>(
            r#"
            SELECT atg.article_id, t.id, t.name, t.slug
            FROM article_tags atg
            JOIN tags t ON t.id = atg.tag_id
            WHERE atg.article_id = ANY($1)
            ORDER BY t.name ASC
            "#,
        )
        .bind(article_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut grouped: HashMap<i64, Vec<TagSummary>> = HashMap::new();
        for row in rows {
            grouped.entry(row.article_id).or_default().push(TagSummary {
                id: row.id,
                name: row.name,
                slug: row.slug,
            });
        }
        Ok(grouped)
    }
}
