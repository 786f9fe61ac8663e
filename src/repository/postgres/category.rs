use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use crate::{
    error::AppError,
    models::category::{Category, CategoryChanges, CategorySummary, NewCategory},
    repository::{CategoryRepository, RepoResult},
};

/// Category columns plus the live article count.
const CATEGORY_COLUMNS: &str = r#"
    c.id, c.name, c.slug, c.description, c.parent_id, c.icon_url, c.sort_order, c.is_active,
    (SELECT COUNT(*) FROM article_categories ac
        JOIN articles a ON a.id = ac.article_id
        WHERE ac.category_id = c.id AND a.deleted_at IS NULL) AS article_count,
    c.created_at, c.updated_at
"#;

pub struct PgCategoryRepository {
    pool: PgPool,
}

impl PgCategoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_one_where(&self, clause: &str, id: i64) -> RepoResult<Option<Category>> {
        let sql = format!("SELECT {} FROM categories c WHERE {}", CATEGORY_COLUMNS, clause);
        let category = sqlx::query_as::<_, Category>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(category)
    }
}

#[derive(FromRow)]
struct ArticleCategoryRow {
    article_id: i64,
    id: i64,
    name: String,
    slug: String,
}

#[async_trait]
impl CategoryRepository for PgCategoryRepository {
    async fn create(&self, category: NewCategory) -> RepoResult<Category> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO categories (name, slug, description, parent_id, icon_url, sort_order)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(&category.name)
        .bind(&category.slug)
        .bind(&category.description)
        .bind(category.parent_id)
        .bind(&category.icon_url)
        .bind(category.sort_order)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create category: {:?}", e);
            AppError::from(e)
        })?;

        self.fetch_one_where("c.id = $1", id)
            .await?
            .ok_or_else(|| AppError::InternalServerError("Category vanished after insert".to_string()))
    }

    async fn find_by_id(&self, id: i64) -> RepoResult<Option<Category>> {
        self.fetch_one_where("c.id = $1", id).await
    }

    async fn find_by_slug(&self, slug: &str) -> RepoResult<Option<Category>> {
        let sql = format!("SELECT {} FROM categories c WHERE c.slug = $1", CATEGORY_COLUMNS);
        let category = sqlx::query_as::<_, Category>(&sql)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;
        Ok(category)
    }

    async fn list(&self, parent_id: Option<i64>, is_active: Option<bool>) -> RepoResult<Vec<Category>> {
        let sql = format!(
            r#"
            SELECT {} FROM categories c
            WHERE (($1::BIGINT IS NULL AND c.parent_id IS NULL) OR c.parent_id = $1)
              AND ($2::BOOLEAN IS NULL OR c.is_active = $2)
            ORDER BY c.sort_order ASC, c.created_at ASC, c.id ASC
            "#,
            CATEGORY_COLUMNS
        );
        let categories = sqlx::query_as::<_, Category>(&sql)
            .bind(parent_id)
            .bind(is_active)
            .fetch_all(&self.pool)
            .await?;
        Ok(categories)
    }

    async fn list_children(&self, parent_ids: &[i64], active_only: bool) -> RepoResult<Vec<Category>> {
        if parent_ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            r#"
            SELECT {} FROM categories c
            WHERE c.parent_id = ANY($1) AND (NOT $2 OR c.is_active)
            ORDER BY c.sort_order ASC, c.created_at ASC, c.id ASC
            "#,
            CATEGORY_COLUMNS
        );
        let categories = sqlx::query_as::<_, Category>(&sql)
            .bind(parent_ids)
            .bind(active_only)
            .fetch_all(&self.pool)
            .await?;
        Ok(categories)
    }

    async fn update(&self, id: i64, changes: CategoryChanges) -> RepoResult<Category> {
        let updated = sqlx::query(
            r#"
            UPDATE categories
            SET name = $2, description = $3, parent_id = $4, icon_url = $5,
                sort_order = $6, is_active = $7, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&changes.name)
        .bind(&changes.description)
        .bind(changes.parent_id)
        .bind(&changes.icon_url)
        .bind(changes.sort_order)
        .bind(changes.is_active)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if updated == 0 {
            return Err(AppError::NotFound("Category not found".to_string()));
        }

        self.fetch_one_where("c.id = $1", id)
            .await?
            .ok_or(AppError::NotFound("Category not found".to_string()))
    }

    async fn delete(&self, id: i64) -> RepoResult<()> {
        sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn count_children(&self, id: i64) -> RepoResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM categories WHERE parent_id = $1")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn summaries_for_articles(
        &self,
        article_ids: &[i64],
    ) -> RepoResult<HashMap<i64, Vec<CategorySummary>>> {
        if article_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows = sqlx::query_as::<_, ArticleCategoryRow>(
            r#"
            SELECT ac.article_id, c.id, c.name, c.slug
            FROM article_categories ac
            JOIN categories c ON c.id = ac.category_id
            WHERE ac.article_id = ANY($1)
            ORDER BY c.sort_order ASC, c.id ASC
            "#,
        )
        .bind(article_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut grouped: HashMap<i64, Vec<CategorySummary>> = HashMap::new();
        for row in rows {
            grouped.entry(row.article_id).or_default().push(CategorySummary {
                id: row.id,
                name: row.name,
                slug: row.slug,
            });
        }
        Ok(grouped)
    }
}
