use std::sync::Arc;

use crate::{
    error::AppError,
    models::category::{
        Category, CategoryChanges, CategoryListParams, CategoryResponse, CategorySummary,
        CreateCategoryRequest, NewCategory, UpdateCategoryRequest,
    },
    repository::CategoryRepository,
    utils::slug::slugify_or,
};

#[derive(Clone)]
pub struct CategoryService {
    categories: Arc<dyn CategoryRepository>,
}

impl CategoryService {
    pub fn new(categories: Arc<dyn CategoryRepository>) -> Self {
        Self { categories }
    }

    pub async fn create(&self, req: CreateCategoryRequest) -> Result<CategoryResponse, AppError> {
        let slug = slugify_or(req.slug.as_deref().unwrap_or(&req.name), "category");
        if self.categories.find_by_slug(&slug).await?.is_some() {
            return Err(AppError::BadRequest("Category slug already exists".to_string()));
        }

        let parent_id = req.parent_id.filter(|id| *id > 0);
        if let Some(parent_id) = parent_id {
            self.find(parent_id, "Parent category not found").await?;
        }

        let category = self
            .categories
            .create(NewCategory {
                name: req.name,
                slug,
                description: req.description.unwrap_or_default(),
                parent_id,
                icon_url: req.icon_url.unwrap_or_default(),
                sort_order: req.sort_order,
            })
            .await?;

        tracing::info!("Category created: {} ({})", category.name, category.slug);
        self.detail(category).await
    }

    pub async fn get_by_id(&self, id: i64) -> Result<CategoryResponse, AppError> {
        let category = self.find(id, "Category not found").await?;
        self.detail(category).await
    }

    pub async fn get_by_slug(&self, slug: &str) -> Result<CategoryResponse, AppError> {
        let category = self
            .categories
            .find_by_slug(slug)
            .await?
            .ok_or(AppError::NotFound("Category not found".to_string()))?;
        self.detail(category).await
    }

    /// One level of the tree (top level when no `parent_id`), or with
    /// `tree=true` the active top-level categories with their active children.
    pub async fn list(&self, params: CategoryListParams) -> Result<Vec<CategoryResponse>, AppError> {
        if !params.tree {
            let categories = self.categories.list(params.parent_id, params.is_active).await?;
            return Ok(categories.iter().map(CategoryResponse::from).collect());
        }

        let roots = self.categories.list(None, Some(true)).await?;
        let root_ids: Vec<i64> = roots.iter().map(|c| c.id).collect();
        let children = self.categories.list_children(&root_ids, true).await?;

        Ok(roots
            .iter()
            .map(|root| CategoryResponse {
                children: children
                    .iter()
                    .filter(|child| child.parent_id == Some(root.id))
                    .map(CategoryResponse::from)
                    .collect(),
                ..CategoryResponse::from(root)
            })
            .collect())
    }

    pub async fn update(&self, id: i64, req: UpdateCategoryRequest) -> Result<CategoryResponse, AppError> {
        let category = self.find(id, "Category not found").await?;

        // `0` detaches the category from its parent.
        let parent_id = match req.parent_id {
            None => category.parent_id,
            Some(0) => None,
            Some(parent_id) if parent_id == id => {
                return Err(AppError::BadRequest(
                    "A category cannot be its own parent".to_string(),
                ));
            }
            Some(parent_id) => {
                self.find(parent_id, "Parent category not found").await?;
                Some(parent_id)
            }
        };

        let updated = self
            .categories
            .update(
                id,
                CategoryChanges {
                    name: req.name.unwrap_or(category.name),
                    description: req.description.unwrap_or(category.description),
                    parent_id,
                    icon_url: req.icon_url.unwrap_or(category.icon_url),
                    sort_order: req.sort_order.unwrap_or(category.sort_order),
                    is_active: req.is_active.unwrap_or(category.is_active),
                },
            )
            .await?;
        self.detail(updated).await
    }

    /// Only leaf categories with no articles can go.
    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        let category = self.find(id, "Category not found").await?;

        if self.categories.count_children(id).await? > 0 {
            return Err(AppError::BadRequest(
                "Category has child categories and cannot be deleted".to_string(),
            ));
        }
        if category.article_count > 0 {
            return Err(AppError::BadRequest(
                "Category has articles and cannot be deleted".to_string(),
            ));
        }

        self.categories.delete(id).await?;
        tracing::info!("Category {} deleted", id);
        Ok(())
    }

    async fn find(&self, id: i64, missing: &str) -> Result<Category, AppError> {
        self.categories
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(missing.to_string()))
    }

    /// Single category with its parent and direct children.
    async fn detail(&self, category: Category) -> Result<CategoryResponse, AppError> {
        let parent = match category.parent_id {
            Some(parent_id) => self
                .categories
                .find_by_id(parent_id)
                .await?
                .map(|p| CategorySummary {
                    id: p.id,
                    name: p.name,
                    slug: p.slug,
                }),
            None => None,
        };
        let children = self.categories.list_children(&[category.id], false).await?;

        Ok(CategoryResponse {
            parent,
            children: children.iter().map(CategoryResponse::from).collect(),
            ..CategoryResponse::from(&category)
        })
    }
}
