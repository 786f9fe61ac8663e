use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::validate_url_string;

/// Represents the 'categories' table, plus `article_count` computed from
/// `article_categories` at read time.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub parent_id: Option<i64>,
    pub icon_url: String,
    pub sort_order: i32,
    pub is_active: bool,
    pub article_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewCategory {
    pub name: String,
    pub slug: String,
    pub description: String,
    pub parent_id: Option<i64>,
    pub icon_url: String,
    pub sort_order: i32,
}

#[derive(Debug, Clone)]
pub struct CategoryChanges {
    pub name: String,
    pub description: String,
    pub parent_id: Option<i64>,
    pub icon_url: String,
    pub sort_order: i32,
    pub is_active: bool,
}

/// Compact form embedded in article payloads.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct CategorySummary {
    pub id: i64,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryResponse {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub parent_id: Option<i64>,
    pub icon_url: String,
    pub sort_order: i32,
    pub article_count: i64,
    pub is_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<CategorySummary>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<CategoryResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Category> for CategoryResponse {
    fn from(category: &Category) -> Self {
        Self {
            id: category.id,
            name: category.name.clone(),
            slug: category.slug.clone(),
            description: category.description.clone(),
            parent_id: category.parent_id,
            icon_url: category.icon_url.clone(),
            sort_order: category.sort_order,
            article_count: category.article_count,
            is_active: category.is_active,
            parent: None,
            children: Vec::new(),
            created_at: category.created_at,
            updated_at: category.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCategoryRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    /// Derived from `name` when absent.
    #[validate(length(min = 1, max = 100))]
    pub slug: Option<String>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    pub parent_id: Option<i64>,
    #[validate(length(max = 500), custom(function = validate_url_string))]
    pub icon_url: Option<String>,
    #[serde(default)]
    pub sort_order: i32,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateCategoryRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    /// `0` moves the category back to the top level.
    pub parent_id: Option<i64>,
    #[validate(length(max = 500), custom(function = validate_url_string))]
    pub icon_url: Option<String>,
    pub sort_order: Option<i32>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CategoryListParams {
    pub parent_id: Option<i64>,
    pub is_active: Option<bool>,
    /// Return active top-level categories with their active children.
    #[serde(default)]
    pub tree: bool,
}
