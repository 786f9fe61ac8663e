use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::article::SortOrder;

/// Represents the 'tags' table, plus `article_count` computed from
/// `article_tags` at read time.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct Tag {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub color: String,
    pub article_count: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewTag {
    pub name: String,
    pub slug: String,
    pub description: String,
    pub color: String,
}

#[derive(Debug, Clone)]
pub struct TagChanges {
    pub name: String,
    pub description: String,
    pub color: String,
}

/// Compact form embedded in article payloads.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct TagSummary {
    pub id: i64,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagSort {
    Name,
    #[default]
    ArticleCount,
    CreatedAt,
}

impl TagSort {
    pub fn column(&self) -> &'static str {
        match self {
            TagSort::Name => "name",
            TagSort::ArticleCount => "article_count",
            TagSort::CreatedAt => "created_at",
        }
    }
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct TagListParams {
    pub keyword: Option<String>,
    pub sort: Option<TagSort>,
    pub order: Option<SortOrder>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTagRequest {
    #[validate(length(min = 1, max = 50))]
    pub name: String,
    /// Derived from `name` when absent.
    #[validate(length(min = 1, max = 50))]
    pub slug: Option<String>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[validate(length(max = 20))]
    pub color: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateTagRequest {
    #[validate(length(min = 1, max = 50))]
    pub name: Option<String>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[validate(length(max = 20))]
    pub color: Option<String>,
}
