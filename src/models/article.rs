use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::{category::CategorySummary, tag::TagSummary, user::UserResponse, validate_url_string};

/// Lifecycle of an article.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArticleStatus {
    Draft,
    Published,
    Archived,
}

impl ArticleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArticleStatus::Draft => "draft",
            ArticleStatus::Published => "published",
            ArticleStatus::Archived => "archived",
        }
    }
}

/// Represents the 'articles' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Article {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub content_html: String,
    pub summary: String,
    pub cover_image_url: String,
    pub author_id: i64,
    pub editor_id: Option<i64>,
    pub status: String,

    pub view_count: i32,
    pub like_count: i32,
    pub comment_count: i32,
    pub edit_count: i32,

    pub is_featured: bool,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Article {
    pub fn is_published(&self) -> bool {
        self.status == ArticleStatus::Published.as_str()
    }
}

/// Insert payload for the article repository.
#[derive(Debug, Clone)]
pub struct NewArticle {
    pub title: String,
    pub slug: String,
    pub content: String,
    pub content_html: String,
    pub summary: String,
    pub cover_image_url: String,
    pub author_id: i64,
    pub status: ArticleStatus,
    pub published_at: Option<DateTime<Utc>>,
}

/// Full replacement of the mutable article columns.
#[derive(Debug, Clone)]
pub struct ArticleChanges {
    pub title: String,
    pub slug: String,
    pub content: String,
    pub content_html: String,
    pub summary: String,
    pub cover_image_url: String,
    pub status: String,
    pub editor_id: i64,
    pub published_at: Option<DateTime<Utc>>,
}

/// Sort column for article lists. Only these names reach SQL.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArticleSort {
    #[default]
    CreatedAt,
    UpdatedAt,
    PublishedAt,
    ViewCount,
    LikeCount,
    CommentCount,
}

impl ArticleSort {
    pub fn column(&self) -> &'static str {
        match self {
            ArticleSort::CreatedAt => "created_at",
            ArticleSort::UpdatedAt => "updated_at",
            ArticleSort::PublishedAt => "published_at",
            ArticleSort::ViewCount => "view_count",
            ArticleSort::LikeCount => "like_count",
            ArticleSort::CommentCount => "comment_count",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn keyword(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Query parameters for listing articles.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ArticleListParams {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    pub category_id: Option<i64>,
    pub tag_id: Option<i64>,
    pub author_id: Option<i64>,
    pub status: Option<ArticleStatus>,
    /// Case-insensitive match against title and content.
    pub keyword: Option<String>,
    pub sort: Option<ArticleSort>,
    pub order: Option<SortOrder>,
}

/// Repository-level filter, built by the service from the params and viewer.
#[derive(Debug, Clone, Default)]
pub struct ArticleFilter {
    pub category_id: Option<i64>,
    pub tag_id: Option<i64>,
    pub author_id: Option<i64>,
    pub status: Option<ArticleStatus>,
    pub keyword: Option<String>,
    /// `None` limits the list to published articles; `Some(id)` also admits
    /// that user's unpublished ones.
    pub viewer_id: Option<i64>,
    pub sort: ArticleSort,
    pub order: SortOrder,
    pub offset: i64,
    pub limit: i64,
}

/// DTO for creating a new article.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateArticleRequest {
    #[validate(length(
        min = 1,
        max = 500,
        message = "Title length must be between 1 and 500 chars"
    ))]
    pub title: String,

    #[validate(length(min = 1, message = "Content must not be empty"))]
    pub content: String,

    #[validate(length(max = 2000))]
    pub summary: Option<String>,

    #[validate(length(max = 500), custom(function = validate_url_string))]
    pub cover_image_url: Option<String>,

    #[serde(default)]
    pub category_ids: Vec<i64>,

    #[serde(default)]
    pub tag_ids: Vec<i64>,

    /// `draft` (default) or `published`.
    pub status: Option<ArticleStatus>,
}

/// DTO for updating an article. Absent fields are left untouched; a present
/// `category_ids`/`tag_ids` (even empty) replaces the whole association.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateArticleRequest {
    #[validate(length(min = 1, max = 500))]
    pub title: Option<String>,
    #[validate(length(min = 1))]
    pub content: Option<String>,
    #[validate(length(max = 2000))]
    pub summary: Option<String>,
    #[validate(length(max = 500), custom(function = validate_url_string))]
    pub cover_image_url: Option<String>,
    pub category_ids: Option<Vec<i64>>,
    pub tag_ids: Option<Vec<i64>>,
    pub status: Option<ArticleStatus>,
}

/// Article as returned by the API, with author, editor and associations.
#[derive(Debug, Clone, Serialize)]
pub struct ArticleResponse {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub content_html: String,
    pub summary: String,
    pub cover_image_url: String,
    pub author: UserResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub editor: Option<UserResponse>,
    pub categories: Vec<CategorySummary>,
    pub tags: Vec<TagSummary>,
    pub view_count: i32,
    pub like_count: i32,
    pub comment_count: i32,
    pub edit_count: i32,
    pub is_featured: bool,
    pub is_liked: bool,
    pub status: String,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
