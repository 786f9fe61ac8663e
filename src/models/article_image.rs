use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// An image URL referenced from an article body. Used for bookkeeping of
/// uploaded files; rows are soft-deleted once the article stops using them.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ArticleImage {
    pub id: i64,
    pub article_id: i64,
    pub image_url: String,
    pub created_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}
