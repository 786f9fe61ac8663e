//! Persistence layer.
//!
//! One trait per entity. `postgres` is the production implementation;
//! `memory` keeps everything in-process for local runs and tests. Every
//! method is atomic on its own: operations that touch a row and a counter
//! (comment create/delete, like toggle) do both or neither.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;

use crate::{
    error::AppError,
    models::{
        article::{Article, ArticleChanges, ArticleFilter, NewArticle},
        article_image::ArticleImage,
        category::{Category, CategoryChanges, CategorySummary, NewCategory},
        comment::{Comment, NewComment},
        like::TargetType,
        tag::{NewTag, Tag, TagChanges, TagListParams, TagSummary},
        user::{NewUser, User},
    },
};

pub mod memory;
pub mod postgres;

pub type RepoResult<T> = Result<T, AppError>;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: NewUser) -> RepoResult<User>;
    async fn find_by_id(&self, id: i64) -> RepoResult<Option<User>>;
    async fn find_by_ids(&self, ids: &[i64]) -> RepoResult<Vec<User>>;
    async fn find_by_username(&self, username: &str) -> RepoResult<Option<User>>;
    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>>;
    async fn update_profile(
        &self,
        id: i64,
        nickname: &str,
        avatar_url: &str,
        bio: &str,
    ) -> RepoResult<User>;
    async fn touch_last_login(&self, id: i64) -> RepoResult<()>;
}

#[async_trait]
pub trait ArticleRepository: Send + Sync {
    async fn create(&self, article: NewArticle) -> RepoResult<Article>;
    /// Soft-deleted articles are invisible.
    async fn find_by_id(&self, id: i64) -> RepoResult<Option<Article>>;
    /// Checks every row, soft-deleted ones included, since slugs stay reserved.
    async fn slug_exists(&self, slug: &str, exclude_id: Option<i64>) -> RepoResult<bool>;
    /// Page of matching articles plus the total match count.
    async fn list(&self, filter: &ArticleFilter) -> RepoResult<(Vec<Article>, i64)>;
    async fn update(&self, id: i64, changes: ArticleChanges) -> RepoResult<Article>;
    async fn soft_delete(&self, id: i64) -> RepoResult<()>;
    async fn increment_view_count(&self, id: i64) -> RepoResult<()>;
    /// Clears the article's category links, then links the ids that exist.
    async fn replace_categories(&self, article_id: i64, category_ids: &[i64]) -> RepoResult<()>;
    /// Clears the article's tag links, then links the ids that exist.
    async fn replace_tags(&self, article_id: i64, tag_ids: &[i64]) -> RepoResult<()>;
}

#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn create(&self, category: NewCategory) -> RepoResult<Category>;
    async fn find_by_id(&self, id: i64) -> RepoResult<Option<Category>>;
    async fn find_by_slug(&self, slug: &str) -> RepoResult<Option<Category>>;
    /// Direct children of `parent_id`, or top-level categories when `None`.
    async fn list(&self, parent_id: Option<i64>, is_active: Option<bool>) -> RepoResult<Vec<Category>>;
    async fn list_children(&self, parent_ids: &[i64], active_only: bool) -> RepoResult<Vec<Category>>;
    async fn update(&self, id: i64, changes: CategoryChanges) -> RepoResult<Category>;
    async fn delete(&self, id: i64) -> RepoResult<()>;
    async fn count_children(&self, id: i64) -> RepoResult<i64>;
    async fn summaries_for_articles(
        &self,
        article_ids: &[i64],
    ) -> RepoResult<HashMap<i64, Vec<CategorySummary>>>;
}

#[async_trait]
pub trait TagRepository: Send + Sync {
    async fn create(&self, tag: NewTag) -> RepoResult<Tag>;
    async fn find_by_id(&self, id: i64) -> RepoResult<Option<Tag>>;
    async fn find_by_slug(&self, slug: &str) -> RepoResult<Option<Tag>>;
    async fn find_by_name(&self, name: &str) -> RepoResult<Option<Tag>>;
    async fn list(&self, params: &TagListParams) -> RepoResult<Vec<Tag>>;
    async fn update(&self, id: i64, changes: TagChanges) -> RepoResult<Tag>;
    async fn delete(&self, id: i64) -> RepoResult<()>;
    async fn summaries_for_articles(
        &self,
        article_ids: &[i64],
    ) -> RepoResult<HashMap<i64, Vec<TagSummary>>>;
}

#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Non-deleted comment by id.
    async fn find_by_id(&self, id: i64) -> RepoResult<Option<Comment>>;
    /// Inserts the comment and bumps the parent's `reply_count` (for replies)
    /// and the article's `comment_count`.
    async fn create(&self, comment: NewComment) -> RepoResult<Comment>;
    /// Published top-level comments, newest first, plus their total.
    async fn list_top_level(
        &self,
        article_id: i64,
        offset: i64,
        limit: i64,
    ) -> RepoResult<(Vec<Comment>, i64)>;
    /// Published replies of the given comments, oldest first.
    async fn list_replies(&self, parent_ids: &[i64]) -> RepoResult<Vec<Comment>>;
    async fn update_content(&self, id: i64, content: &str, content_html: &str) -> RepoResult<Comment>;
    /// Soft-deletes the comment (and the replies of a top-level comment),
    /// decrementing counters floored at zero. Returns how many comments went.
    async fn delete(&self, comment: &Comment) -> RepoResult<u64>;
}

#[async_trait]
pub trait LikeRepository: Send + Sync {
    /// Flips the like and adjusts the target's `like_count`. Returns the new
    /// state (`true` = liked).
    async fn toggle(&self, user_id: i64, target: TargetType, target_id: i64) -> RepoResult<bool>;
    async fn is_liked(&self, user_id: i64, target: TargetType, target_id: i64) -> RepoResult<bool>;
    /// Subset of `target_ids` the user has liked.
    async fn liked_ids(
        &self,
        user_id: i64,
        target: TargetType,
        target_ids: &[i64],
    ) -> RepoResult<HashSet<i64>>;
}

#[async_trait]
pub trait ArticleImageRepository: Send + Sync {
    async fn list_by_article(&self, article_id: i64) -> RepoResult<Vec<ArticleImage>>;
    async fn find_by_url(&self, url: &str) -> RepoResult<Option<ArticleImage>>;
    async fn create(&self, article_id: i64, url: &str) -> RepoResult<ArticleImage>;
    async fn soft_delete(&self, id: i64) -> RepoResult<()>;
}

/// The full set of repositories handed to the services.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub articles: Arc<dyn ArticleRepository>,
    pub categories: Arc<dyn CategoryRepository>,
    pub tags: Arc<dyn TagRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub likes: Arc<dyn LikeRepository>,
    pub article_images: Arc<dyn ArticleImageRepository>,
}

impl Repositories {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(postgres::PgUserRepository::new(pool.clone())),
            articles: Arc::new(postgres::PgArticleRepository::new(pool.clone())),
            categories: Arc::new(postgres::PgCategoryRepository::new(pool.clone())),
            tags: Arc::new(postgres::PgTagRepository::new(pool.clone())),
            comments: Arc::new(postgres::PgCommentRepository::new(pool.clone())),
            likes: Arc::new(postgres::PgLikeRepository::new(pool.clone())),
            article_images: Arc::new(postgres::PgArticleImageRepository::new(pool)),
        }
    }

    pub fn in_memory() -> Self {
        let store = memory::MemoryStore::default();
        Self {
            users: Arc::new(store.clone()),
            articles: Arc::new(store.clone()),
            categories: Arc::new(store.clone()),
            tags: Arc::new(store.clone()),
            comments: Arc::new(store.clone()),
            likes: Arc::new(store.clone()),
            article_images: Arc::new(store),
        }
    }
}
