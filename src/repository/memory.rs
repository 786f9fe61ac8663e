//! In-process store implementing every repository trait.
//!
//! All tables sit behind one `tokio::sync::Mutex`, so each trait method runs
//! as a single critical section, the same guarantee the Postgres
//! implementations get from their transactions.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use super::{
    ArticleImageRepository, ArticleRepository, CategoryRepository, CommentRepository,
    LikeRepository, RepoResult, TagRepository, UserRepository,
};
use crate::{
    error::AppError,
    models::{
        article::{Article, ArticleChanges, ArticleFilter, ArticleSort, NewArticle, SortOrder},
        article_image::ArticleImage,
        category::{Category, CategoryChanges, CategorySummary, NewCategory},
        comment::{COMMENT_STATUS_PUBLISHED, Comment, NewComment},
        like::{Like, TargetType},
        tag::{NewTag, Tag, TagChanges, TagListParams, TagSort, TagSummary},
        user::{NewUser, STATUS_ACTIVE, User},
    },
};

fn already_exists() -> AppError {
    AppError::BadRequest("Resource already exists".to_string())
}

#[derive(Default)]
struct Tables {
    next_id: i64,
    users: BTreeMap<i64, User>,
    articles: BTreeMap<i64, Article>,
    categories: BTreeMap<i64, Category>,
    tags: BTreeMap<i64, Tag>,
    article_categories: BTreeSet<(i64, i64)>,
    article_tags: BTreeSet<(i64, i64)>,
    comments: BTreeMap<i64, Comment>,
    likes: BTreeMap<(i64, TargetType, i64), Like>,
    article_images: BTreeMap<i64, ArticleImage>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn is_live_article(&self, id: i64) -> bool {
        self.articles
            .get(&id)
            .is_some_and(|a| a.deleted_at.is_none())
    }

    fn category_with_count(&self, category: &Category) -> Category {
        let count = self
            .article_categories
            .iter()
            .filter(|(article_id, category_id)| {
                *category_id == category.id && self.is_live_article(*article_id)
            })
            .count();
        Category {
            article_count: count as i64,
            ..category.clone()
        }
    }

    fn tag_with_count(&self, tag: &Tag) -> Tag {
        let count = self
            .article_tags
            .iter()
            .filter(|(article_id, tag_id)| *tag_id == tag.id && self.is_live_article(*article_id))
            .count();
        Tag {
            article_count: count as i64,
            ..tag.clone()
        }
    }

    fn matches(&self, article: &Article, filter: &ArticleFilter) -> bool {
        if article.deleted_at.is_some() {
            return false;
        }
        let visible = article.is_published()
            || filter.viewer_id.is_some_and(|viewer| viewer == article.author_id);
        if !visible {
            return false;
        }
        if let Some(status) = filter.status {
            if article.status != status.as_str() {
                return false;
            }
        }
        if let Some(category_id) = filter.category_id {
            if !self.article_categories.contains(&(article.id, category_id)) {
                return false;
            }
        }
        if let Some(tag_id) = filter.tag_id {
            if !self.article_tags.contains(&(article.id, tag_id)) {
                return false;
            }
        }
        if let Some(author_id) = filter.author_id {
            if article.author_id != author_id {
                return false;
            }
        }
        if let Some(keyword) = filter.keyword.as_deref() {
            let keyword = keyword.to_lowercase();
            if !article.title.to_lowercase().contains(&keyword)
                && !article.content.to_lowercase().contains(&keyword)
            {
                return false;
            }
        }
        true
    }

    fn adjust_like_count(&mut self, target: TargetType, target_id: i64, delta: i32) {
        let count = match target {
            TargetType::Article => self.articles.get_mut(&target_id).map(|a| &mut a.like_count),
            TargetType::Comment => self.comments.get_mut(&target_id).map(|c| &mut c.like_count),
        };
        if let Some(count) = count {
            *count = (*count + delta).max(0);
        }
    }
}

/// Orders two articles by the requested column, NULLs last, ties broken by id.
fn compare_articles(a: &Article, b: &Article, sort: ArticleSort, order: SortOrder) -> Ordering {
    let primary = match sort {
        ArticleSort::CreatedAt => Some(a.created_at.cmp(&b.created_at)),
        ArticleSort::UpdatedAt => Some(a.updated_at.cmp(&b.updated_at)),
        ArticleSort::ViewCount => Some(a.view_count.cmp(&b.view_count)),
        ArticleSort::LikeCount => Some(a.like_count.cmp(&b.like_count)),
        ArticleSort::CommentCount => Some(a.comment_count.cmp(&b.comment_count)),
        ArticleSort::PublishedAt => match (a.published_at, b.published_at) {
            (Some(x), Some(y)) => Some(x.cmp(&y)),
            (Some(_), None) => return Ordering::Less,
            (None, Some(_)) => return Ordering::Greater,
            (None, None) => None,
        },
    };
    let ordering = primary
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.id.cmp(&b.id));
    match order {
        SortOrder::Asc => ordering,
        SortOrder::Desc => ordering.reverse(),
    }
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create(&self, user: NewUser) -> RepoResult<User> {
        let mut t = self.tables.lock().await;
        if t.users
            .values()
            .any(|u| u.username == user.username || u.email == user.email)
        {
            return Err(already_exists());
        }
        let now = Utc::now();
        let id = t.next_id();
        let user = User {
            id,
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            nickname: user.nickname,
            avatar_url: String::new(),
            bio: String::new(),
            role: user.role,
            status: STATUS_ACTIVE.to_string(),
            email_verified: false,
            last_login_at: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        t.users.insert(id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: i64) -> RepoResult<Option<User>> {
        let t = self.tables.lock().await;
        Ok(t.users.get(&id).filter(|u| u.deleted_at.is_none()).cloned())
    }

    async fn find_by_ids(&self, ids: &[i64]) -> RepoResult<Vec<User>> {
        let t = self.tables.lock().await;
        Ok(ids.iter().filter_map(|id| t.users.get(id).cloned()).collect())
    }

    async fn find_by_username(&self, username: &str) -> RepoResult<Option<User>> {
        let t = self.tables.lock().await;
        Ok(t.users
            .values()
            .find(|u| u.username == username && u.deleted_at.is_none())
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let t = self.tables.lock().await;
        Ok(t.users
            .values()
            .find(|u| u.email == email && u.deleted_at.is_none())
            .cloned())
    }

    async fn update_profile(
        &self,
        id: i64,
        nickname: &str,
        avatar_url: &str,
        bio: &str,
    ) -> RepoResult<User> {
        let mut t = self.tables.lock().await;
        let user = t
            .users
            .get_mut(&id)
            .filter(|u| u.deleted_at.is_none())
            .ok_or(AppError::NotFound("User not found".to_string()))?;
        user.nickname = nickname.to_string();
        user.avatar_url = avatar_url.to_string();
        user.bio = bio.to_string();
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn touch_last_login(&self, id: i64) -> RepoResult<()> {
        let mut t = self.tables.lock().await;
        if let Some(user) = t.users.get_mut(&id) {
            user.last_login_at = Some(Utc::now());
        }
        Ok(())
    }
}

#[async_trait]
impl ArticleRepository for MemoryStore {
    async fn create(&self, article: NewArticle) -> RepoResult<Article> {
        let mut t = self.tables.lock().await;
        if t.articles.values().any(|a| a.slug == article.slug) {
            return Err(already_exists());
        }
        let now = Utc::now();
        let id = t.next_id();
        let article = Article {
            id,
            title: article.title,
            slug: article.slug,
            content: article.content,
            content_html: article.content_html,
            summary: article.summary,
            cover_image_url: article.cover_image_url,
            author_id: article.author_id,
            editor_id: None,
            status: article.status.as_str().to_string(),
            view_count: 0,
            like_count: 0,
            comment_count: 0,
            edit_count: 0,
            is_featured: false,
            published_at: article.published_at,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        t.articles.insert(id, article.clone());
        Ok(article)
    }

    async fn find_by_id(&self, id: i64) -> RepoResult<Option<Article>> {
        let t = self.tables.lock().await;
        Ok(t.articles.get(&id).filter(|a| a.deleted_at.is_none()).cloned())
    }

    async fn slug_exists(&self, slug: &str, exclude_id: Option<i64>) -> RepoResult<bool> {
        let t = self.tables.lock().await;
        Ok(t.articles
            .values()
            .any(|a| a.slug == slug && Some(a.id) != exclude_id))
    }

    async fn list(&self, filter: &ArticleFilter) -> RepoResult<(Vec<Article>, i64)> {
        let t = self.tables.lock().await;
        let mut matched: Vec<&Article> = t
            .articles
            .values()
            .filter(|a| t.matches(a, filter))
            .collect();
        matched.sort_by(|a, b| compare_articles(a, b, filter.sort, filter.order));

        let total = matched.len() as i64;
        let page = matched
            .into_iter()
            .skip(filter.offset.max(0) as usize)
            .take(filter.limit.max(0) as usize)
            .cloned()
            .collect();
        Ok((page, total))
    }

    async fn update(&self, id: i64, changes: ArticleChanges) -> RepoResult<Article> {
        let mut t = self.tables.lock().await;
        if t.articles
            .values()
            .any(|a| a.slug == changes.slug && a.id != id)
        {
            return Err(already_exists());
        }
        let article = t
            .articles
            .get_mut(&id)
            .filter(|a| a.deleted_at.is_none())
            .ok_or(AppError::NotFound("Article not found".to_string()))?;
        article.title = changes.title;
        article.slug = changes.slug;
        article.content = changes.content;
        article.content_html = changes.content_html;
        article.summary = changes.summary;
        article.cover_image_url = changes.cover_image_url;
        article.status = changes.status;
        article.editor_id = Some(changes.editor_id);
        article.published_at = changes.published_at;
        article.edit_count += 1;
        article.updated_at = Utc::now();
        Ok(article.clone())
    }

    async fn soft_delete(&self, id: i64) -> RepoResult<()> {
        let mut t = self.tables.lock().await;
        if let Some(article) = t.articles.get_mut(&id).filter(|a| a.deleted_at.is_none()) {
            article.deleted_at = Some(Utc::now());
        }
        Ok(())
    }

    async fn increment_view_count(&self, id: i64) -> RepoResult<()> {
        let mut t = self.tables.lock().await;
        if let Some(article) = t.articles.get_mut(&id) {
            article.view_count += 1;
        }
        Ok(())
    }

    async fn replace_categories(&self, article_id: i64, category_ids: &[i64]) -> RepoResult<()> {
        let mut t = self.tables.lock().await;
        t.article_categories.retain(|(a, _)| *a != article_id);
        for category_id in category_ids {
            if t.categories.contains_key(category_id) {
                t.article_categories.insert((article_id, *category_id));
            }
        }
        Ok(())
    }

    async fn replace_tags(&self, article_id: i64, tag_ids: &[i64]) -> RepoResult<()> {
        let mut t = self.tables.lock().await;
        t.article_tags.retain(|(a, _)| *a != article_id);
        for tag_id in tag_ids {
            if t.tags.contains_key(tag_id) {
                t.article_tags.insert((article_id, *tag_id));
            }
        }
        Ok(())
    }
}

fn sort_categories(categories: &mut [Category]) {
    categories.sort_by(|a, b| {
        a.sort_order
            .cmp(&b.sort_order)
            .then(a.created_at.cmp(&b.created_at))
            .then(a.id.cmp(&b.id))
    });
}

#[async_trait]
impl CategoryRepository for MemoryStore {
    async fn create(&self, category: NewCategory) -> RepoResult<Category> {
        let mut t = self.tables.lock().await;
        if t.categories.values().any(|c| c.slug == category.slug) {
            return Err(already_exists());
        }
        let now = Utc::now();
        let id = t.next_id();
        let category = Category {
            id,
            name: category.name,
            slug: category.slug,
            description: category.description,
            parent_id: category.parent_id,
            icon_url: category.icon_url,
            sort_order: category.sort_order,
            is_active: true,
            article_count: 0,
            created_at: now,
            updated_at: now,
        };
        t.categories.insert(id, category.clone());
        Ok(category)
    }

    async fn find_by_id(&self, id: i64) -> RepoResult<Option<Category>> {
        let t = self.tables.lock().await;
        Ok(t.categories.get(&id).map(|c| t.category_with_count(c)))
    }

    async fn find_by_slug(&self, slug: &str) -> RepoResult<Option<Category>> {
        let t = self.tables.lock().await;
        Ok(t.categories
            .values()
            .find(|c| c.slug == slug)
            .map(|c| t.category_with_count(c)))
    }

    async fn list(&self, parent_id: Option<i64>, is_active: Option<bool>) -> RepoResult<Vec<Category>> {
        let t = self.tables.lock().await;
        let mut categories: Vec<Category> = t
            .categories
            .values()
            .filter(|c| c.parent_id == parent_id)
            .filter(|c| is_active.is_none_or(|active| c.is_active == active))
            .map(|c| t.category_with_count(c))
            .collect();
        sort_categories(&mut categories);
        Ok(categories)
    }

    async fn list_children(&self, parent_ids: &[i64], active_only: bool) -> RepoResult<Vec<Category>> {
        let t = self.tables.lock().await;
        let mut categories: Vec<Category> = t
            .categories
            .values()
            .filter(|c| c.parent_id.is_some_and(|p| parent_ids.contains(&p)))
            .filter(|c| !active_only || c.is_active)
            .map(|c| t.category_with_count(c))
            .collect();
        sort_categories(&mut categories);
        Ok(categories)
    }

    async fn update(&self, id: i64, changes: CategoryChanges) -> RepoResult<Category> {
        let mut t = self.tables.lock().await;
        let category = t
            .categories
            .get_mut(&id)
            .ok_or(AppError::NotFound("Category not found".to_string()))?;
        category.name = changes.name;
        category.description = changes.description;
        category.parent_id = changes.parent_id;
        category.icon_url = changes.icon_url;
        category.sort_order = changes.sort_order;
        category.is_active = changes.is_active;
        category.updated_at = Utc::now();
        let category = category.clone();
        Ok(t.category_with_count(&category))
    }

    async fn delete(&self, id: i64) -> RepoResult<()> {
        let mut t = self.tables.lock().await;
        t.categories.remove(&id);
        t.article_categories.retain(|(_, c)| *c != id);
        Ok(())
    }

    async fn count_children(&self, id: i64) -> RepoResult<i64> {
        let t = self.tables.lock().await;
        Ok(t.categories
            .values()
            .filter(|c| c.parent_id == Some(id))
            .count() as i64)
    }

    async fn summaries_for_articles(
        &self,
        article_ids: &[i64],
    ) -> RepoResult<HashMap<i64, Vec<CategorySummary>>> {
        let t = self.tables.lock().await;
        let mut grouped: HashMap<i64, Vec<Category>> = HashMap::new();
        for (article_id, category_id) in &t.article_categories {
            if !article_ids.contains(article_id) {
                continue;
            }
            if let Some(category) = t.categories.get(category_id) {
                grouped.entry(*article_id).or_default().push(category.clone());
            }
        }
        Ok(grouped
            .into_iter()
            .map(|(article_id, mut categories)| {
                sort_categories(&mut categories);
                let summaries = categories
                    .into_iter()
                    .map(|c| CategorySummary {
                        id: c.id,
                        name: c.name,
                        slug: c.slug,
                    })
                    .collect();
                (article_id, summaries)
            })
            .collect())
    }
}

#[async_trait]
impl TagRepository for MemoryStore {
    async fn create(&self, tag: NewTag) -> RepoResult<Tag> {
        let mut t = self.tables.lock().await;
        if t.tags
            .values()
            .any(|existing| existing.slug == tag.slug || existing.name == tag.name)
        {
            return Err(already_exists());
        }
        let id = t.next_id();
        let tag = Tag {
            id,
            name: tag.name,
            slug: tag.slug,
            description: tag.description,
            color: tag.color,
            article_count: 0,
            created_at: Utc::now(),
        };
        t.tags.insert(id, tag.clone());
        Ok(tag)
    }

    async fn find_by_id(&self, id: i64) -> RepoResult<Option<Tag>> {
        let t = self.tables.lock().await;
        Ok(t.tags.get(&id).map(|tag| t.tag_with_count(tag)))
    }

    async fn find_by_slug(&self, slug: &str) -> RepoResult<Option<Tag>> {
        let t = self.tables.lock().await;
        Ok(t.tags
            .values()
            .find(|tag| tag.slug == slug)
            .map(|tag| t.tag_with_count(tag)))
    }

    async fn find_by_name(&self, name: &str) -> RepoResult<Option<Tag>> {
        let t = self.tables.lock().await;
        Ok(t.tags
            .values()
            .find(|tag| tag.name == name)
            .map(|tag| t.tag_with_count(tag)))
    }

    async fn list(&self, params: &TagListParams) -> RepoResult<Vec<Tag>> {
        let t = self.tables.lock().await;
        let keyword = params
            .keyword
            .as_deref()
            .filter(|k| !k.is_empty())
            .map(str::to_lowercase);

        let mut tags: Vec<Tag> = t
            .tags
            .values()
            .filter(|tag| {
                keyword.as_ref().is_none_or(|k| {
                    tag.name.to_lowercase().contains(k) || tag.description.to_lowercase().contains(k)
                })
            })
            .map(|tag| t.tag_with_count(tag))
            .collect();

        let sort = params.sort.unwrap_or_default();
        let order = params.order.unwrap_or_default();
        tags.sort_by(|a, b| {
            let primary = match sort {
                TagSort::Name => a.name.cmp(&b.name),
                TagSort::ArticleCount => a.article_count.cmp(&b.article_count),
                TagSort::CreatedAt => a.created_at.cmp(&b.created_at),
            };
            let primary = match order {
                SortOrder::Asc => primary,
                SortOrder::Desc => primary.reverse(),
            };
            primary.then(a.id.cmp(&b.id))
        });

        if let Some(limit) = params.limit.filter(|l| *l > 0) {
            tags.truncate(limit as usize);
        }
        Ok(tags)
    }

    async fn update(&self, id: i64, changes: TagChanges) -> RepoResult<Tag> {
        let mut t = self.tables.lock().await;
        if t.tags
            .values()
            .any(|tag| tag.name == changes.name && tag.id != id)
        {
            return Err(already_exists());
        }
        let tag = t
            .tags
            .get_mut(&id)
            .ok_or(AppError::NotFound("Tag not found".to_string()))?;
        tag.name = changes.name;
        tag.description = changes.description;
        tag.color = changes.color;
        let tag = tag.clone();
        Ok(t.tag_with_count(&tag))
    }

    async fn delete(&self, id: i64) -> RepoResult<()> {
        let mut t = self.tables.lock().await;
        t.tags.remove(&id);
        t.article_tags.retain(|(_, tag_id)| *tag_id != id);
        Ok(())
    }

    async fn summaries_for_articles(
        &self,
        article_ids: &[i64],
    ) -> RepoResult<HashMap<i64, Vec<TagSummary>>> {
        let t = self.tables.lock().await;
        let mut grouped: HashMap<i64, Vec<TagSummary>> = HashMap::new();
        for (article_id, tag_id) in &t.article_tags {
            if !article_ids.contains(article_id) {
                continue;
            }
            if let Some(tag) = t.tags.get(tag_id) {
                grouped.entry(*article_id).or_default().push(TagSummary {
                    id: tag.id,
                    name: tag.name.clone(),
                    slug: tag.slug.clone(),
                });
            }
        }
        for summaries in grouped.values_mut() {
            summaries.sort_by(|a, b| a.name.cmp(&b.name));
        }
        Ok(grouped)
    }
}

fn is_visible_comment(comment: &Comment) -> bool {
    comment.deleted_at.is_none() && comment.status == COMMENT_STATUS_PUBLISHED
}

#[async_trait]
impl CommentRepository for MemoryStore {
    async fn find_by_id(&self, id: i64) -> RepoResult<Option<Comment>> {
        let t = self.tables.lock().await;
        Ok(t.comments.get(&id).filter(|c| c.deleted_at.is_none()).cloned())
    }

    async fn create(&self, comment: NewComment) -> RepoResult<Comment> {
        let mut t = self.tables.lock().await;
        let now = Utc::now();
        let id = t.next_id();
        let created = Comment {
            id,
            article_id: comment.article_id,
            user_id: comment.user_id,
            parent_id: comment.parent_id,
            content: comment.content,
            content_html: comment.content_html,
            like_count: 0,
            reply_count: 0,
            status: COMMENT_STATUS_PUBLISHED.to_string(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        t.comments.insert(id, created.clone());

        if let Some(parent) = created.parent_id.and_then(|p| t.comments.get_mut(&p)) {
            parent.reply_count += 1;
        }
        if let Some(article) = t.articles.get_mut(&created.article_id) {
            article.comment_count += 1;
        }
        Ok(created)
    }

    async fn list_top_level(
        &self,
        article_id: i64,
        offset: i64,
        limit: i64,
    ) -> RepoResult<(Vec<Comment>, i64)> {
        let t = self.tables.lock().await;
        // Ids grow with insertion time, so reverse id order is newest first.
        let matched: Vec<&Comment> = t
            .comments
            .values()
            .rev()
            .filter(|c| c.article_id == article_id && c.parent_id.is_none() && is_visible_comment(c))
            .collect();
        let total = matched.len() as i64;
        let page = matched
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .cloned()
            .collect();
        Ok((page, total))
    }

    async fn list_replies(&self, parent_ids: &[i64]) -> RepoResult<Vec<Comment>> {
        let t = self.tables.lock().await;
        Ok(t.comments
            .values()
            .filter(|c| c.parent_id.is_some_and(|p| parent_ids.contains(&p)) && is_visible_comment(c))
            .cloned()
            .collect())
    }

    async fn update_content(&self, id: i64, content: &str, content_html: &str) -> RepoResult<Comment> {
        let mut t = self.tables.lock().await;
        let comment = t
            .comments
            .get_mut(&id)
            .filter(|c| c.deleted_at.is_none())
            .ok_or(AppError::NotFound("Comment not found".to_string()))?;
        comment.content = content.to_string();
        comment.content_html = content_html.to_string();
        comment.updated_at = Utc::now();
        Ok(comment.clone())
    }

    async fn delete(&self, comment: &Comment) -> RepoResult<u64> {
        let mut t = self.tables.lock().await;
        let now = Utc::now();

        match t.comments.get_mut(&comment.id) {
            Some(target) if target.deleted_at.is_none() => target.deleted_at = Some(now),
            _ => return Ok(0),
        }
        let mut removed: u64 = 1;

        match comment.parent_id {
            None => {
                for reply in t.comments.values_mut() {
                    if reply.parent_id == Some(comment.id) && reply.deleted_at.is_none() {
                        reply.deleted_at = Some(now);
                        removed += 1;
                    }
                }
            }
            Some(parent_id) => {
                if let Some(parent) = t.comments.get_mut(&parent_id) {
                    parent.reply_count = (parent.reply_count - 1).max(0);
                }
            }
        }

        if let Some(article) = t.articles.get_mut(&comment.article_id) {
            let removed = i32::try_from(removed).unwrap_or(i32::MAX);
            article.comment_count = (article.comment_count - removed).max(0);
        }
        Ok(removed)
    }
}

#[async_trait]
impl LikeRepository for MemoryStore {
    async fn toggle(&self, user_id: i64, target: TargetType, target_id: i64) -> RepoResult<bool> {
        let mut t = self.tables.lock().await;
        let key = (user_id, target, target_id);
        if t.likes.remove(&key).is_some() {
            t.adjust_like_count(target, target_id, -1);
            return Ok(false);
        }
        let id = t.next_id();
        t.likes.insert(
            key,
            Like {
                id,
                user_id,
                target_type: target.as_str().to_string(),
                target_id,
                created_at: Utc::now(),
            },
        );
        t.adjust_like_count(target, target_id, 1);
        Ok(true)
    }

    async fn is_liked(&self, user_id: i64, target: TargetType, target_id: i64) -> RepoResult<bool> {
        let t = self.tables.lock().await;
        Ok(t.likes.contains_key(&(user_id, target, target_id)))
    }

    async fn liked_ids(
        &self,
        user_id: i64,
        target: TargetType,
        target_ids: &[i64],
    ) -> RepoResult<HashSet<i64>> {
        let t = self.tables.lock().await;
        Ok(target_ids
            .iter()
            .copied()
            .filter(|id| t.likes.contains_key(&(user_id, target, *id)))
            .collect())
    }
}

#[async_trait]
impl ArticleImageRepository for MemoryStore {
    async fn list_by_article(&self, article_id: i64) -> RepoResult<Vec<ArticleImage>> {
        let t = self.tables.lock().await;
        Ok(t.article_images
            .values()
            .filter(|i| i.article_id == article_id && i.deleted_at.is_none())
            .cloned()
            .collect())
    }

    async fn find_by_url(&self, url: &str) -> RepoResult<Option<ArticleImage>> {
        let t = self.tables.lock().await;
        Ok(t.article_images
            .values()
            .find(|i| i.image_url == url && i.deleted_at.is_none())
            .cloned())
    }

    async fn create(&self, article_id: i64, url: &str) -> RepoResult<ArticleImage> {
        let mut t = self.tables.lock().await;
        let id = t.next_id();
        let image = ArticleImage {
            id,
            article_id,
            image_url: url.to_string(),
            created_at: Utc::now(),
            deleted_at: None,
        };
        t.article_images.insert(id, image.clone());
        Ok(image)
    }

    async fn soft_delete(&self, id: i64) -> RepoResult<()> {
        let mut t = self.tables.lock().await;
        if let Some(image) = t.article_images.get_mut(&id) {
            image.deleted_at = Some(Utc::now());
        }
        Ok(())
    }
}
