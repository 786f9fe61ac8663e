use std::collections::HashSet;

use chrono::Utc;

use super::{load_users, user_from};
use crate::{
    error::AppError,
    models::{
        article::{
            Article, ArticleChanges, ArticleFilter, ArticleListParams, ArticleResponse,
            ArticleStatus, CreateArticleRequest, NewArticle, UpdateArticleRequest,
        },
        common::{PageParams, Paginated, Pagination, page_offset},
        like::TargetType,
    },
    repository::Repositories,
    utils::{
        html::clean_html,
        images::extract_local_images,
        slug::{slugify_or, with_timestamp_suffix},
    },
};

#[derive(Clone)]
pub struct ArticleService {
    repos: Repositories,
}

impl ArticleService {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    pub async fn create(
        &self,
        author_id: i64,
        req: CreateArticleRequest,
    ) -> Result<ArticleResponse, AppError> {
        let status = req.status.unwrap_or(ArticleStatus::Draft);
        let slug = self.unique_slug(&req.title, None).await?;

        let article = self
            .repos
            .articles
            .create(NewArticle {
                content_html: clean_html(&req.content),
                title: req.title,
                slug,
                content: req.content,
                summary: req.summary.unwrap_or_default(),
                cover_image_url: req.cover_image_url.unwrap_or_default(),
                author_id,
                status,
                published_at: (status == ArticleStatus::Published).then(Utc::now),
            })
            .await?;

        if !req.category_ids.is_empty() {
            self.update_categories(article.id, &req.category_ids).await?;
        }
        if !req.tag_ids.is_empty() {
            self.update_tags(article.id, &req.tag_ids).await?;
        }
        self.sync_images(article.id, &article.content).await?;

        tracing::info!("Article {} created by user {} (slug: {})", article.id, author_id, article.slug);
        self.to_response(article, Some(author_id)).await
    }

    /// Loads an article for display and counts the view. Unpublished articles
    /// are only visible to their author.
    pub async fn get(&self, id: i64, viewer_id: Option<i64>) -> Result<ArticleResponse, AppError> {
        let mut article = self
            .repos
            .articles
            .find_by_id(id)
            .await?
            .filter(|a| a.is_published() || viewer_id == Some(a.author_id))
            .ok_or(AppError::NotFound("Article not found".to_string()))?;

        self.repos.articles.increment_view_count(id).await?;
        article.view_count += 1;

        self.to_response(article, viewer_id).await
    }

    pub async fn list(
        &self,
        params: ArticleListParams,
        viewer_id: Option<i64>,
    ) -> Result<Paginated<ArticleResponse>, AppError> {
        let (page, page_size) = PageParams {
            page: params.page,
            page_size: params.page_size,
        }
        .normalize();

        let filter = ArticleFilter {
            category_id: params.category_id,
            tag_id: params.tag_id,
            author_id: params.author_id,
            status: params.status,
            keyword: params
                .keyword
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty()),
            viewer_id,
            sort: params.sort.unwrap_or_default(),
            order: params.order.unwrap_or_default(),
            offset: page_offset(page, page_size),
            limit: page_size,
        };

        let (articles, total) = self.repos.articles.list(&filter).await?;
        let items = self.to_responses(articles, viewer_id).await?;

        Ok(Paginated {
            items,
            pagination: Pagination::new(page, page_size, total),
        })
    }

    pub async fn update(
        &self,
        id: i64,
        requester_id: i64,
        req: UpdateArticleRequest,
    ) -> Result<ArticleResponse, AppError> {
        let article = self.owned_article(id, requester_id, "modify").await?;

        let slug = match req.title.as_deref() {
            Some(title) => self.unique_slug(title, Some(id)).await?,
            None => article.slug.clone(),
        };
        let content_changed = req.content.is_some();
        let (content, content_html) = match req.content {
            Some(content) => {
                let html = clean_html(&content);
                (content, html)
            }
            None => (article.content, article.content_html),
        };

        let status = req
            .status
            .map(|s| s.as_str().to_string())
            .unwrap_or(article.status);
        let published_at = match article.published_at {
            None if status == ArticleStatus::Published.as_str() => Some(Utc::now()),
            existing => existing,
        };

        let updated = self
            .repos
            .articles
            .update(
                id,
                ArticleChanges {
                    title: req.title.unwrap_or(article.title),
                    slug,
                    content,
                    content_html,
                    summary: req.summary.unwrap_or(article.summary),
                    cover_image_url: req.cover_image_url.unwrap_or(article.cover_image_url),
                    status,
                    editor_id: requester_id,
                    published_at,
                },
            )
            .await?;

        if let Some(category_ids) = req.category_ids {
            self.update_categories(id, &category_ids).await?;
        }
        if let Some(tag_ids) = req.tag_ids {
            self.update_tags(id, &tag_ids).await?;
        }
        if content_changed {
            self.sync_images(id, &updated.content).await?;
        }

        self.to_response(updated, Some(requester_id)).await
    }

    pub async fn delete(&self, id: i64, requester_id: i64) -> Result<(), AppError> {
        self.owned_article(id, requester_id, "delete").await?;
        self.repos.articles.soft_delete(id).await?;
        tracing::info!("Article {} deleted by user {}", id, requester_id);
        Ok(())
    }

    /// Replaces the article's categories. Unknown ids are ignored.
    pub async fn update_categories(&self, article_id: i64, category_ids: &[i64]) -> Result<(), AppError> {
        self.repos
            .articles
            .replace_categories(article_id, category_ids)
            .await
    }

    /// Replaces the article's tags. Unknown ids are ignored.
    pub async fn update_tags(&self, article_id: i64, tag_ids: &[i64]) -> Result<(), AppError> {
        self.repos.articles.replace_tags(article_id, tag_ids).await
    }

    async fn owned_article(&self, id: i64, requester_id: i64, action: &str) -> Result<Article, AppError> {
        let article = self
            .repos
            .articles
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound("Article not found".to_string()))?;

        if article.author_id != requester_id {
            return Err(AppError::Forbidden(format!(
                "You do not have permission to {} this article",
                action
            )));
        }
        Ok(article)
    }

    async fn unique_slug(&self, title: &str, exclude_id: Option<i64>) -> Result<String, AppError> {
        let slug = slugify_or(title, "article");
        if self.repos.articles.slug_exists(&slug, exclude_id).await? {
            return Ok(with_timestamp_suffix(&slug, Utc::now()));
        }
        Ok(slug)
    }

    /// Records newly referenced local images and retires the ones the content
    /// no longer mentions. A URL already tracked for any article is not
    /// recorded twice.
    async fn sync_images(&self, article_id: i64, content: &str) -> Result<(), AppError> {
        let referenced = extract_local_images(content);
        let existing = self.repos.article_images.list_by_article(article_id).await?;
        let existing_urls: HashSet<&str> = existing.iter().map(|i| i.image_url.as_str()).collect();

        for url in &referenced {
            if existing_urls.contains(url.as_str()) {
                continue;
            }
            if self.repos.article_images.find_by_url(url).await?.is_none() {
                self.repos.article_images.create(article_id, url).await?;
            }
        }

        for image in existing.iter().filter(|i| !referenced.contains(&i.image_url)) {
            self.repos.article_images.soft_delete(image.id).await?;
        }
        Ok(())
    }

    async fn to_response(&self, article: Article, viewer_id: Option<i64>) -> Result<ArticleResponse, AppError> {
        self.to_responses(vec![article], viewer_id)
            .await?
            .pop()
            .ok_or_else(|| AppError::InternalServerError("Empty article batch".to_string()))
    }

    /// Attaches authors, associations and the viewer's like state, batching
    /// each lookup across the whole page.
    async fn to_responses(
        &self,
        articles: Vec<Article>,
        viewer_id: Option<i64>,
    ) -> Result<Vec<ArticleResponse>, AppError> {
        let ids: Vec<i64> = articles.iter().map(|a| a.id).collect();
        let users = load_users(
            self.repos.users.as_ref(),
            articles
                .iter()
                .flat_map(|a| std::iter::once(a.author_id).chain(a.editor_id)),
        )
        .await?;
        let mut categories = self.repos.categories.summaries_for_articles(&ids).await?;
        let mut tags = self.repos.tags.summaries_for_articles(&ids).await?;
        let liked = match viewer_id {
            Some(user_id) => {
                self.repos
                    .likes
                    .liked_ids(user_id, TargetType::Article, &ids)
                    .await?
            }
            None => HashSet::new(),
        };

        articles
            .into_iter()
            .map(|a| {
                Ok(ArticleResponse {
                    author: user_from(&users, a.author_id)?,
                    editor: a.editor_id.map(|id| user_from(&users, id)).transpose()?,
                    categories: categories.remove(&a.id).unwrap_or_default(),
                    tags: tags.remove(&a.id).unwrap_or_default(),
                    is_liked: liked.contains(&a.id),
                    id: a.id,
                    title: a.title,
                    slug: a.slug,
                    content: a.content,
                    content_html: a.content_html,
                    summary: a.summary,
                    cover_image_url: a.cover_image_url,
                    view_count: a.view_count,
                    like_count: a.like_count,
                    comment_count: a.comment_count,
                    edit_count: a.edit_count,
                    is_featured: a.is_featured,
                    status: a.status,
                    published_at: a.published_at,
                    created_at: a.created_at,
                    updated_at: a.updated_at,
                })
            })
            .collect()
    }
}
