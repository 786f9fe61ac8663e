use std::collections::{HashMap, HashSet};

use super::{load_users, user_from};
use crate::{
    error::AppError,
    models::{
        comment::{Comment, CommentResponse, CreateCommentRequest, NewComment, UpdateCommentRequest},
        common::{PageParams, Paginated, Pagination, page_offset},
        like::TargetType,
        user::UserResponse,
    },
    repository::Repositories,
    utils::html::escape_with_line_breaks,
};

#[derive(Clone)]
pub struct CommentService {
    repos: Repositories,
}

fn to_response(
    comment: Comment,
    users: &HashMap<i64, UserResponse>,
    liked: &HashSet<i64>,
    replies: Vec<CommentResponse>,
) -> Result<CommentResponse, AppError> {
    Ok(CommentResponse {
        user: user_from(users, comment.user_id)?,
        is_liked: liked.contains(&comment.id),
        replies,
        id: comment.id,
        article_id: comment.article_id,
        content: comment.content,
        content_html: comment.content_html,
        parent_id: comment.parent_id,
        like_count: comment.like_count,
        reply_count: comment.reply_count,
        status: comment.status,
        created_at: comment.created_at,
        updated_at: comment.updated_at,
    })
}

impl CommentService {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    /// Posts a comment. A reply to a reply is attached to the top-level
    /// comment of that thread, so threads stay one level deep.
    pub async fn create(
        &self,
        article_id: i64,
        author_id: i64,
        req: CreateCommentRequest,
    ) -> Result<CommentResponse, AppError> {
        self.repos
            .articles
            .find_by_id(article_id)
            .await?
            .ok_or(AppError::NotFound("Article not found".to_string()))?;

        let parent_id = match req.parent_id.filter(|id| *id > 0) {
            Some(parent_id) => {
                let parent = self
                    .repos
                    .comments
                    .find_by_id(parent_id)
                    .await?
                    .ok_or(AppError::NotFound("Parent comment not found".to_string()))?;
                if parent.article_id != article_id {
                    return Err(AppError::BadRequest(
                        "Parent comment belongs to a different article".to_string(),
                    ));
                }
                Some(parent.parent_id.unwrap_or(parent.id))
            }
            None => None,
        };

        let comment = self
            .repos
            .comments
            .create(NewComment {
                article_id,
                user_id: author_id,
                parent_id,
                content_html: escape_with_line_breaks(&req.content),
                content: req.content,
            })
            .await?;

        tracing::info!("Comment {} posted on article {} by user {}", comment.id, article_id, author_id);

        let users = load_users(self.repos.users.as_ref(), [author_id]).await?;
        to_response(comment, &users, &HashSet::new(), Vec::new())
    }

    /// Top-level comments newest first, each carrying its replies oldest first.
    /// `total` counts top-level comments only.
    pub async fn list_by_article(
        &self,
        article_id: i64,
        page: PageParams,
        viewer_id: Option<i64>,
    ) -> Result<Paginated<CommentResponse>, AppError> {
        self.repos
            .articles
            .find_by_id(article_id)
            .await?
            .ok_or(AppError::NotFound("Article not found".to_string()))?;

        let (page, page_size) = page.normalize();
        let (top_level, total) = self
            .repos
            .comments
            .list_top_level(article_id, page_offset(page, page_size), page_size)
            .await?;

        let top_ids: Vec<i64> = top_level.iter().map(|c| c.id).collect();
        let replies = self.repos.comments.list_replies(&top_ids).await?;

        let users = load_users(
            self.repos.users.as_ref(),
            top_level.iter().chain(&replies).map(|c| c.user_id),
        )
        .await?;
        let liked = match viewer_id {
            Some(user_id) => {
                let ids: Vec<i64> = top_level.iter().chain(&replies).map(|c| c.id).collect();
                self.repos
                    .likes
                    .liked_ids(user_id, TargetType::Comment, &ids)
                    .await?
            }
            None => HashSet::new(),
        };

        let mut replies_by_parent: HashMap<i64, Vec<CommentResponse>> = HashMap::new();
        for reply in replies {
            let Some(parent_id) = reply.parent_id else {
                continue;
            };
            let reply = to_response(reply, &users, &liked, Vec::new())?;
            replies_by_parent.entry(parent_id).or_default().push(reply);
        }

        let items = top_level
            .into_iter()
            .map(|comment| {
                let replies = replies_by_parent.remove(&comment.id).unwrap_or_default();
                to_response(comment, &users, &liked, replies)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Paginated {
            items,
            pagination: Pagination::new(page, page_size, total),
        })
    }

    pub async fn update(
        &self,
        id: i64,
        requester_id: i64,
        req: UpdateCommentRequest,
    ) -> Result<CommentResponse, AppError> {
        self.owned_comment(id, requester_id, "modify").await?;

        let html = escape_with_line_breaks(&req.content);
        let updated = self
            .repos
            .comments
            .update_content(id, &req.content, &html)
            .await?;

        let liked = self
            .repos
            .likes
            .liked_ids(requester_id, TargetType::Comment, &[id])
            .await?;
        let users = load_users(self.repos.users.as_ref(), [updated.user_id]).await?;
        to_response(updated, &users, &liked, Vec::new())
    }

    /// Removes the comment and, for a top-level comment, its replies.
    pub async fn delete(&self, id: i64, requester_id: i64) -> Result<(), AppError> {
        let comment = self.owned_comment(id, requester_id, "delete").await?;
        let removed = self.repos.comments.delete(&comment).await?;
        tracing::info!("Comment {} deleted by user {} ({} removed)", id, requester_id, removed);
        Ok(())
    }

    async fn owned_comment(&self, id: i64, requester_id: i64, action: &str) -> Result<Comment, AppError> {
        let comment = self
            .repos
            .comments
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound("Comment not found".to_string()))?;

        if comment.user_id != requester_id {
            return Err(AppError::Forbidden(format!(
                "You do not have permission to {} this comment",
                action
            )));
        }
        Ok(comment)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{register, services};
    use super::*;
    use crate::models::article::{ArticleStatus, CreateArticleRequest};
    use crate::services::Services;

    async fn article(services: &Services, author: i64) -> i64 {
        services
            .articles
            .create(
                author,
                CreateArticleRequest {
                    title: "Hello World".to_string(),
                    content: "body".to_string(),
                    summary: None,
                    cover_image_url: None,
                    category_ids: Vec::new(),
                    tag_ids: Vec::new(),
                    status: Some(ArticleStatus::Published),
                },
            )
            .await
            .unwrap()
            .id
    }

    fn comment(content: &str, parent_id: Option<i64>) -> CreateCommentRequest {
        CreateCommentRequest {
            content: content.to_string(),
            parent_id,
        }
    }

    async fn comment_count(services: &Services, article_id: i64) -> i32 {
        services
            .comments
            .repos
            .articles
            .find_by_id(article_id)
            .await
            .unwrap()
            .unwrap()
            .comment_count
    }

    #[tokio::test]
    async fn reply_updates_both_counters() {
        let services = services();
        let alice = register(&services, "alice").await;
        let article_id = article(&services, alice).await;

        let top = services.comments.create(article_id, alice, comment("Nice!", None)).await.unwrap();
        assert_eq!(top.reply_count, 0);
        assert_eq!(top.content_html, "Nice!");
        assert_eq!(comment_count(&services, article_id).await, 1);

        services
            .comments
            .create(article_id, alice, comment("Thanks\n<3", Some(top.id)))
            .await
            .unwrap();
        assert_eq!(comment_count(&services, article_id).await, 2);

        let listed = services
            .comments
            .list_by_article(article_id, PageParams::default(), None)
            .await
            .unwrap();
        assert_eq!(listed.pagination.total, 1);
        assert_eq!(listed.items[0].reply_count, 1);
        assert_eq!(listed.items[0].replies[0].content_html, "Thanks<br>&lt;3");
    }

    #[tokio::test]
    async fn reply_to_a_reply_joins_the_top_level_thread() {
        let services = services();
        let alice = register(&services, "alice").await;
        let article_id = article(&services, alice).await;

        let top = services.comments.create(article_id, alice, comment("a", None)).await.unwrap();
        let reply = services.comments.create(article_id, alice, comment("b", Some(top.id))).await.unwrap();
        let nested = services.comments.create(article_id, alice, comment("c", Some(reply.id))).await.unwrap();
        assert_eq!(nested.parent_id, Some(top.id));

        let listed = services
            .comments
            .list_by_article(article_id, PageParams::default(), None)
            .await
            .unwrap();
        let contents: Vec<&str> = listed.items[0].replies.iter().map(|r| r.content.as_str()).collect();
        assert_eq!(contents, vec!["b", "c"]);
    }

    #[tokio::test]
    async fn parent_must_exist_on_the_same_article() {
        let services = services();
        let alice = register(&services, "alice").await;
        let first = article(&services, alice).await;
        let second = article(&services, alice).await;

        let top = services.comments.create(first, alice, comment("a", None)).await.unwrap();
        assert!(matches!(
            services.comments.create(second, alice, comment("b", Some(top.id))).await,
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            services.comments.create(first, alice, comment("b", Some(424242))).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            services.comments.create(424242, alice, comment("b", None)).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn list_orders_newest_top_level_first() {
        let services = services();
        let alice = register(&services, "alice").await;
        let article_id = article(&services, alice).await;
        for content in ["first", "second", "third"] {
            services.comments.create(article_id, alice, comment(content, None)).await.unwrap();
        }

        let listed = services
            .comments
            .list_by_article(
                article_id,
                PageParams {
                    page: Some(1),
                    page_size: Some(2),
                },
                None,
            )
            .await
            .unwrap();
        assert_eq!(listed.pagination.total, 3);
        assert_eq!(listed.items[0].content, "third");
        assert_eq!(listed.items[1].content, "second");
    }

    #[tokio::test]
    async fn only_the_author_may_edit_or_delete() {
        let services = services();
        let alice = register(&services, "alice").await;
        let bob = register(&services, "bob").await;
        let article_id = article(&services, alice).await;
        let top = services.comments.create(article_id, alice, comment("a", None)).await.unwrap();

        let edit = || UpdateCommentRequest {
            content: "edited".to_string(),
        };
        assert!(matches!(
            services.comments.update(top.id, bob, edit()).await,
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            services.comments.delete(top.id, bob).await,
            Err(AppError::Forbidden(_))
        ));

        let edited = services.comments.update(top.id, alice, edit()).await.unwrap();
        assert_eq!(edited.content, "edited");
        services.comments.delete(top.id, alice).await.unwrap();
        assert!(matches!(
            services.comments.delete(top.id, alice).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn deleting_a_reply_decrements_counters() {
        let services = services();
        let alice = register(&services, "alice").await;
        let article_id = article(&services, alice).await;
        let top = services.comments.create(article_id, alice, comment("a", None)).await.unwrap();
        let reply = services.comments.create(article_id, alice, comment("b", Some(top.id))).await.unwrap();

        services.comments.delete(reply.id, alice).await.unwrap();
        assert_eq!(comment_count(&services, article_id).await, 1);

        let listed = services
            .comments
            .list_by_article(article_id, PageParams::default(), None)
            .await
            .unwrap();
        assert_eq!(listed.items[0].reply_count, 0);
        assert!(listed.items[0].replies.is_empty());

        services.comments.delete(top.id, alice).await.unwrap();
        assert_eq!(comment_count(&services, article_id).await, 0);
    }
}
