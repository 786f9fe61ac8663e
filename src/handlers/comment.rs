use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        comment::{CreateCommentRequest, UpdateCommentRequest},
        common::{ApiResponse, PageParams},
    },
    services::CommentService,
    utils::jwt::{Claims, Viewer},
};

/// Top-level comments of an article with their replies attached.
pub async fn list_comments(
    State(comments): State<CommentService>,
    viewer: Viewer,
    Path(article_id): Path<i64>,
    Query(page): Query<PageParams>,
) -> Result<impl IntoResponse, AppError> {
    let page = comments
        .list_by_article(article_id, page, viewer.user_id())
        .await?;
    Ok(ApiResponse::ok(page))
}

pub async fn create_comment(
    State(comments): State<CommentService>,
    Extension(claims): Extension<Claims>,
    Path(article_id): Path<i64>,
    Json(payload): Json<CreateCommentRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let comment = comments
        .create(article_id, claims.user_id()?, payload)
        .await?;
    Ok(ApiResponse::created(comment, "Comment created"))
}

pub async fn update_comment(
    State(comments): State<CommentService>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateCommentRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let comment = comments.update(id, claims.user_id()?, payload).await?;
    Ok(ApiResponse::ok(comment).with_message("Comment updated"))
}

pub async fn delete_comment(
    State(comments): State<CommentService>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    comments.delete(id, claims.user_id()?).await?;
    Ok(ApiResponse::message("Comment deleted"))
}
