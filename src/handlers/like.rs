use axum::{
    Extension,
    extract::{Path, State},
    response::IntoResponse,
};

use crate::{
    error::AppError,
    models::{common::ApiResponse, like::TargetType},
    services::LikeService,
    utils::jwt::Claims,
};

/// Toggle like on an article. `data.is_liked` is the state after the call.
pub async fn toggle_article_like(
    State(likes): State<LikeService>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let result = likes.toggle(claims.user_id()?, TargetType::Article, id).await?;
    Ok(ApiResponse::ok(result))
}

/// Toggle like on a comment.
pub async fn toggle_comment_like(
    State(likes): State<LikeService>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let result = likes.toggle(claims.user_id()?, TargetType::Comment, id).await?;
    Ok(ApiResponse::ok(result))
}
