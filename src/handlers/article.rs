use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        article::{ArticleListParams, CreateArticleRequest, UpdateArticleRequest},
        common::ApiResponse,
    },
    services::ArticleService,
    utils::jwt::{Claims, Viewer},
};

/// List articles with filters, sorting and pagination.
/// Anonymous callers only see published articles.
pub async fn list_articles(
    State(articles): State<ArticleService>,
    viewer: Viewer,
    Query(params): Query<ArticleListParams>,
) -> Result<impl IntoResponse, AppError> {
    let page = articles.list(params, viewer.user_id()).await?;
    Ok(ApiResponse::ok(page))
}

/// Get a single article. Counts as a view.
pub async fn get_article(
    State(articles): State<ArticleService>,
    viewer: Viewer,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let article = articles.get(id, viewer.user_id()).await?;
    Ok(ApiResponse::ok(article))
}

pub async fn create_article(
    State(articles): State<ArticleService>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateArticleRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let article = articles.create(claims.user_id()?, payload).await?;
    Ok(ApiResponse::created(article, "Article created"))
}

/// Update an article. Author only.
pub async fn update_article(
    State(articles): State<ArticleService>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateArticleRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let article = articles.update(id, claims.user_id()?, payload).await?;
    Ok(ApiResponse::ok(article).with_message("Article updated"))
}

/// Soft-delete an article. Author only.
pub async fn delete_article(
    State(articles): State<ArticleService>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    articles.delete(id, claims.user_id()?).await?;
    Ok(ApiResponse::message("Article deleted"))
}
