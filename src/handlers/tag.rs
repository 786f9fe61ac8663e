use axum::{
    Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        common::ApiResponse,
        tag::{CreateTagRequest, TagListParams, UpdateTagRequest},
    },
    services::TagService,
};

pub async fn list_tags(
    State(tags): State<TagService>,
    Query(params): Query<TagListParams>,
) -> Result<impl IntoResponse, AppError> {
    Ok(ApiResponse::ok(tags.list(params).await?))
}

pub async fn get_tag(
    State(tags): State<TagService>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    Ok(ApiResponse::ok(tags.get_by_id(id).await?))
}

pub async fn get_tag_by_slug(
    State(tags): State<TagService>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    Ok(ApiResponse::ok(tags.get_by_slug(&slug).await?))
}

/// Admin only.
pub async fn create_tag(
    State(tags): State<TagService>,
    Json(payload): Json<CreateTagRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let tag = tags.create(payload).await?;
    Ok(ApiResponse::created(tag, "Tag created"))
}

/// Admin only.
pub async fn update_tag(
    State(tags): State<TagService>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateTagRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let tag = tags.update(id, payload).await?;
    Ok(ApiResponse::ok(tag).with_message("Tag updated"))
}

/// Admin only. Refuses tags still attached to articles.
pub async fn delete_tag(
    State(tags): State<TagService>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    tags.delete(id).await?;
    Ok(ApiResponse::message("Tag deleted"))
}
