use axum::{
    Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        category::{CategoryListParams, CreateCategoryRequest, UpdateCategoryRequest},
        common::ApiResponse,
    },
    services::CategoryService,
};

/// Public: one level of categories, or the active tree with `?tree=true`.
pub async fn list_categories(
    State(categories): State<CategoryService>,
    Query(params): Query<CategoryListParams>,
) -> Result<impl IntoResponse, AppError> {
    Ok(ApiResponse::ok(categories.list(params).await?))
}

pub async fn get_category(
    State(categories): State<CategoryService>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    Ok(ApiResponse::ok(categories.get_by_id(id).await?))
}

pub async fn get_category_by_slug(
    State(categories): State<CategoryService>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    Ok(ApiResponse::ok(categories.get_by_slug(&slug).await?))
}

/// Admin only.
pub async fn create_category(
    State(categories): State<CategoryService>,
    Json(payload): Json<CreateCategoryRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let category = categories.create(payload).await?;
    Ok(ApiResponse::created(category, "Category created"))
}

/// Admin only.
pub async fn update_category(
    State(categories): State<CategoryService>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateCategoryRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let category = categories.update(id, payload).await?;
    Ok(ApiResponse::ok(category).with_message("Category updated"))
}

/// Admin only. Refuses categories that still have children or articles.
pub async fn delete_category(
    State(categories): State<CategoryService>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    categories.delete(id).await?;
    Ok(ApiResponse::message("Category deleted"))
}
