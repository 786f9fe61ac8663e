// src/handlers/auth.rs

use axum::{Extension, Json, extract::State, response::IntoResponse};
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        common::ApiResponse,
        user::{LoginRequest, RegisterRequest, UpdateProfileRequest},
    },
    services::UserService,
    utils::jwt::Claims,
};

/// Registers a new user.
///
/// Hashes the password using Argon2 before storing it.
/// Returns 201 Created and the public profile.
pub async fn register(
    State(users): State<UserService>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let user = users.register(payload).await?;
    Ok(ApiResponse::created(user, "Registration successful"))
}

/// Authenticates a user and returns a bearer token.
pub async fn login(
    State(users): State<UserService>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let session = users.login(payload).await?;
    Ok(ApiResponse::ok(session).with_message("Login successful"))
}

/// Profile of the caller.
pub async fn me(
    State(users): State<UserService>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user = users.get_by_id(claims.user_id()?).await?;
    Ok(ApiResponse::ok(user))
}

pub async fn update_me(
    State(users): State<UserService>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let user = users.update_profile(claims.user_id()?, payload).await?;
    Ok(ApiResponse::ok(user).with_message("Profile updated"))
}
