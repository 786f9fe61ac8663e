//! Business rules. Handlers call into these; these call the repositories.

use std::collections::HashMap;

use crate::{
    config::Config,
    error::AppError,
    models::user::UserResponse,
    repository::{Repositories, UserRepository},
};

pub mod article;
pub mod category;
pub mod comment;
pub mod like;
pub mod tag;
pub mod user;

pub use article::ArticleService;
pub use category::CategoryService;
pub use comment::CommentService;
pub use like::LikeService;
pub use tag::TagService;
pub use user::UserService;

#[derive(Clone)]
pub struct Services {
    pub users: UserService,
    pub articles: ArticleService,
    pub comments: CommentService,
    pub likes: LikeService,
    pub categories: CategoryService,
    pub tags: TagService,
}

impl Services {
    pub fn new(repos: Repositories, config: &Config) -> Self {
        Self {
            users: UserService::new(repos.users.clone(), config),
            articles: ArticleService::new(repos.clone()),
            comments: CommentService::new(repos.clone()),
            likes: LikeService::new(repos.clone()),
            categories: CategoryService::new(repos.categories.clone()),
            tags: TagService::new(repos.tags),
        }
    }
}

/// Public profiles for `ids`, keyed by id.
pub(crate) async fn load_users(
    users: &dyn UserRepository,
    ids: impl IntoIterator<Item = i64>,
) -> Result<HashMap<i64, UserResponse>, AppError> {
    let mut ids: Vec<i64> = ids.into_iter().collect();
    ids.sort_unstable();
    ids.dedup();

    Ok(users
        .find_by_ids(&ids)
        .await?
        .iter()
        .map(|user| (user.id, UserResponse::from(user)))
        .collect())
}

/// Looks up a profile loaded by `load_users`.
pub(crate) fn user_from(
    users: &HashMap<i64, UserResponse>,
    id: i64,
) -> Result<UserResponse, AppError> {
    users.get(&id).cloned().ok_or_else(|| {
        AppError::InternalServerError(format!("User {} referenced but missing", id))
    })
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::config::StorageBackend;
    use crate::models::user::RegisterRequest;

    pub fn config() -> Config {
        Config {
            storage: StorageBackend::Memory,
            database_url: None,
            database_max_connections: 1,
            jwt_secret: "test-secret".to_string(),
            jwt_expiration: 3600,
            rust_log: "info".to_string(),
            server_port: 0,
            cors_origins: Vec::new(),
            admin_username: None,
            admin_email: None,
            admin_password: None,
        }
    }

    pub fn services() -> Services {
        Services::new(Repositories::in_memory(), &config())
    }

    /// Registers a user and returns their id.
    pub async fn register(services: &Services, username: &str) -> i64 {
        services
            .users
            .register(RegisterRequest {
                username: username.to_string(),
                email: format!("{}@example.com", username),
                password: "password123".to_string(),
                nickname: None,
            })
            .await
            .unwrap()
            .id
    }
}
