use crate::{
    error::AppError,
    models::like::{LikeToggleResponse, TargetType},
    repository::Repositories,
};

#[derive(Clone)]
pub struct LikeService {
    repos: Repositories,
}

impl LikeService {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    /// Likes the target if the user has not, unlikes it otherwise.
    pub async fn toggle(
        &self,
        user_id: i64,
        target: TargetType,
        target_id: i64,
    ) -> Result<LikeToggleResponse, AppError> {
        self.ensure_target_visible(user_id, target, target_id).await?;
        let is_liked = self.repos.likes.toggle(user_id, target, target_id).await?;
        Ok(LikeToggleResponse { is_liked })
    }

    pub async fn is_liked(&self, user_id: i64, target: TargetType, target_id: i64) -> Result<bool, AppError> {
        self.repos.likes.is_liked(user_id, target, target_id).await
    }

    /// Unpublished articles only exist for their author.
    async fn ensure_target_visible(
        &self,
        user_id: i64,
        target: TargetType,
        target_id: i64,
    ) -> Result<(), AppError> {
        let exists = match target {
            TargetType::Article => self
                .repos
                .articles
                .find_by_id(target_id)
                .await?
                .is_some_and(|a| a.is_published() || a.author_id == user_id),
            TargetType::Comment => self.repos.comments.find_by_id(target_id).await?.is_some(),
        };
        if !exists {
            return Err(AppError::NotFound(format!("{} not found", target)));
        }
        Ok(())
    }
}
