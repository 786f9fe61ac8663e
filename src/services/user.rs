use std::sync::Arc;

use crate::{
    config::Config,
    error::AppError,
    models::user::{
        LoginRequest, LoginResponse, NewUser, ROLE_ADMIN, ROLE_USER, RegisterRequest,
        STATUS_ACTIVE, UpdateProfileRequest, UserResponse,
    },
    repository::UserRepository,
    utils::{
        hash::{hash_password, verify_password},
        jwt::sign_jwt,
    },
};

#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserRepository>,
    jwt_secret: String,
    jwt_expiration: u64,
}

impl UserService {
    pub fn new(users: Arc<dyn UserRepository>, config: &Config) -> Self {
        Self {
            users,
            jwt_secret: config.jwt_secret.clone(),
            jwt_expiration: config.jwt_expiration,
        }
    }

    pub async fn register(&self, req: RegisterRequest) -> Result<UserResponse, AppError> {
        if self.users.find_by_username(&req.username).await?.is_some() {
            return Err(AppError::BadRequest("Username already exists".to_string()));
        }
        if self.users.find_by_email(&req.email).await?.is_some() {
            return Err(AppError::BadRequest("Email already exists".to_string()));
        }

        let password_hash = hash_password(&req.password)?;
        let nickname = req
            .nickname
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| req.username.clone());

        let user = self
            .users
            .create(NewUser {
                username: req.username,
                email: req.email,
                password_hash,
                nickname,
                role: ROLE_USER.to_string(),
            })
            .await?;

        tracing::info!("User registered: {}", user.username);
        Ok(UserResponse::from(&user))
    }

    /// Verifies credentials and issues a bearer token. Unknown user and wrong
    /// password produce the same error.
    pub async fn login(&self, req: LoginRequest) -> Result<LoginResponse, AppError> {
        let invalid = || AppError::AuthError("Invalid username or password".to_string());

        let user = self
            .users
            .find_by_username(&req.username)
            .await?
            .ok_or_else(invalid)?;

        if !verify_password(&req.password, &user.password_hash)? {
            tracing::warn!("Failed login attempt for user: {}", req.username);
            return Err(invalid());
        }

        if user.status != STATUS_ACTIVE {
            return Err(AppError::Forbidden("Account is disabled".to_string()));
        }

        let token = sign_jwt(
            user.id,
            &user.username,
            &user.role,
            &self.jwt_secret,
            self.jwt_expiration,
        )?;

        self.users.touch_last_login(user.id).await?;

        Ok(LoginResponse {
            token,
            token_type: "Bearer",
            expires_in: self.jwt_expiration,
            user: UserResponse::from(&user),
        })
    }

    pub async fn get_by_id(&self, id: i64) -> Result<UserResponse, AppError> {
        let user = self
            .users
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound("User not found".to_string()))?;
        Ok(UserResponse::from(&user))
    }

    pub async fn update_profile(
        &self,
        id: i64,
        req: UpdateProfileRequest,
    ) -> Result<UserResponse, AppError> {
        let user = self
            .users
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound("User not found".to_string()))?;

        let nickname = req.nickname.unwrap_or(user.nickname);
        let avatar_url = req.avatar_url.unwrap_or(user.avatar_url);
        let bio = req.bio.unwrap_or(user.bio);

        let updated = self
            .users
            .update_profile(id, &nickname, &avatar_url, &bio)
            .await?;
        Ok(UserResponse::from(&updated))
    }

    /// Creates the bootstrap admin unless the username is already taken.
    /// Returns whether a user was created.
    pub async fn seed_admin(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<bool, AppError> {
        if self.users.find_by_username(username).await?.is_some() {
            tracing::info!("Admin user '{}' already exists. Skipping seed.", username);
            return Ok(false);
        }

        self.users
            .create(NewUser {
                username: username.to_string(),
                email: email.to_string(),
                password_hash: hash_password(password)?,
                nickname: username.to_string(),
                role: ROLE_ADMIN.to_string(),
            })
            .await?;

        tracing::info!("Admin user '{}' seeded", username);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{register, services};
    use super::*;
    use crate::utils::jwt::verify_jwt;

    #[tokio::test]
    async fn register_rejects_taken_username() {
        let services = services();
        register(&services, "alice").await;

        let err = services
            .users
            .register(RegisterRequest {
                username: "alice".to_string(),
                email: "other@example.com".to_string(),
                password: "password123".to_string(),
                nickname: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn login_issues_token_for_valid_credentials() {
        let services = services();
        let id = register(&services, "alice").await;

        let resp = services
            .users
            .login(LoginRequest {
                username: "alice".to_string(),
                password: "password123".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(resp.user.id, id);
        assert_eq!(resp.user.nickname, "alice");

        let claims = verify_jwt(&resp.token, "test-secret").unwrap();
        assert_eq!(claims.user_id().unwrap(), id);
    }

    #[tokio::test]
    async fn login_with_wrong_password_is_unauthorized() {
        let services = services();
        register(&services, "alice").await;

        let err = services
            .users
            .login(LoginRequest {
                username: "alice".to_string(),
                password: "wrong-password".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::AuthError(_)));
    }

    #[tokio::test]
    async fn seed_admin_runs_once() {
        let services = services();
        assert!(services.users.seed_admin("root", "root@example.com", "password123").await.unwrap());
        assert!(!services.users.seed_admin("root", "root@example.com", "password123").await.unwrap());
    }
}
