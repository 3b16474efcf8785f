use std::sync::Arc;

use log::info;

use crate::{ServiceError, ServiceResult, util::validate_username};

pub type UserId = i64;
pub type Username = String;

#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub username: Username,
    pub password_hash: String,
}

impl User {
    /// Check a plaintext password against the stored hash.
    /// Returns false for a wrong password or a malformed hash, never panics.
    pub fn check_password(&self, password: &str) -> bool {
        bcrypt::verify(password, &self.password_hash).unwrap_or(false)
    }
}

/// An account that has not been persisted yet. The id is assigned by the
/// repository on insert.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: Username,
    pub password_hash: String,
}

impl NewUser {
    pub fn new(username: &str, password: &str) -> ServiceResult<Self> {
        let password_hash = bcrypt::hash(password, bcrypt::DEFAULT_COST)
            .map_err(|_| ServiceError::BadRequest("Failed to hash password".into()))?;
        Ok(Self {
            username: username.to_string(),
            password_hash,
        })
    }
}

pub type ArcUserRepository = Arc<Box<dyn UserRepository + Send + Sync + 'static>>;

#[async_trait::async_trait]
pub trait UserRepository {
    async fn get_user_by_id(&self, id: UserId) -> ServiceResult<Option<User>>;
    async fn get_user_by_name(&self, username: &str) -> ServiceResult<Option<User>>;
    async fn create_user(&self, user: &NewUser) -> ServiceResult<User>;
    async fn update_password(&self, id: UserId, password_hash: String) -> ServiceResult<()>;
    async fn get_usernames(&self) -> ServiceResult<Vec<Username>>;
}

pub type ArcUserService = Arc<Box<dyn UserService + Send + Sync + 'static>>;

#[async_trait::async_trait]
pub trait UserService {
    async fn register(&self, username: &str, password: &str) -> ServiceResult<User>;
    async fn fetch_user(&self, username: &str) -> ServiceResult<User>;
    async fn validate_login(&self, username: &str, password: &str) -> ServiceResult<()>;
    async fn change_password(
        &self,
        username: &str,
        current_password: &str,
        new_password: &str,
    ) -> ServiceResult<()>;
}

pub struct UserServiceImpl {
    user_repository: ArcUserRepository,
    user_cache: Arc<moka::sync::Cache<Username, User>>,
}

impl UserServiceImpl {
    pub fn new(user_repository: ArcUserRepository) -> Self {
        let user_cache = Arc::new(
            moka::sync::Cache::builder()
                .max_capacity(10_000)
                .time_to_live(std::time::Duration::from_secs(60 * 60))
                .build(),
        );
        Self {
            user_repository,
            user_cache,
        }
    }
}

#[async_trait::async_trait]
impl UserService for UserServiceImpl {
    async fn register(&self, username: &str, password: &str) -> ServiceResult<User> {
        let username = validate_username(username)?;
        if self
            .user_repository
            .get_user_by_name(username)
            .await?
            .is_some()
        {
            return ServiceError::not_possible(format!("Username {} is already taken", username));
        }
        let user = self.user_repository.create_user(&NewUser::new(username, password)?).await?;
        info!("Registered user {}", user.username);
        Ok(user)
    }

    async fn fetch_user(&self, username: &str) -> ServiceResult<User> {
        if let Some(user) = self.user_cache.get(username) {
            return Ok(user);
        }
        let user = self
            .user_repository
            .get_user_by_name(username)
            .await?
            .ok_or(ServiceError::NotFound(format!("No user {}", username)))?;
        self.user_cache.insert(user.username.clone(), user.clone());
        Ok(user)
    }

    async fn validate_login(&self, username: &str, password: &str) -> ServiceResult<()> {
        let user = self.fetch_user(username).await?;
        if !user.check_password(password) {
            info!("Failed login attempt for user {}", username);
            return ServiceError::unauthorized("Invalid username or password");
        }
        Ok(())
    }

    async fn change_password(
        &self,
        username: &str,
        current_password: &str,
        new_password: &str,
    ) -> ServiceResult<()> {
        let user = self.fetch_user(username).await?;
        if !user.check_password(current_password) {
            return ServiceError::unauthorized("Invalid username or password");
        }
        let password_hash = bcrypt::hash(new_password, bcrypt::DEFAULT_COST)
            .map_err(|_| ServiceError::BadRequest("Failed to hash password".into()))?;
        self.user_repository
            .update_password(user.id, password_hash)
            .await?;
        self.user_cache.invalidate(username);
        info!("User {} changed their password", username);
        Ok(())
    }
}
