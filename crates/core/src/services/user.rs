//! User service.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::Utc;
use sea_orm::Set;
use serde::Deserialize;
use validator::{Validate, ValidationError};
use yatube_common::{AppError, AppResult, config::AdminConfig};
use yatube_db::{entities::user, repositories::UserRepository};

/// User service for business logic.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
}

/// Input for creating a new user.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserInput {
    #[validate(length(min = 1, max = 150), custom(function = "validate_username"))]
    pub username: String,

    #[validate(length(min = 8, max = 128))]
    pub password: String,

    #[serde(default)]
    pub is_staff: bool,
}

/// Letters, digits and `@.+-_` only.
fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
    {
        Ok(())
    } else {
        Err(ValidationError::new("username")
            .with_message("Enter a valid username. Letters, digits and @/./+/-/_ only.".into()))
    }
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub const fn new(user_repo: UserRepository) -> Self {
        Self { user_repo }
    }

    /// Create a new user.
    pub async fn create(&self, input: CreateUserInput) -> AppResult<user::Model> {
        input.validate()?;

        if self
            .user_repo
            .find_by_username(&input.username)
            .await?
            .is_some()
        {
            return Err(AppError::Validation(
                "A user with that username already exists.".to_string(),
            ));
        }

        let password_hash = hash_password(&input.password)?;

        let model = user::ActiveModel {
            username: Set(input.username),
            password: Set(password_hash),
            is_staff: Set(input.is_staff),
            date_joined: Set(Utc::now().into()),
            ..Default::default()
        };

        let user = self.user_repo.create(model).await?;
        tracing::info!(user_id = user.id, username = %user.username, "Created user");

        Ok(user)
    }

    /// Find a user by ID.
    pub async fn find_by_id(&self, id: i64) -> AppResult<Option<user::Model>> {
        self.user_repo.find_by_id(id).await
    }

    /// Authenticate a user by username and password.
    pub async fn authenticate(&self, username: &str, password: &str) -> AppResult<user::Model> {
        let user = self
            .user_repo
            .find_by_username(username)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !verify_password(password, &user.password)? {
            tracing::debug!(user_id = user.id, "Password mismatch");
            return Err(AppError::InvalidCredentials);
        }

        Ok(user)
    }

    /// Delete a user by username along with everything they own.
    pub async fn delete_by_username(&self, username: &str) -> AppResult<()> {
        let user = self
            .user_repo
            .find_by_username(username)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {username}")))?;

        self.user_repo.delete(user.id).await?;
        tracing::info!(user_id = user.id, username = %user.username, "Deleted user");

        Ok(())
    }

    /// Make sure the bootstrap administrator exists.
    ///
    /// An existing account with the same username is left untouched.
    pub async fn ensure_admin(&self, admin: &AdminConfig) -> AppResult<user::Model> {
        if let Some(existing) = self.user_repo.find_by_username(&admin.username).await? {
            if !existing.is_staff {
                tracing::warn!(
                    username = %existing.username,
                    "Bootstrap admin username belongs to a non-staff account"
                );
            }
            return Ok(existing);
        }

        self.create(CreateUserInput {
            username: admin.username.clone(),
            password: admin.password.clone(),
            is_staff: true,
        })
        .await
    }
}

/// Hash a password using Argon2.
fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| AppError::Internal(format!("Invalid hash: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
