use std::sync::Arc;

use async_trait::async_trait;
use auth::Authenticator;
use chrono::Duration;
use chrono::Utc;

use crate::domain::user::models::AccessToken;
use crate::domain::user::models::RegisterUserCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::Username;
use crate::user::errors::UserError;
use crate::user::ports::AuthServicePort;
use crate::user::ports::UserRepository;

/// Domain service implementation for authentication operations.
///
/// Concrete implementation of AuthServicePort with dependency injection.
pub struct AuthService<UR>
where
    UR: UserRepository,
{
    repository: Arc<UR>,
    authenticator: Arc<Authenticator>,
    token_ttl: Duration,
    // Verified against when the username is unknown
    decoy_hash: String,
}

impl<UR> AuthService<UR>
where
    UR: UserRepository,
{
    /// Create a new auth service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - Credential store implementation
    /// * `authenticator` - Password hashing and token signing
    /// * `token_ttl` - Lifetime of issued access tokens
    ///
    /// # Errors
    /// * `Password` - The decoy digest could not be hashed
    pub fn new(
        repository: Arc<UR>,
        authenticator: Arc<Authenticator>,
        token_ttl: Duration,
    ) -> Result<Self, UserError> {
        let decoy_hash = authenticator.hash_password("decoy-password")?;

        Ok(Self {
            repository,
            authenticator,
            token_ttl,
            decoy_hash,
        })
    }

    fn verify_against_decoy(&self, password: &str) {
        if let Err(e) = self.authenticator.verify_password(password, &self.decoy_hash) {
            tracing::warn!(error = %e, "Decoy password verification failed");
        }
    }
}

#[async_trait]
impl<UR> AuthServicePort for AuthService<UR>
where
    UR: UserRepository,
{
    async fn authenticate(&self, username: &str, password: &str) -> Result<User, UserError> {
        let Ok(username) = Username::new(username.to_string()) else {
            self.verify_against_decoy(password);
            tracing::warn!("Login rejected: malformed username");
            return Err(UserError::InvalidCredentials);
        };

        let Some(user) = self.repository.find_by_username(&username).await? else {
            self.verify_against_decoy(password);
            tracing::warn!(username = %username, "Login rejected");
            return Err(UserError::InvalidCredentials);
        };

        if !self
            .authenticator
            .verify_password(password, &user.password_hash)?
        {
            tracing::warn!(username = %username, "Login rejected");
            return Err(UserError::InvalidCredentials);
        }

        tracing::info!(user_id = %user.id, username = %username, "Login succeeded");
        Ok(user)
    }

    fn issue_access_token(&self, user: &User) -> Result<AccessToken, UserError> {
        let issued = self
            .authenticator
            .issue_token(user.username.as_str(), self.token_ttl)?;

        Ok(AccessToken::bearer(issued.access_token, issued.expires_at))
    }

    async fn authorize(&self, token: &str) -> Result<User, UserError> {
        let subject = self
            .authenticator
            .validate_token(token)
            .map_err(|_| UserError::Unauthorized)?;

        let username = Username::new(subject).map_err(|_| UserError::Unauthorized)?;

        self.repository
            .find_by_username(&username)
            .await?
            .ok_or_else(|| {
                tracing::debug!(username = %username, "Token subject no longer exists");
                UserError::Unauthorized
            })
    }

    async fn register(&self, command: RegisterUserCommand) -> Result<User, UserError> {
        // Fast path only; the store's unique constraint settles races
        if self
            .repository
            .find_by_username(&command.username)
            .await?
            .is_some()
        {
            return Err(UserError::UsernameAlreadyExists(
                command.username.as_str().to_string(),
            ));
        }

        let password_hash = self.authenticator.hash_password(&command.password)?;

        let user = User {
            id: UserId::new(),
            username: command.username,
            email: command.email,
            password_hash,
            created_at: Utc::now(),
        };

        let created_user = self.repository.create(user).await?;

        tracing::info!(
            user_id = %created_user.id,
            username = %created_user.username,
            "User registered"
        );

        Ok(created_user)
    }
}
