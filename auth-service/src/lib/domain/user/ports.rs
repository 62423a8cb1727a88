use async_trait::async_trait;

use crate::domain::user::models::AccessToken;
use crate::domain::user::models::RegisterUserCommand;
use crate::domain::user::models::User;
use crate::user::errors::UserError;
use crate::user::models::Username;

/// Port for authentication service operations.
#[async_trait]
pub trait AuthServicePort: Send + Sync + 'static {
    /// Check a login attempt.
    ///
    /// # Arguments
    /// * `username` - Raw username as submitted
    /// * `password` - Plaintext password as submitted
    ///
    /// # Returns
    /// The matching user entity
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown user or wrong password (indistinguishable)
    /// * `Password` - Stored digest is unreadable
    /// * `DatabaseError` - Database operation failed
    async fn authenticate(&self, username: &str, password: &str) -> Result<User, UserError>;

    /// Issue a bearer token for an authenticated user.
    ///
    /// # Errors
    /// * `Token` - Token signing failed
    fn issue_access_token(&self, user: &User) -> Result<AccessToken, UserError>;

    /// Resolve the user a bearer token speaks for.
    ///
    /// # Arguments
    /// * `token` - Raw token string
    ///
    /// # Returns
    /// The user named by the token subject
    ///
    /// # Errors
    /// * `Unauthorized` - Invalid or expired token, or the user no longer exists
    /// * `DatabaseError` - Database operation failed
    async fn authorize(&self, token: &str) -> Result<User, UserError>;

    /// Register a new user.
    ///
    /// # Arguments
    /// * `command` - Validated command containing username, email, and password
    ///
    /// # Returns
    /// Created user entity
    ///
    /// # Errors
    /// * `UsernameAlreadyExists` - Username is already taken
    /// * `Password` - Hashing failed
    /// * `DatabaseError` - Database operation failed
    async fn register(&self, command: RegisterUserCommand) -> Result<User, UserError>;
}

/// Persistence operations for the credential store.
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Persist new user to storage.
    ///
    /// The store's uniqueness constraint on username is authoritative.
    ///
    /// # Errors
    /// * `UsernameAlreadyExists` - Username is already taken
    /// * `DatabaseError` - Database operation failed
    async fn create(&self, user: User) -> Result<User, UserError>;

    /// Retrieve user by username.
    ///
    /// # Returns
    /// Optional user entity (None if not found)
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_by_username(&self, username: &Username) -> Result<Option<User>, UserError>;
}
