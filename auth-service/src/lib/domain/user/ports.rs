use async_trait::async_trait;

use crate::domain::user::models::AccessToken;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::Password;
use crate::domain::user::models::RegisterCommand;
use crate::domain::user::models::User;
use crate::user::errors::AuthError;
use crate::user::errors::CredentialStoreError;

/// Port for authentication operations.
#[async_trait]
pub trait AuthServicePort: Send + Sync + 'static {
    /// Register a new user.
    ///
    /// # Arguments
    /// * `command` - Validated email and password
    ///
    /// # Returns
    /// Created user entity (map to `PublicUser` before returning it to a client)
    ///
    /// # Errors
    /// * `RegistrationConflict` - Email is already registered
    /// * `Internal` - Hashing or storage failed
    async fn register(&self, command: RegisterCommand) -> Result<User, AuthError>;

    /// Check credentials and issue an access token.
    ///
    /// # Arguments
    /// * `email` - Raw email as submitted
    /// * `password` - Password as submitted
    ///
    /// # Returns
    /// Signed bearer token with its expiry
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown email or wrong password (indistinguishable)
    /// * `AccountDisabled` - Credentials are valid but the account is inactive
    /// * `Internal` - Storage, hashing, or signing failed
    async fn login(&self, email: &str, password: Password) -> Result<AccessToken, AuthError>;

    /// Resolve the user a bearer token belongs to.
    ///
    /// # Arguments
    /// * `token` - Token string as presented
    ///
    /// # Returns
    /// The authenticated user
    ///
    /// # Errors
    /// * `Unauthenticated` - Token is malformed, tampered, expired, or names
    ///   a user that no longer exists or is inactive
    /// * `Internal` - Storage failed
    async fn identify(&self, token: &str) -> Result<User, AuthError>;
}

/// Persistence operations for user credentials.
///
/// Implementations own uniqueness: `create` must be an atomic
/// check-and-insert so concurrent registrations of one email cannot both win.
#[async_trait]
pub trait CredentialStore: Send + Sync + 'static {
    /// Persist a new user. The store assigns `id`, `created_at`, and sets
    /// `is_active` to true.
    ///
    /// # Arguments
    /// * `email` - Normalized email
    /// * `password_hash` - Digest produced by the password hasher
    ///
    /// # Returns
    /// Created user entity
    ///
    /// # Errors
    /// * `EmailTaken` - A user with this email already exists
    /// * `Database` - Storage operation failed
    async fn create(
        &self,
        email: &EmailAddress,
        password_hash: &str,
    ) -> Result<User, CredentialStoreError>;

    /// Retrieve user by email address.
    ///
    /// # Returns
    /// Optional user entity (None if not found)
    ///
    /// # Errors
    /// * `Database` - Storage operation failed
    async fn find_by_email(&self, email: &EmailAddress)
        -> Result<Option<User>, CredentialStoreError>;
}
