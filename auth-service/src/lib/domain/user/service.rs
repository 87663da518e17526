use std::sync::Arc;

use async_trait::async_trait;
use auth::Authenticator;
use tokio::sync::OnceCell;

use crate::domain::user::models::AccessToken;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::Password;
use crate::domain::user::models::RegisterCommand;
use crate::domain::user::models::User;
use crate::user::errors::AuthError;
use crate::user::errors::CredentialStoreError;
use crate::user::ports::AuthServicePort;
use crate::user::ports::CredentialStore;

/// Domain service implementation for authentication.
///
/// Stateless apart from its collaborators: every call is independent, and the
/// only shared mutable state lives behind the credential store.
pub struct AuthService<CS>
where
    CS: CredentialStore,
{
    store: Arc<CS>,
    authenticator: Arc<Authenticator>,
    /// Digest checked against when the email is unknown, so that path costs
    /// the same bcrypt work as a wrong password.
    decoy_hash: OnceCell<String>,
}

const DECOY_PASSWORD: &str = "decoy-password-never-assigned";

impl<CS> AuthService<CS>
where
    CS: CredentialStore,
{
    /// Create a new auth service with injected dependencies.
    ///
    /// # Arguments
    /// * `store` - Credential persistence implementation
    /// * `authenticator` - Password hasher and token codec, configured once at startup
    pub fn new(store: Arc<CS>, authenticator: Arc<Authenticator>) -> Self {
        Self {
            store,
            authenticator,
            decoy_hash: OnceCell::new(),
        }
    }

    /// Spend one bcrypt verification on a password with no matching account.
    async fn verify_against_decoy(&self, password: Password) {
        let result = async {
            let decoy_hash = self
                .decoy_hash
                .get_or_try_init(|| self.with_authenticator(|a| a.hash_password(DECOY_PASSWORD)))
                .await?
                .clone();

            self.with_authenticator(move |a| a.verify_password(password.as_str(), &decoy_hash))
                .await
        }
        .await;

        if let Err(e) = result {
            tracing::warn!(error = %e, "Decoy password verification failed");
        }
    }

    /// Run a password operation on the blocking pool.
    async fn with_authenticator<F, T>(&self, operation: F) -> Result<T, AuthError>
    where
        F: FnOnce(&Authenticator) -> Result<T, auth::PasswordError> + Send + 'static,
        T: Send + 'static,
    {
        let authenticator = Arc::clone(&self.authenticator);
        tokio::task::spawn_blocking(move || operation(&authenticator))
            .await
            .map_err(|e| AuthError::Internal(format!("Password task failed: {}", e)))?
            .map_err(AuthError::from)
    }
}

#[async_trait]
impl<CS> AuthServicePort for AuthService<CS>
where
    CS: CredentialStore,
{
    async fn register(&self, command: RegisterCommand) -> Result<User, AuthError> {
        let RegisterCommand { email, password } = command;

        let password_hash = self
            .with_authenticator(move |a| a.hash_password(password.as_str()))
            .await?;

        let user = self
            .store
            .create(&email, &password_hash)
            .await
            .map_err(|e| {
                match &e {
                    CredentialStoreError::EmailTaken(_) => {
                        tracing::info!(email = %email, "Registration rejected: email taken")
                    }
                    CredentialStoreError::Database(msg) => {
                        tracing::error!(error = %msg, "Failed to create user")
                    }
                }
                AuthError::from(e)
            })?;

        tracing::info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    async fn login(&self, email: &str, password: Password) -> Result<AccessToken, AuthError> {
        let Ok(email) = EmailAddress::new(email) else {
            tracing::debug!("Login rejected: malformed email");
            return Err(AuthError::InvalidCredentials);
        };

        let Some(user) = self.store.find_by_email(&email).await? else {
            self.verify_against_decoy(password).await;
            tracing::debug!(email = %email, "Login rejected: unknown email");
            return Err(AuthError::InvalidCredentials);
        };

        let stored_hash = user.password_hash.clone();
        let matches = self
            .with_authenticator(move |a| a.verify_password(password.as_str(), &stored_hash))
            .await?;

        if !matches {
            tracing::debug!(user_id = %user.id, "Login rejected: wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        if !user.is_active {
            tracing::info!(user_id = %user.id, "Login rejected: account disabled");
            return Err(AuthError::AccountDisabled);
        }

        let issued = self
            .authenticator
            .issue_token(user.email.as_str())
            .map_err(|e| AuthError::Internal(format!("Token generation failed: {}", e)))?;

        tracing::info!(user_id = %user.id, expires_at = %issued.expires_at, "User logged in");
        Ok(issued.into())
    }

    async fn identify(&self, token: &str) -> Result<User, AuthError> {
        let claims = self.authenticator.validate_token(token).map_err(|e| {
            tracing::debug!(reason = %e, "Token rejected");
            AuthError::Unauthenticated
        })?;

        let email = EmailAddress::new(&claims.sub).map_err(|_| {
            tracing::debug!("Token rejected: subject is not an email");
            AuthError::Unauthenticated
        })?;

        let user = self.store.find_by_email(&email).await?.ok_or_else(|| {
            tracing::debug!(email = %email, "Token rejected: subject no longer exists");
            AuthError::Unauthenticated
        })?;

        if !user.is_active {
            tracing::debug!(user_id = %user.id, "Token rejected: account disabled");
            return Err(AuthError::Unauthenticated);
        }

        Ok(user)
    }
}
