use chrono::Duration;

use crate::jwt::Claims;
use crate::jwt::IssuedToken;
use crate::jwt::JwtError;
use crate::jwt::JwtHandler;
use crate::password::PasswordError;
use crate::password::PasswordHasher;

/// Authentication coordinator combining password hashing and JWT handling.
///
/// Holds the process-wide signing secret and the default token lifetime.
/// Cloning is cheap enough to move a copy onto a blocking thread for the
/// deliberately slow password operations.
#[derive(Debug, Clone)]
pub struct Authenticator {
    password_hasher: PasswordHasher,
    jwt_handler: JwtHandler,
    token_ttl: Duration,
}

impl Authenticator {
    /// Default lifetime of an access token.
    pub const DEFAULT_TOKEN_TTL_MINUTES: i64 = 30;

    /// Create a new authenticator with HS256, default bcrypt cost and the
    /// default token lifetime.
    ///
    /// # Arguments
    /// * `jwt_secret` - Secret key for JWT signing
    pub fn new(jwt_secret: &[u8]) -> Self {
        Self {
            password_hasher: PasswordHasher::new(),
            jwt_handler: JwtHandler::new(jwt_secret),
            token_ttl: Duration::minutes(Self::DEFAULT_TOKEN_TTL_MINUTES),
        }
    }

    /// Assemble an authenticator from configured parts.
    pub fn from_parts(
        password_hasher: PasswordHasher,
        jwt_handler: JwtHandler,
        token_ttl: Duration,
    ) -> Self {
        Self {
            password_hasher,
            jwt_handler,
            token_ttl,
        }
    }

    /// Replace the password hasher (e.g. to lower the cost in tests).
    pub fn with_password_hasher(mut self, password_hasher: PasswordHasher) -> Self {
        self.password_hasher = password_hasher;
        self
    }

    /// Replace the default token lifetime.
    pub fn with_token_ttl(mut self, token_ttl: Duration) -> Self {
        self.token_ttl = token_ttl;
        self
    }

    pub fn token_ttl(&self) -> Duration {
        self.token_ttl
    }

    /// Hash a password for storage.
    ///
    /// # Errors
    /// * `PasswordError` - Hashing operation failed
    pub fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        self.password_hasher.hash(password)
    }

    /// Check a plaintext password against a stored digest.
    ///
    /// # Returns
    /// `true` iff the password matches
    ///
    /// # Errors
    /// * `PasswordError` - Stored digest is unreadable
    pub fn verify_password(
        &self,
        password: &str,
        stored_hash: &str,
    ) -> Result<bool, PasswordError> {
        self.password_hasher.verify(password, stored_hash)
    }

    /// Issue an access token for `subject` with the default lifetime.
    ///
    /// # Errors
    /// * `JwtError` - Token generation failed
    pub fn issue_token(&self, subject: &str) -> Result<IssuedToken, JwtError> {
        self.jwt_handler.issue(subject, self.token_ttl)
    }

    /// Issue an access token for `subject` with an explicit lifetime.
    ///
    /// # Errors
    /// * `JwtError` - Token generation failed
    pub fn issue_token_with_ttl(
        &self,
        subject: &str,
        ttl: Duration,
    ) -> Result<IssuedToken, JwtError> {
        self.jwt_handler.issue(subject, ttl)
    }

    /// Validate and decode an access token.
    ///
    /// # Errors
    /// * `JwtError` - Token is malformed, tampered with, or expired
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        self.jwt_handler.verify(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn authenticator() -> Authenticator {
        Authenticator::new(b"test_secret_key_at_least_32_bytes!")
            .with_password_hasher(PasswordHasher::with_cost(4).unwrap())
    }

    #[test]
    fn test_hash_and_verify_password() {
        let authenticator = authenticator();

        let hash = authenticator
            .hash_password("my_password")
            .expect("Failed to hash password");

        assert!(authenticator.verify_password("my_password", &hash).unwrap());
        assert!(!authenticator.verify_password("wrong_password", &hash).unwrap());
    }

    #[test]
    fn test_issue_and_validate_token() {
        let authenticator = authenticator();

        let issued = authenticator
            .issue_token("a@b.com")
            .expect("Failed to issue token");

        let claims = authenticator
            .validate_token(&issued.token)
            .expect("Failed to validate token");

        assert_eq!(claims.sub, "a@b.com");
        assert_eq!(claims.exp - claims.iat, 30 * 60);
    }

    #[test]
    fn test_configured_ttl_is_applied() {
        let authenticator = authenticator().with_token_ttl(Duration::minutes(5));

        let issued = authenticator.issue_token("a@b.com").unwrap();
        let claims = authenticator.validate_token(&issued.token).unwrap();

        assert_eq!(authenticator.token_ttl(), Duration::minutes(5));
        assert_eq!(claims.exp - claims.iat, 5 * 60);
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let authenticator = authenticator();

        let issued = authenticator
            .issue_token_with_ttl("a@b.com", Duration::seconds(-1))
            .unwrap();

        assert_eq!(
            authenticator.validate_token(&issued.token),
            Err(JwtError::Expired)
        );
    }

    #[test]
    fn test_validate_invalid_token() {
        let authenticator = authenticator();

        let result = authenticator.validate_token("invalid.token.here");
        assert!(result.is_err());
    }

    #[test]
    fn test_oversized_ttl_returns_error() {
        let authenticator = authenticator().with_token_ttl(Duration::minutes(1_000_000_000_000));

        let result = authenticator.issue_token("a@b.com");
        assert!(matches!(result, Err(JwtError::EncodingFailed(_))));
    }
}
