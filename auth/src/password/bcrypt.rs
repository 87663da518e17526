use super::errors::PasswordError;

/// Password hashing implementation.
///
/// Produces self-describing bcrypt digests (`$2b$<cost>$<salt><hash>`), so a
/// stored digest carries everything needed to verify it later, even after the
/// configured cost changes.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub const MIN_COST: u32 = 4;
    pub const MAX_COST: u32 = 31;

    /// Create a new password hasher with the library default cost.
    ///
    /// # Returns
    /// PasswordHasher instance configured with secure defaults
    pub fn new() -> Self {
        Self {
            cost: bcrypt::DEFAULT_COST,
        }
    }

    /// Create a password hasher with an explicit work factor.
    ///
    /// # Arguments
    /// * `cost` - bcrypt cost (log2 of the number of rounds)
    ///
    /// # Errors
    /// * `InvalidCost` - Cost is outside the range bcrypt accepts
    pub fn with_cost(cost: u32) -> Result<Self, PasswordError> {
        if !(Self::MIN_COST..=Self::MAX_COST).contains(&cost) {
            return Err(PasswordError::InvalidCost {
                cost,
                min: Self::MIN_COST,
                max: Self::MAX_COST,
            });
        }
        Ok(Self { cost })
    }

    /// Configured work factor.
    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Hash a plaintext password with a fresh random salt.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to hash
    ///
    /// # Returns
    /// Modular crypt format digest (algorithm, cost, salt and hash)
    ///
    /// # Errors
    /// * `HashingFailed` - Password hashing operation failed
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        bcrypt::hash(password, self.cost).map_err(|e| PasswordError::HashingFailed(e.to_string()))
    }

    /// Verify a password against a stored digest.
    ///
    /// Salt and cost are read from the digest. A mismatch is `Ok(false)`.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to verify
    /// * `hash` - Stored bcrypt digest
    ///
    /// # Errors
    /// * `VerificationFailed` - Digest is not a valid bcrypt string
    pub fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordError> {
        bcrypt::verify(password, hash)
            .map_err(|e| PasswordError::VerificationFailed(format!("Invalid password hash: {}", e)))
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_hasher() -> PasswordHasher {
        PasswordHasher::with_cost(PasswordHasher::MIN_COST).expect("valid cost")
    }

    #[test]
    fn test_hash_and_verify() {
        let hasher = fast_hasher();
        let password = "my_secure_password";

        let hash = hasher.hash(password).expect("Failed to hash password");

        assert!(hasher
            .verify(password, &hash)
            .expect("Failed to verify password"));

        assert!(!hasher
            .verify("wrong_password", &hash)
            .expect("Failed to verify password"));
    }

    #[test]
    fn test_same_password_hashes_differently() {
        let hasher = fast_hasher();

        let first = hasher.hash("pw123456").expect("Failed to hash password");
        let second = hasher.hash("pw123456").expect("Failed to hash password");

        assert_ne!(first, second);
        assert!(hasher.verify("pw123456", &first).unwrap());
        assert!(hasher.verify("pw123456", &second).unwrap());
    }

    #[test]
    fn test_digest_embeds_algorithm_and_cost() {
        let hasher = PasswordHasher::with_cost(5).unwrap();
        let hash = hasher.hash("pw123456").unwrap();

        assert!(hash.starts_with("$2b$05$"), "unexpected digest prefix: {hash}");
        assert!(!hash.contains("pw123456"));
    }

    #[test]
    fn test_verify_uses_cost_from_digest() {
        let hash = PasswordHasher::with_cost(5).unwrap().hash("pw123456").unwrap();

        // A hasher configured with a different cost still verifies older digests.
        let hasher = PasswordHasher::with_cost(6).unwrap();
        assert!(hasher.verify("pw123456", &hash).unwrap());
    }

    #[test]
    fn test_different_passwords_do_not_verify() {
        let hasher = fast_hasher();
        let pairs = [("alpha", "beta"), ("pw123456", "pw1234567"), ("", " ")];

        for (p1, p2) in pairs {
            let hash = hasher.hash(p2).unwrap();
            assert!(!hasher.verify(p1, &hash).unwrap(), "{p1:?} matched hash of {p2:?}");
        }
    }

    #[test]
    fn test_verify_invalid_hash() {
        let hasher = fast_hasher();
        let result = hasher.verify("password", "invalid_hash");
        assert!(matches!(result, Err(PasswordError::VerificationFailed(_))));
    }

    #[test]
    fn test_with_cost_rejects_out_of_range() {
        assert!(matches!(
            PasswordHasher::with_cost(3),
            Err(PasswordError::InvalidCost { cost: 3, .. })
        ));
        assert!(PasswordHasher::with_cost(32).is_err());
        assert_eq!(PasswordHasher::new().cost(), bcrypt::DEFAULT_COST);
    }
}
