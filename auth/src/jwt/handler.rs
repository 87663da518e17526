use std::fmt;
use std::str::FromStr;

use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;

use super::claims::Claims;
use super::errors::JwtError;

/// A freshly signed token together with its expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// JWT token handler for issuing and verifying access tokens.
///
/// Signs with an HMAC algorithm (HS256 by default) using a server-held
/// secret. Tokens are self-contained: nothing is tracked server side, so a
/// token stops working only when it expires or the secret changes.
#[derive(Clone)]
pub struct JwtHandler {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
}

impl JwtHandler {
    /// Create a new JWT handler with a secret key.
    ///
    /// # Arguments
    /// * `secret` - Secret key for signing tokens (should be stored securely)
    ///
    /// # Returns
    /// JwtHandler instance configured with HS256 algorithm
    ///
    /// # Security Notes
    /// - The secret should be at least 256 bits (32 bytes) for HS256
    /// - Store secrets in environment variables or secure vaults, never in code
    /// - Changing the secret invalidates every token issued with the old one
    pub fn new(secret: &[u8]) -> Self {
        Self::from_parts(secret, Algorithm::HS256)
    }

    /// Create a JWT handler for a configured algorithm identifier.
    ///
    /// # Arguments
    /// * `secret` - Secret key for signing tokens
    /// * `algorithm` - Algorithm name such as `HS256`
    ///
    /// # Errors
    /// * `UnsupportedAlgorithm` - Name is unknown or not an HMAC algorithm
    pub fn with_algorithm(secret: &[u8], algorithm: &str) -> Result<Self, JwtError> {
        let parsed = Algorithm::from_str(algorithm)
            .map_err(|_| JwtError::UnsupportedAlgorithm(algorithm.to_string()))?;

        match parsed {
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => {
                Ok(Self::from_parts(secret, parsed))
            }
            _ => Err(JwtError::UnsupportedAlgorithm(algorithm.to_string())),
        }
    }

    fn from_parts(secret: &[u8], algorithm: Algorithm) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm,
        }
    }

    /// Signing algorithm in use.
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Encode claims into a JWT token.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token encoding failed
    pub fn encode(&self, claims: &Claims) -> Result<String, JwtError> {
        let header = Header::new(self.algorithm);

        encode(&header, claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingFailed(e.to_string()))
    }

    /// Issue a token for `subject` that expires `ttl` from now.
    ///
    /// # Arguments
    /// * `subject` - Identity asserted by the token
    /// * `ttl` - Lifetime; negative values produce an already expired token
    ///
    /// # Errors
    /// * `EncodingFailed` - Token encoding failed, or `ttl` puts the expiry out of range
    pub fn issue(&self, subject: &str, ttl: Duration) -> Result<IssuedToken, JwtError> {
        let claims = Claims::new(subject, Utc::now(), ttl).ok_or_else(|| {
            JwtError::EncodingFailed(format!("token lifetime out of range: {}", ttl))
        })?;
        let token = self.encode(&claims)?;
        let expires_at = claims.expires_at().ok_or_else(|| {
            JwtError::EncodingFailed(format!("expiry out of range: {}", claims.exp))
        })?;

        Ok(IssuedToken { token, expires_at })
    }

    /// Decode and verify a JWT token.
    ///
    /// The signature is checked before any claim is trusted; expiry is then
    /// checked against the current time with no leeway.
    ///
    /// # Errors
    /// * `InvalidSignature` - Signature does not match the payload
    /// * `Malformed` - Token is not a well-formed JWT for this handler
    /// * `Expired` - Current time is at or past `exp`
    pub fn verify(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(self.algorithm);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(
            |e| match e.kind() {
                ErrorKind::InvalidSignature => JwtError::InvalidSignature,
                _ => JwtError::Malformed(e.to_string()),
            },
        )?;

        let claims = token_data.claims;
        if claims.is_expired(Utc::now().timestamp()) {
            return Err(JwtError::Expired);
        }

        Ok(claims)
    }
}

impl fmt::Debug for JwtHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtHandler")
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"my_secret_key_at_least_32_bytes_long!";

    #[test]
    fn test_issue_and_verify() {
        let handler = JwtHandler::new(SECRET);

        let issued = handler
            .issue("a@b.com", Duration::minutes(30))
            .expect("Failed to issue token");
        assert!(!issued.token.is_empty());
        assert!(issued.expires_at > Utc::now());

        let claims = handler.verify(&issued.token).expect("Failed to verify token");
        assert_eq!(claims.sub, "a@b.com");
    }

    #[test]
    fn test_verify_expired_token() {
        let handler = JwtHandler::new(SECRET);

        let issued = handler
            .issue("a@b.com", Duration::seconds(-1))
            .expect("Failed to issue token");

        assert_eq!(handler.verify(&issued.token), Err(JwtError::Expired));
    }

    #[test]
    fn test_issue_with_out_of_range_ttl_fails() {
        let handler = JwtHandler::new(SECRET);

        let result = handler.issue("a@b.com", Duration::days(365 * 1_000_000));
        assert!(matches!(result, Err(JwtError::EncodingFailed(_))));
    }

    #[test]
    fn test_verify_flipped_signature_bit() {
        let handler = JwtHandler::new(SECRET);
        let issued = handler.issue("a@b.com", Duration::minutes(30)).unwrap();

        // Each base64url symbol carries six signature bits; toggling the low
        // bit of the first symbol's index flips exactly one signature bit.
        const ALPHABET: &[u8] =
            b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";
        let (head, signature) = issued.token.rsplit_once('.').unwrap();
        let mut bytes = signature.as_bytes().to_vec();
        let index = ALPHABET.iter().position(|&c| c == bytes[0]).unwrap();
        bytes[0] = ALPHABET[index ^ 1];
        let tampered = format!("{}.{}", head, String::from_utf8(bytes).unwrap());

        assert_eq!(handler.verify(&tampered), Err(JwtError::InvalidSignature));
    }

    #[test]
    fn test_verify_tampered_payload() {
        let handler = JwtHandler::new(SECRET);
        let issued = handler.issue("a@b.com", Duration::minutes(30)).unwrap();
        let forged = handler.issue("evil@b.com", Duration::minutes(30)).unwrap();

        // Splice the forged payload onto the original signature.
        let parts: Vec<&str> = issued.token.split('.').collect();
        let forged_parts: Vec<&str> = forged.token.split('.').collect();
        let spliced = format!("{}.{}.{}", parts[0], forged_parts[1], parts[2]);

        assert_eq!(handler.verify(&spliced), Err(JwtError::InvalidSignature));
    }

    #[test]
    fn test_verify_malformed_token() {
        let handler = JwtHandler::new(SECRET);

        assert!(matches!(
            handler.verify("invalid.token.here"),
            Err(JwtError::Malformed(_))
        ));
        assert!(matches!(handler.verify(""), Err(JwtError::Malformed(_))));
    }

    #[test]
    fn test_verify_truncated_token() {
        let handler = JwtHandler::new(SECRET);
        let issued = handler.issue("a@b.com", Duration::minutes(30)).unwrap();
        let (head, _) = issued.token.rsplit_once('.').unwrap();

        assert!(handler.verify(head).is_err());
    }

    #[test]
    fn test_verify_with_wrong_secret() {
        let handler1 = JwtHandler::new(b"secret1_at_least_32_bytes_long_key!");
        let handler2 = JwtHandler::new(b"secret2_at_least_32_bytes_long_key!");

        let issued = handler1.issue("a@b.com", Duration::minutes(30)).unwrap();

        assert_eq!(handler2.verify(&issued.token), Err(JwtError::InvalidSignature));
    }

    #[test]
    fn test_with_algorithm() {
        let handler = JwtHandler::with_algorithm(SECRET, "HS512").expect("HS512 is supported");
        assert_eq!(handler.algorithm(), Algorithm::HS512);

        let issued = handler.issue("a@b.com", Duration::minutes(5)).unwrap();
        assert_eq!(handler.verify(&issued.token).unwrap().sub, "a@b.com");

        // A token signed with a different HMAC variant is rejected.
        let hs256 = JwtHandler::new(SECRET);
        assert!(hs256.verify(&issued.token).is_err());
    }

    #[test]
    fn test_with_algorithm_rejects_non_hmac() {
        assert_eq!(
            JwtHandler::with_algorithm(SECRET, "RS256").unwrap_err(),
            JwtError::UnsupportedAlgorithm("RS256".to_string())
        );
        assert!(JwtHandler::with_algorithm(SECRET, "none").is_err());
    }

    #[test]
    fn test_debug_does_not_leak_secret() {
        let handler = JwtHandler::new(SECRET);
        let debug = format!("{:?}", handler);
        assert!(!debug.contains("my_secret_key"));
        assert!(debug.contains("HS256"));
    }
}
