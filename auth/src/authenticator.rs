use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;

use crate::jwt::Algorithm;
use crate::jwt::Claims;
use crate::jwt::JwtError;
use crate::jwt::JwtHandler;
use crate::password::PasswordError;
use crate::password::PasswordHasher;

/// Authentication coordinator combining password hashing and token handling.
///
/// Holds the process-wide signing secret; build it once at startup and share
/// it behind an `Arc`.
pub struct Authenticator {
    password_hasher: PasswordHasher,
    jwt_handler: JwtHandler,
}

/// A freshly issued access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    /// Signed JWT
    pub access_token: String,
    /// Instant at which the token stops being accepted
    pub expires_at: DateTime<Utc>,
}

/// Authentication operation errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthenticationError {
    /// Bad signature, malformed token, missing subject or elapsed expiry.
    /// Deliberately carries no detail.
    #[error("Invalid token")]
    InvalidToken,

    #[error("Password error: {0}")]
    PasswordError(#[from] PasswordError),

    #[error("JWT error: {0}")]
    JwtError(#[from] JwtError),
}

impl Authenticator {
    /// Create a new authenticator signing with HS256.
    ///
    /// # Arguments
    /// * `jwt_secret` - Secret key for JWT signing
    pub fn new(jwt_secret: &[u8]) -> Self {
        Self {
            password_hasher: PasswordHasher::new(),
            jwt_handler: JwtHandler::new(jwt_secret),
        }
    }

    /// Create an authenticator for an explicit signing algorithm.
    ///
    /// # Errors
    /// * `UnsupportedAlgorithm` - Algorithm is not in the HMAC family
    pub fn with_algorithm(jwt_secret: &[u8], algorithm: Algorithm) -> Result<Self, JwtError> {
        Ok(Self {
            password_hasher: PasswordHasher::new(),
            jwt_handler: JwtHandler::with_algorithm(jwt_secret, algorithm)?,
        })
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
    /// `true` if the password matches
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

    /// Issue a token for `subject` valid for `expires_in` from now.
    ///
    /// # Errors
    /// * `JwtError` - Token generation failed
    pub fn issue_token(
        &self,
        subject: &str,
        expires_in: Duration,
    ) -> Result<IssuedToken, JwtError> {
        self.issue_token_at(subject, expires_in, Utc::now())
    }

    /// Issue a token as if the current time were `now`.
    ///
    /// # Errors
    /// * `JwtError` - Token generation failed
    pub fn issue_token_at(
        &self,
        subject: &str,
        expires_in: Duration,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, JwtError> {
        let claims = Claims::for_subject(subject, now, expires_in);
        let expires_at = claims
            .expires_at()
            .ok_or_else(|| JwtError::EncodingFailed("expiration out of range".to_string()))?;
        let access_token = self.jwt_handler.encode(&claims)?;

        Ok(IssuedToken {
            access_token,
            expires_at,
        })
    }

    /// Validate a token and return the subject it was issued for.
    ///
    /// # Errors
    /// * `InvalidToken` - For every reason the token cannot be accepted
    pub fn validate_token(&self, token: &str) -> Result<String, AuthenticationError> {
        self.validate_token_at(token, Utc::now())
    }

    /// Validate a token as if the current time were `now`.
    ///
    /// # Errors
    /// * `InvalidToken` - For every reason the token cannot be accepted
    pub fn validate_token_at(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<String, AuthenticationError> {
        let claims = self
            .jwt_handler
            .verify(token, now.timestamp())
            .map_err(|e| {
                tracing::debug!(reason = %e, "Token rejected");
                AuthenticationError::InvalidToken
            })?;

        claims.sub.ok_or(AuthenticationError::InvalidToken)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    const SECRET: &[u8] = b"test_secret_key_at_least_32_bytes!";

    #[test]
    fn test_hash_and_verify_password() {
        let authenticator = Authenticator::new(SECRET);

        let hash = authenticator
            .hash_password("pw123")
            .expect("Failed to hash password");

        assert!(authenticator.verify_password("pw123", &hash).unwrap());
        assert!(!authenticator.verify_password("wrong", &hash).unwrap());
    }

    #[test]
    fn test_issue_and_validate_token() {
        let authenticator = Authenticator::new(SECRET);

        let issued = authenticator
            .issue_token("alice", Duration::minutes(30))
            .expect("Failed to issue token");

        let subject = authenticator
            .validate_token(&issued.access_token)
            .expect("Token validation failed");
        assert_eq!(subject, "alice");
    }

    #[test]
    fn test_expiry_boundary() {
        let authenticator = Authenticator::new(SECRET);
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();

        let issued = authenticator
            .issue_token_at("alice", Duration::seconds(60), now)
            .unwrap();
        assert_eq!(issued.expires_at, now + Duration::seconds(60));

        let just_before = now + Duration::seconds(59);
        let at_expiry = now + Duration::seconds(60);

        assert_eq!(
            authenticator
                .validate_token_at(&issued.access_token, just_before)
                .unwrap(),
            "alice"
        );
        assert!(matches!(
            authenticator.validate_token_at(&issued.access_token, at_expiry),
            Err(AuthenticationError::InvalidToken)
        ));
    }

    #[test]
    fn test_sub_second_issue_is_valid_until_full_lifetime() {
        let authenticator = Authenticator::new(SECRET);
        let now =
            Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap() + Duration::milliseconds(900);

        let issued = authenticator
            .issue_token_at("alice", Duration::seconds(1), now)
            .unwrap();
        assert!(issued.expires_at >= now + Duration::seconds(1));

        for offset_ms in [100, 999] {
            let at = now + Duration::milliseconds(offset_ms);
            assert_eq!(
                authenticator
                    .validate_token_at(&issued.access_token, at)
                    .unwrap(),
                "alice"
            );
        }

        assert!(matches!(
            authenticator.validate_token_at(&issued.access_token, issued.expires_at),
            Err(AuthenticationError::InvalidToken)
        ));
    }

    #[test]
    fn test_expired_token_from_the_past() {
        let authenticator = Authenticator::new(SECRET);
        let long_ago = Utc.with_ymd_and_hms(2001, 1, 1, 0, 0, 0).unwrap();

        let issued = authenticator
            .issue_token_at("alice", Duration::minutes(30), long_ago)
            .unwrap();

        assert!(matches!(
            authenticator.validate_token(&issued.access_token),
            Err(AuthenticationError::InvalidToken)
        ));
    }

    #[test]
    fn test_validate_invalid_token() {
        let authenticator = Authenticator::new(SECRET);

        let result = authenticator.validate_token("invalid.token.here");
        assert!(matches!(result, Err(AuthenticationError::InvalidToken)));
    }

    #[test]
    fn test_tampered_token_is_rejected() {
        let authenticator = Authenticator::new(SECRET);
        let issued = authenticator
            .issue_token("alice", Duration::minutes(30))
            .unwrap();

        // Flip one character in the signature segment
        let mut tampered = issued.access_token.into_bytes();
        let last = tampered.len() - 2;
        tampered[last] = if tampered[last] == b'A' { b'B' } else { b'A' };
        let tampered = String::from_utf8(tampered).unwrap();

        assert!(matches!(
            authenticator.validate_token(&tampered),
            Err(AuthenticationError::InvalidToken)
        ));
    }

    #[test]
    fn test_token_from_other_secret_is_rejected() {
        let issuer = Authenticator::new(b"another_secret_key_at_least_32_bytes");
        let validator = Authenticator::new(SECRET);

        let issued = issuer.issue_token("alice", Duration::minutes(30)).unwrap();

        assert!(matches!(
            validator.validate_token(&issued.access_token),
            Err(AuthenticationError::InvalidToken)
        ));
    }

    #[test]
    fn test_with_algorithm() {
        let authenticator = Authenticator::with_algorithm(SECRET, Algorithm::HS384).unwrap();
        let issued = authenticator
            .issue_token("alice", Duration::minutes(5))
            .unwrap();
        assert_eq!(
            authenticator.validate_token(&issued.access_token).unwrap(),
            "alice"
        );

        assert!(Authenticator::with_algorithm(SECRET, Algorithm::ES256).is_err());
    }
}
