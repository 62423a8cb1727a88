use std::str::FromStr;

use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::claims::Claims;
use super::errors::JwtError;

/// JWT token handler for encoding and decoding tokens.
///
/// Signs with a shared secret using one algorithm of the HMAC family and
/// only accepts tokens whose header names that same algorithm.
pub struct JwtHandler {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    validation: Validation,
}

impl JwtHandler {
    /// Create a new JWT handler using HS256.
    ///
    /// # Arguments
    /// * `secret` - Secret key for signing tokens (should be stored securely)
    ///
    /// # Security Notes
    /// - The secret should be at least 256 bits (32 bytes) for HS256
    /// - Store secrets in environment variables or secure vaults, never in code
    pub fn new(secret: &[u8]) -> Self {
        Self::build(secret, Algorithm::HS256)
    }

    /// Create a JWT handler for an explicit algorithm.
    ///
    /// # Errors
    /// * `UnsupportedAlgorithm` - Algorithm is not HS256, HS384 or HS512
    pub fn with_algorithm(secret: &[u8], algorithm: Algorithm) -> Result<Self, JwtError> {
        match algorithm {
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => {
                Ok(Self::build(secret, algorithm))
            }
            other => Err(JwtError::UnsupportedAlgorithm(format!("{:?}", other))),
        }
    }

    fn build(secret: &[u8], algorithm: Algorithm) -> Self {
        let mut validation = Validation::new(algorithm);
        // Expiry is checked against the caller's clock in `verify`
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.required_spec_claims.clear();

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm,
            validation,
        }
    }

    /// Encode claims into a JWT token.
    ///
    /// # Errors
    /// * `EncodingFailed` - Claims could not be serialized or signed
    pub fn encode<T: Serialize>(&self, claims: &T) -> Result<String, JwtError> {
        let header = Header::new(self.algorithm);

        encode(&header, claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingFailed(e.to_string()))
    }

    /// Decode a JWT token, checking its signature and algorithm only.
    ///
    /// # Errors
    /// * `DecodingFailed` - Malformed token, bad signature or wrong algorithm
    pub fn decode<T: DeserializeOwned>(&self, token: &str) -> Result<T, JwtError> {
        decode::<T>(token, &self.decoding_key, &self.validation)
            .map(|token_data| token_data.claims)
            .map_err(|e| JwtError::DecodingFailed(e.to_string()))
    }

    /// Decode a credential token and check it is usable at `now`.
    ///
    /// # Arguments
    /// * `token` - JWT token string
    /// * `now` - Current Unix timestamp
    ///
    /// # Returns
    /// Claims with a non-empty subject and an expiry later than `now`
    ///
    /// # Errors
    /// * `DecodingFailed` - Malformed token, bad signature or wrong algorithm
    /// * `MissingClaim` - `exp` or `sub` absent
    /// * `TokenExpired` - `now` is at or past `exp`
    pub fn verify(&self, token: &str, now: i64) -> Result<Claims, JwtError> {
        let claims: Claims = self.decode(token)?;

        if claims.exp.is_none() {
            return Err(JwtError::MissingClaim("exp"));
        }
        if claims.is_expired(now) {
            return Err(JwtError::TokenExpired);
        }
        if claims.subject().is_none() {
            return Err(JwtError::MissingClaim("sub"));
        }

        Ok(claims)
    }
}

/// Parse an algorithm identifier such as `"HS256"`.
///
/// # Errors
/// * `UnsupportedAlgorithm` - Unknown identifier or not an HMAC algorithm
pub fn parse_algorithm(name: &str) -> Result<Algorithm, JwtError> {
    let algorithm = Algorithm::from_str(name.trim())
        .map_err(|_| JwtError::UnsupportedAlgorithm(name.to_string()))?;

    match algorithm {
        Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => Ok(algorithm),
        _ => Err(JwtError::UnsupportedAlgorithm(name.to_string())),
    }
}
