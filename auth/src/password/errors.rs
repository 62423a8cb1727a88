use thiserror::Error;

/// Error type for password operations.
///
/// A plaintext that simply does not match its digest is not an error;
/// see [`PasswordHasher::verify`](super::PasswordHasher::verify).
#[derive(Debug, Clone, Error)]
pub enum PasswordError {
    #[error("Password hashing failed: {0}")]
    HashingFailed(String),

    #[error("Stored password digest is unreadable: {0}")]
    VerificationFailed(String),
}
