use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// Credential claim carried inside an access token.
///
/// Fields are optional on the wire so that a token missing one of them
/// still decodes and can be rejected with a precise reason.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Subject (the username the token was issued for)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,

    /// Issued at (Unix timestamp)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,

    /// Expiration time (Unix timestamp)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
}

impl Claims {
    /// Create new empty claims.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create claims for a subject valid from `issued_at` for `expires_in`.
    ///
    /// # Arguments
    /// * `subject` - Identity the token speaks for
    /// * `issued_at` - Issuance instant
    /// * `expires_in` - Validity window length
    ///
    /// # Returns
    /// Claims with sub, iat and exp set. `exp` is rounded up to the next whole
    /// second, so the token is never rejected before `issued_at + expires_in`.
    pub fn for_subject(
        subject: impl ToString,
        issued_at: DateTime<Utc>,
        expires_in: Duration,
    ) -> Self {
        let expiration = issued_at + expires_in;
        let exp = expiration.timestamp() + i64::from(expiration.timestamp_subsec_nanos() > 0);

        Self {
            sub: Some(subject.to_string()),
            iat: Some(issued_at.timestamp()),
            exp: Some(exp),
        }
    }

    /// Set subject.
    pub fn with_subject(mut self, sub: impl ToString) -> Self {
        self.sub = Some(sub.to_string());
        self
    }

    /// Set expiration (Unix timestamp).
    pub fn with_expiration(mut self, exp: i64) -> Self {
        self.exp = Some(exp);
        self
    }

    /// Instant at which the token stops being accepted.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.exp.and_then(|exp| DateTime::from_timestamp(exp, 0))
    }

    /// Subject, if present and non-empty.
    pub fn subject(&self) -> Option<&str> {
        self.sub.as_deref().filter(|s| !s.is_empty())
    }

    /// Check whether the token is expired at `current_timestamp`.
    ///
    /// The expiry instant itself counts as expired. Claims without `exp`
    /// never count as valid.
    pub fn is_expired(&self, current_timestamp: i64) -> bool {
        self.exp.map_or(true, |exp| exp <= current_timestamp)
    }
}
