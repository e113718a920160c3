use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Seconds before expiry at which a token is treated as stale
pub const DEFAULT_EXPIRY_BUFFER_SECS: i64 = 60;

/// OAuth 2.0 application token.
///
/// The client-credentials grant issues no refresh token; once the access
/// token is stale the handshake is simply repeated.
///
/// # Security
///
/// Tokens should never be logged. The `Debug` implementation redacts the
/// access token.
///
/// # Examples
///
/// ```
/// use core_auth::OAuthTokens;
///
/// let tokens = OAuthTokens::new("access".to_string(), 3600);
/// assert!(!tokens.is_expired());
/// ```
#[derive(Clone, Serialize, Deserialize)]
pub struct OAuthTokens {
    /// The access token used for API requests
    pub access_token: String,
    /// When the access token expires (UTC)
    pub expires_at: DateTime<Utc>,
}

impl OAuthTokens {
    /// Create a token that expires `expires_in` seconds from now
    pub fn new(access_token: String, expires_in: i64) -> Self {
        Self {
            access_token,
            expires_at: Utc::now() + Duration::seconds(expires_in),
        }
    }

    /// Whether the token is expired or will expire within the default buffer
    pub fn is_expired(&self) -> bool {
        self.is_expired_with_buffer(DEFAULT_EXPIRY_BUFFER_SECS)
    }

    /// Check if the access token is expired with a custom buffer
    pub fn is_expired_with_buffer(&self, buffer_seconds: i64) -> bool {
        Utc::now() >= self.expires_at - Duration::seconds(buffer_seconds)
    }

    /// Time remaining until expiry, `None` once expired
    pub fn time_until_expiry(&self) -> Option<Duration> {
        let now = Utc::now();
        if now >= self.expires_at {
            None
        } else {
            Some(self.expires_at - now)
        }
    }
}

impl fmt::Debug for OAuthTokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthTokens")
            .field("access_token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}
