//! Token sessions
//!
//! A [`TokenSource`] hands out a bearer token that is valid at the moment of
//! the call. Remote connectors depend on the trait, not on the handshake.

use crate::error::{AuthError, Result};
use crate::oauth::ClientCredentialsFlow;
use crate::types::OAuthTokens;
use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

/// Supplier of bearer tokens for API requests
#[async_trait]
pub trait TokenSource: Send + Sync {
    /// Return an access token that is not about to expire
    async fn access_token(&self) -> Result<String>;
}

/// Client-credentials session that re-authenticates before expiry
///
/// Concurrent callers share one cached token; when it goes stale, exactly one
/// caller repeats the handshake while the others wait on the lock.
pub struct ClientCredentialsSession {
    flow: ClientCredentialsFlow,
    tokens: Mutex<Option<OAuthTokens>>,
}

impl ClientCredentialsSession {
    pub fn new(flow: ClientCredentialsFlow) -> Self {
        Self {
            flow,
            tokens: Mutex::new(None),
        }
    }

    /// Perform the initial handshake so credential problems surface at startup
    pub async fn establish(flow: ClientCredentialsFlow) -> Result<Self> {
        let tokens = flow.authenticate().await?;
        Ok(Self {
            flow,
            tokens: Mutex::new(Some(tokens)),
        })
    }
}

#[async_trait]
impl TokenSource for ClientCredentialsSession {
    async fn access_token(&self) -> Result<String> {
        let mut guard = self.tokens.lock().await;

        if let Some(tokens) = guard.as_ref() {
            if !tokens.is_expired() {
                return Ok(tokens.access_token.clone());
            }
            debug!("Access token stale, re-authenticating");
        }

        let fresh = self.flow.authenticate().await?;
        debug!(
            valid_for_secs = fresh.time_until_expiry().map(|d| d.num_seconds()).unwrap_or(0),
            "Access token issued"
        );
        let token = fresh.access_token.clone();
        *guard = Some(fresh);
        Ok(token)
    }
}

/// Fixed token, for pre-issued tokens and tests
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

#[async_trait]
impl TokenSource for StaticToken {
    async fn access_token(&self) -> Result<String> {
        if self.0.is_empty() {
            return Err(AuthError::NotAuthenticated);
        }
        Ok(self.0.clone())
    }
}
