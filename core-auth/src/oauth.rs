//! OAuth 2.0 Client Credentials Flow
//!
//! Implements the `client_credentials` grant of RFC 6749 §4.4: the
//! application exchanges its own id and secret for a short-lived bearer token.
//!
//! # Security
//!
//! Never logs the client secret or issued tokens.
//!
//! # Example
//!
//! ```no_run
//! use core_auth::oauth::{ClientCredentialsFlow, OAuthConfig};
//! use core_auth::ClientCredentials;
//! use std::sync::Arc;
//!
//! # async fn example() -> core_auth::Result<()> {
//! # use bridge_traits::http::HttpClient;
//! # let http_client: Arc<dyn HttpClient> = todo!();
//! let flow = ClientCredentialsFlow::new(
//!     OAuthConfig::deviantart(ClientCredentials::new("id", "secret")),
//!     http_client,
//! );
//! let tokens = flow.authenticate().await?;
//! # Ok(())
//! # }
//! ```

use crate::credentials::ClientCredentials;
use crate::error::{AuthError, Result};
use crate::types::OAuthTokens;
use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{instrument, warn};

/// DeviantArt token endpoint
pub const DEVIANTART_TOKEN_URL: &str = "https://www.deviantart.com/oauth2/token";

const MAX_HANDSHAKE_ATTEMPTS: u32 = 3;

/// OAuth 2.0 provider configuration.
#[derive(Debug, Clone)]
pub struct OAuthConfig {
    pub credentials: ClientCredentials,
    /// Token endpoint URL
    pub token_url: String,
}

impl OAuthConfig {
    /// Configuration for the DeviantArt token endpoint
    pub fn deviantart(credentials: ClientCredentials) -> Self {
        Self {
            credentials,
            token_url: DEVIANTART_TOKEN_URL.to_string(),
        }
    }
}

/// Performs the client-credentials token handshake.
pub struct ClientCredentialsFlow {
    config: OAuthConfig,
    http_client: Arc<dyn HttpClient>,
}

impl ClientCredentialsFlow {
    pub fn new(config: OAuthConfig, http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            config,
            http_client,
        }
    }

    fn encoded_body(&self) -> Result<String> {
        let params = [
            ("grant_type", "client_credentials"),
            ("client_id", self.config.credentials.client_id.as_str()),
            ("client_secret", self.config.credentials.client_secret.as_str()),
        ];
        serde_urlencoded::to_string(params)
            .map_err(|e| AuthError::Other(format!("Failed to encode token request: {}", e)))
    }

    /// Obtain a fresh application token.
    ///
    /// Server errors (5xx) are retried with exponential backoff, client
    /// errors (4xx) fail immediately.
    ///
    /// # Errors
    ///
    /// - [`AuthError::AuthenticationFailed`] when the endpoint rejects the
    ///   credentials or keeps failing
    /// - [`AuthError::NetworkError`] when the endpoint cannot be reached
    /// - [`AuthError::InvalidTokenResponse`] when the reply cannot be parsed
    #[instrument(skip(self), fields(client_id = %self.config.credentials.client_id))]
    pub async fn authenticate(&self) -> Result<OAuthTokens> {
        let body = self.encoded_body()?;
        let mut attempts = 0;

        loop {
            attempts += 1;

            let request =
                HttpRequest::new(HttpMethod::Post, self.config.token_url.clone())
                    .form(body.clone());

            let response = self
                .http_client
                .execute(request)
                .await
                .map_err(|e| AuthError::NetworkError(e.to_string()))?;

            if response.is_success() {
                let token_response: TokenResponse = response
                    .json()
                    .map_err(|e| AuthError::InvalidTokenResponse(e.to_string()))?;

                if let Some(ref status) = token_response.status {
                    if status != "success" {
                        return Err(AuthError::AuthenticationFailed(format!(
                            "Token endpoint reported status '{}'",
                            status
                        )));
                    }
                }

                tracing::info!(
                    "Authenticated with client credentials (expires in {}s)",
                    token_response.expires_in
                );

                return Ok(OAuthTokens::new(
                    token_response.access_token,
                    token_response.expires_in,
                ));
            }

            let status = response.status;
            let error_body = response
                .text()
                .unwrap_or_else(|_| "Unable to read error response".to_string());

            if response.is_client_error() {
                warn!(status = status, error = %error_body, "Token request rejected");
                return Err(AuthError::AuthenticationFailed(format!(
                    "Token endpoint returned {}: {}",
                    status, error_body
                )));
            }

            // Only 5xx is worth repeating
            if !response.is_server_error() {
                return Err(AuthError::AuthenticationFailed(format!(
                    "Unexpected token endpoint status {}: {}",
                    status, error_body
                )));
            }

            if attempts >= MAX_HANDSHAKE_ATTEMPTS {
                return Err(AuthError::AuthenticationFailed(format!(
                    "Token request failed after {} attempts. Last error: {} - {}",
                    attempts, status, error_body
                )));
            }

            let delay = Duration::from_millis(100 * 2u64.pow(attempts - 1));
            warn!(
                status = status,
                attempts = attempts,
                delay_ms = delay.as_millis(),
                "Token request failed, retrying"
            );
            tokio::time::sleep(delay).await;
        }
    }
}

/// Token response from the OAuth provider.
#[derive(Debug, Deserialize, Serialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    token_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<String>,
}

fn default_expires_in() -> i64 {
    3600
}
