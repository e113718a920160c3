//! Error types for the DeviantArt provider

use bridge_traits::error::BridgeError;
use thiserror::Error;

/// DeviantArt provider errors
#[derive(Error, Debug)]
pub enum DeviantArtError {
    /// Authentication failed or token is invalid
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// API request returned an error
    #[error("DeviantArt API error (status {status_code}): {message}")]
    ApiError { status_code: u16, message: String },

    /// Failed to parse API response
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// The download endpoint returned no source for an item
    #[error("No download source for deviation {deviation_id}")]
    MissingSource { deviation_id: String },

    /// Bridge error
    #[error(transparent)]
    BridgeError(#[from] BridgeError),
}

/// Result type for DeviantArt operations
pub type Result<T> = std::result::Result<T, DeviantArtError>;

impl From<core_auth::AuthError> for DeviantArtError {
    fn from(error: core_auth::AuthError) -> Self {
        DeviantArtError::AuthenticationFailed(error.to_string())
    }
}

impl From<DeviantArtError> for BridgeError {
    fn from(error: DeviantArtError) -> Self {
        match error {
            DeviantArtError::AuthenticationFailed(msg) => BridgeError::Unauthorized(msg),
            DeviantArtError::ApiError {
                status_code,
                message,
            } => BridgeError::Remote(format!("API error (status {}): {}", status_code, message)),
            DeviantArtError::ParseError(msg) => {
                BridgeError::Remote(format!("Parse error: {}", msg))
            }
            DeviantArtError::MissingSource { deviation_id } => {
                BridgeError::Remote(format!("No download source for deviation {}", deviation_id))
            }
            DeviantArtError::BridgeError(e) => e,
        }
    }
}
