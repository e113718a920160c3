use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid credentials file {path}: {reason}")]
    InvalidCredentials { path: String, reason: String },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Malformed token response: {0}")]
    InvalidTokenResponse(String),

    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Auth error: {0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, AuthError>;
