use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Bridge operation failed: {0}")]
    OperationFailed(String),

    #[error("Remote service error: {0}")]
    Remote(String),

    #[error("Authentication rejected: {0}")]
    Unauthorized(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BridgeError {
    /// Whether the failure happened on the local filesystem rather than remotely
    pub fn is_io(&self) -> bool {
        matches!(self, BridgeError::Io(_))
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;
