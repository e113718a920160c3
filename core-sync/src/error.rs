use bridge_traits::error::BridgeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Remote error: {0}")]
    Remote(String),

    #[error("{operation} failed after {attempts} attempts: {last_error}")]
    RetriesExhausted {
        operation: String,
        attempts: u32,
        last_error: String,
    },

    #[error("Failed to download item {item_id}: {message}")]
    ItemDownload { item_id: String, message: String },

    #[error("Filesystem error: {0}")]
    Filesystem(String),
}

impl SyncError {
    /// Whether this error is the terminal result of a retried call
    pub fn is_retries_exhausted(&self) -> bool {
        matches!(self, SyncError::RetriesExhausted { .. })
    }
}

impl From<BridgeError> for SyncError {
    fn from(error: BridgeError) -> Self {
        match error {
            BridgeError::Io(e) => SyncError::Filesystem(e.to_string()),
            BridgeError::Unauthorized(msg) => SyncError::Auth(msg),
            other => SyncError::Remote(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bridge_error_classification() {
        let io = BridgeError::Io(std::io::Error::new(std::io::ErrorKind::Other, "denied"));
        assert!(matches!(SyncError::from(io), SyncError::Filesystem(_)));

        let remote = BridgeError::Remote("timeout".to_string());
        assert!(matches!(SyncError::from(remote), SyncError::Remote(_)));

        let unauthorized = BridgeError::Unauthorized("expired".to_string());
        assert!(matches!(SyncError::from(unauthorized), SyncError::Auth(_)));
    }

    #[test]
    fn test_retries_exhausted_display() {
        let err = SyncError::RetriesExhausted {
            operation: "list_items".to_string(),
            attempts: 3,
            last_error: "Remote error: 503".to_string(),
        };
        assert!(err.is_retries_exhausted());
        assert_eq!(
            err.to_string(),
            "list_items failed after 3 attempts: Remote error: 503"
        );
    }
}
