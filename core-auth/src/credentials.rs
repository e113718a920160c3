//! Client credentials file loading

use crate::error::{AuthError, Result};
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use tracing::debug;

/// Application credentials issued by the API provider
///
/// Loaded from a JSON file of the form
/// `{"client_id": "...", "client_secret": "..."}`. Extra keys are ignored.
#[derive(Clone, Deserialize)]
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: String,
}

impl ClientCredentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    /// Read and validate a credentials file
    pub async fn from_file(path: &Path) -> Result<Self> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| AuthError::InvalidCredentials {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        let credentials = Self::parse(&raw, path)?;
        debug!(path = %path.display(), "Loaded client credentials");
        Ok(credentials)
    }

    /// Parse credentials JSON; `origin` is only used in error messages
    pub fn parse(raw: &str, origin: &Path) -> Result<Self> {
        let invalid = |reason: String| AuthError::InvalidCredentials {
            path: origin.display().to_string(),
            reason,
        };

        let credentials: ClientCredentials =
            serde_json::from_str(raw).map_err(|e| invalid(e.to_string()))?;

        if credentials.client_id.trim().is_empty() {
            return Err(invalid("client_id is empty".to_string()));
        }
        if credentials.client_secret.trim().is_empty() {
            return Err(invalid("client_secret is empty".to_string()));
        }

        Ok(credentials)
    }
}

impl fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn origin() -> PathBuf {
        PathBuf::from("creds/creds.json")
    }

    #[test]
    fn test_parse_valid() {
        let creds = ClientCredentials::parse(
            r#"{"client_id": "1234", "client_secret": "abcd", "note": "ignored"}"#,
            &origin(),
        )
        .unwrap();
        assert_eq!(creds.client_id, "1234");
        assert_eq!(creds.client_secret, "abcd");
    }

    #[test]
    fn test_parse_missing_secret() {
        let err = ClientCredentials::parse(r#"{"client_id": "1234"}"#, &origin()).unwrap_err();
        match err {
            AuthError::InvalidCredentials { path, reason } => {
                assert_eq!(path, "creds/creds.json");
                assert!(reason.contains("client_secret"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_parse_empty_values_rejected() {
        assert!(ClientCredentials::parse(
            r#"{"client_id": " ", "client_secret": "abcd"}"#,
            &origin()
        )
        .is_err());
        assert!(ClientCredentials::parse("not json", &origin()).is_err());
    }

    #[test]
    fn test_debug_redacts_secret() {
        let creds = ClientCredentials::new("id", "very-secret");
        let rendered = format!("{:?}", creds);
        assert!(!rendered.contains("very-secret"));
        assert!(rendered.contains("[REDACTED]"));
    }

    #[tokio::test]
    async fn test_from_missing_file() {
        let path = std::env::temp_dir().join(format!("creds-{}.json", uuid::Uuid::new_v4()));
        assert!(matches!(
            ClientCredentials::from_file(&path).await,
            Err(AuthError::InvalidCredentials { .. })
        ));
    }

    #[tokio::test]
    async fn test_from_file() {
        let path = std::env::temp_dir().join(format!("creds-{}.json", uuid::Uuid::new_v4()));
        tokio::fs::write(&path, r#"{"client_id": "id", "client_secret": "secret"}"#)
            .await
            .unwrap();

        let creds = ClientCredentials::from_file(&path).await.unwrap();
        assert_eq!(creds.client_id, "id");

        let _ = tokio::fs::remove_file(&path).await;
    }
}
