//! File System Access Implementation using Tokio

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    storage::FileSystemAccess,
};
use bytes::Bytes;
use std::path::Path;
use tokio::fs;
use tracing::debug;

/// Tokio-based file system implementation
///
/// Provides async file I/O operations using `tokio::fs`. Every failure is
/// surfaced as [`BridgeError::Io`] so callers can classify it as a local
/// filesystem problem.
#[derive(Debug, Default, Clone)]
pub struct TokioFileSystem;

impl TokioFileSystem {
    pub fn new() -> Self {
        Self
    }

    /// Convert std::io::Error to BridgeError
    fn map_io_error(e: std::io::Error) -> BridgeError {
        BridgeError::Io(e)
    }
}

#[async_trait]
impl FileSystemAccess for TokioFileSystem {
    async fn exists(&self, path: &Path) -> Result<bool> {
        fs::try_exists(path).await.map_err(Self::map_io_error)
    }

    async fn create_dir_all(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path).await.map_err(Self::map_io_error)?;
        debug!(path = ?path, "Ensured directory");
        Ok(())
    }

    async fn read_file(&self, path: &Path) -> Result<Bytes> {
        let data = fs::read(path).await.map_err(Self::map_io_error)?;
        debug!(path = ?path, size = data.len(), "Read file");
        Ok(Bytes::from(data))
    }

    async fn write_file(&self, path: &Path, data: Bytes) -> Result<()> {
        if let Some(parent) = path.parent() {
            self.create_dir_all(parent).await?;
        }

        fs::write(path, data.as_ref())
            .await
            .map_err(Self::map_io_error)?;
        debug!(path = ?path, size = data.len(), "Wrote file");
        Ok(())
    }

    async fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        fs::rename(from, to).await.map_err(Self::map_io_error)?;
        debug!(from = ?from, to = ?to, "Renamed file");
        Ok(())
    }

    async fn delete_file(&self, path: &Path) -> Result<()> {
        fs::remove_file(path).await.map_err(Self::map_io_error)?;
        debug!(path = ?path, "Deleted file");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use uuid::Uuid;

    fn scratch_dir() -> std::path::PathBuf {
        env::temp_dir().join(format!("bridge-desktop-test-{}", Uuid::new_v4()))
    }

    #[tokio::test]
    async fn test_write_and_read() {
        let fs = TokioFileSystem::new();
        let dir = scratch_dir();
        let test_file = dir.join("nested").join("test-file.txt");

        let data = Bytes::from("Hello, World!");
        fs.write_file(&test_file, data.clone()).await.unwrap();

        let read_data = fs.read_file(&test_file).await.unwrap();
        assert_eq!(data, read_data);

        fs.delete_file(&test_file).await.unwrap();
        assert!(!fs.exists(&test_file).await.unwrap());

        let _ = tokio::fs::remove_dir_all(&dir).await;
    }

    #[tokio::test]
    async fn test_create_dir_all_is_idempotent() {
        let fs = TokioFileSystem::new();
        let dir = scratch_dir().join("a").join("b");

        fs.create_dir_all(&dir).await.unwrap();
        fs.create_dir_all(&dir).await.unwrap();
        assert!(fs.exists(&dir).await.unwrap());

        let _ = tokio::fs::remove_dir_all(dir.parent().unwrap().parent().unwrap()).await;
    }

    #[tokio::test]
    async fn test_atomic_write_leaves_no_staging_file() {
        let fs = TokioFileSystem::new();
        let dir = scratch_dir();
        let target = dir.join("item.png");

        fs.write_file_atomic(&target, Bytes::from_static(b"first"))
            .await
            .unwrap();
        fs.write_file_atomic(&target, Bytes::from_static(b"second"))
            .await
            .unwrap();

        assert_eq!(fs.read_file(&target).await.unwrap(), Bytes::from_static(b"second"));
        assert!(!fs.exists(&dir.join("item.png.part")).await.unwrap());

        let _ = tokio::fs::remove_dir_all(&dir).await;
    }

    #[tokio::test]
    async fn test_read_missing_file_is_io_error() {
        let fs = TokioFileSystem::new();
        let err = fs.read_file(&scratch_dir().join("missing")).await.unwrap_err();
        assert!(err.is_io());
    }
}
