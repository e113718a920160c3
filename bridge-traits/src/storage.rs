//! File System Abstraction
//!
//! Platform-agnostic file I/O used for mirrored content and cache markers.

use async_trait::async_trait;
use bytes::Bytes;
use std::path::Path;

use crate::error::Result;

/// File system access trait
///
/// All operations are expected to be idempotent where the underlying
/// operation allows it: creating a directory that already exists succeeds,
/// and writing a file replaces any previous content.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::storage::FileSystemAccess;
///
/// async fn store(fs: &dyn FileSystemAccess, dir: &Path, data: Bytes) -> Result<()> {
///     fs.create_dir_all(dir).await?;
///     fs.write_file(&dir.join("item.bin"), data).await
/// }
/// ```
#[async_trait]
pub trait FileSystemAccess: Send + Sync {
    /// Check if a file or directory exists
    async fn exists(&self, path: &Path) -> Result<bool>;

    /// Create a directory and all parent directories if they don't exist
    async fn create_dir_all(&self, path: &Path) -> Result<()>;

    /// Read entire file contents into memory
    async fn read_file(&self, path: &Path) -> Result<Bytes>;

    /// Write data to a file, creating it or truncating previous content
    async fn write_file(&self, path: &Path, data: Bytes) -> Result<()>;

    /// Move a file into place, replacing the destination if present
    async fn rename(&self, from: &Path, to: &Path) -> Result<()>;

    /// Delete a file
    async fn delete_file(&self, path: &Path) -> Result<()>;

    /// Write `data` to a sibling temporary file, then rename it over `path`
    ///
    /// A reader never observes a half-written `path`: either the previous
    /// content or the complete new content is visible.
    async fn write_file_atomic(&self, path: &Path, data: Bytes) -> Result<()> {
        let mut staging = path.as_os_str().to_owned();
        staging.push(".part");
        let staging = std::path::PathBuf::from(staging);

        if let Err(e) = self.write_file(&staging, data).await {
            let _ = self.delete_file(&staging).await;
            return Err(e);
        }
        self.rename(&staging, path).await
    }
}
