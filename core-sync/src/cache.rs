//! # Incremental Cache
//!
//! One marker per folder recording the newest item id seen by the last
//! completed sync of that folder. The marker lives in a plain file named
//! [`CACHE_FILE_NAME`] beside the folder's downloaded content and holds the
//! raw id with no trailing newline.

use crate::error::Result;
use bridge_traits::source::ItemId;
use bridge_traits::storage::FileSystemAccess;
use bytes::Bytes;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

pub const CACHE_FILE_NAME: &str = "cache";

pub struct IncrementalCache {
    filesystem: Arc<dyn FileSystemAccess>,
}

impl IncrementalCache {
    pub fn new(filesystem: Arc<dyn FileSystemAccess>) -> Self {
        Self { filesystem }
    }

    pub fn marker_path(folder_dir: &Path) -> PathBuf {
        folder_dir.join(CACHE_FILE_NAME)
    }

    /// Read the stored marker, `None` when the folder was never synced
    ///
    /// Surrounding whitespace is ignored. An empty or unreadable-as-text
    /// marker is treated as absent, which makes the next sync a full one.
    pub async fn read(&self, folder_dir: &Path) -> Result<Option<ItemId>> {
        let path = Self::marker_path(folder_dir);
        if !self.filesystem.exists(&path).await? {
            debug!(path = %path.display(), "No cache marker");
            return Ok(None);
        }

        let raw = self.filesystem.read_file(&path).await?;
        let marker = match std::str::from_utf8(&raw) {
            Ok(text) => text.trim(),
            Err(_) => {
                warn!(path = %path.display(), "Cache marker is not valid UTF-8, ignoring");
                return Ok(None);
            }
        };

        if marker.is_empty() {
            return Ok(None);
        }

        debug!(path = %path.display(), marker, "Read cache marker");
        Ok(Some(ItemId::new(marker)))
    }

    /// Overwrite the marker with `newest`
    pub async fn write(&self, folder_dir: &Path, newest: &ItemId) -> Result<()> {
        let path = Self::marker_path(folder_dir);
        self.filesystem.create_dir_all(folder_dir).await?;
        self.filesystem
            .write_file_atomic(&path, Bytes::from(newest.as_str().to_owned()))
            .await?;
        debug!(path = %path.display(), marker = %newest, "Wrote cache marker");
        Ok(())
    }
}
