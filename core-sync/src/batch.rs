//! # Concurrent Download Batch
//!
//! Downloads every item of one fetched page concurrently. Each item runs in
//! its own task; a failure (or panic) in one task is reported to the error
//! channel and never affects its siblings. [`DownloadBatch::run`] returns only
//! once every task has finished.

use crate::error::SyncError;
use bridge_traits::sink::{LogEntry, LoggerSink};
use bridge_traits::source::{Item, ItemId, MediaSource};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{debug, error, instrument};

/// Per-batch tallies
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    pub downloaded: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl BatchOutcome {
    pub fn merge(&mut self, other: BatchOutcome) {
        self.downloaded += other.downloaded;
        self.skipped += other.skipped;
        self.failed += other.failed;
    }

    pub fn total(&self) -> usize {
        self.downloaded + self.skipped + self.failed
    }
}

type DownloadResult = bridge_traits::error::Result<Option<PathBuf>>;

pub struct DownloadBatch {
    source: Arc<dyn MediaSource>,
    errors: Arc<dyn LoggerSink>,
    max_concurrent: usize,
}

impl DownloadBatch {
    pub fn new(
        source: Arc<dyn MediaSource>,
        errors: Arc<dyn LoggerSink>,
        max_concurrent: usize,
    ) -> Self {
        Self {
            source,
            errors,
            max_concurrent: max_concurrent.max(1),
        }
    }

    /// Download `items` into `dest_dir`, waiting for all of them
    ///
    /// `folder_label` only annotates error records.
    #[instrument(skip(self, items, dest_dir), fields(items = items.len(), folder = folder_label))]
    pub async fn run(
        &self,
        items: Vec<Item>,
        dest_dir: &Path,
        folder_label: &str,
    ) -> BatchOutcome {
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent));
        let mut handles: Vec<(ItemId, JoinHandle<DownloadResult>)> =
            Vec::with_capacity(items.len());

        for item in items {
            let id = item.id.clone();
            let source = Arc::clone(&self.source);
            let semaphore = Arc::clone(&semaphore);
            let dest = dest_dir.to_path_buf();

            let handle = tokio::spawn(async move {
                let _permit = semaphore.acquire_owned().await.map_err(|e| {
                    bridge_traits::error::BridgeError::OperationFailed(e.to_string())
                })?;
                source.download_item(&item, &dest).await
            });

            handles.push((id, handle));
        }

        let mut outcome = BatchOutcome::default();

        for (id, handle) in handles {
            let failure = match handle.await {
                Ok(Ok(Some(path))) => {
                    debug!(item_id = %id, path = %path.display(), "Item downloaded");
                    outcome.downloaded += 1;
                    None
                }
                Ok(Ok(None)) => {
                    debug!(item_id = %id, "Item has no content, skipped");
                    outcome.skipped += 1;
                    None
                }
                Ok(Err(e)) => Some(SyncError::from(e).to_string()),
                Err(join_error) => Some(format!("download task aborted: {}", join_error)),
            };

            if let Some(message) = failure {
                outcome.failed += 1;
                self.report(&id, folder_label, message).await;
            }
        }

        outcome
    }

    async fn report(&self, id: &ItemId, folder_label: &str, message: String) {
        let failure = SyncError::ItemDownload {
            item_id: id.to_string(),
            message,
        };
        error!(item_id = %id, folder = folder_label, error = %failure, "Item download failed");

        let entry = LogEntry::error("core_sync::batch", failure.to_string())
            .with_field("item_id", id.as_str())
            .with_field("folder", folder_label);

        if let Err(e) = self.errors.log(entry).await {
            error!(error = %e, "Failed to write to error channel");
        }
    }
}
