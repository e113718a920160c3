//! # Sync Coordinator
//!
//! Orchestrates incremental mirroring of a user's galleries and collections.
//!
//! ## Overview
//!
//! The `SyncCoordinator` is the central orchestrator for sync operations. It
//! coordinates between the other modules to:
//! - Enumerate folders through a `MediaSource` under the `RetryPolicy`
//! - Resolve each folder's local directory
//! - Compare fetched pages against the folder's `IncrementalCache` marker
//! - Dispatch each page to a `DownloadBatch`
//! - Report every non-fatal failure to the error channel
//!
//! ## Workflow
//!
//! ### Folder sync
//! 1. Resolve the output directory for `(kind, folder)`
//! 2. Read the cache marker, unless a rebuild is forced
//! 3. Fetch pages in order, newest first
//! 4. Cut a page short where the marker appears and stop after it
//! 5. Download what remains of each page before fetching the next
//! 6. Write the newest item id as the new marker
//!
//! A listing call that exhausts its retries aborts only the folder being
//! synced; its marker is left untouched. A failure while enumerating folders
//! aborts the whole run.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use core_sync::{SyncConfig, SyncCoordinator};
//!
//! let coordinator = SyncCoordinator::new(config, source, filesystem, error_channel);
//! let summary = coordinator.run(&plan).await?;
//! println!("{} items downloaded", summary.items_downloaded);
//! ```

use crate::{
    batch::{BatchOutcome, DownloadBatch},
    cache::IncrementalCache,
    retry::RetryPolicy,
    Result, SyncError,
};
use bridge_traits::{
    sink::{LogEntry, LoggerSink},
    source::{Folder, FolderId, ItemId, MediaSource, PageResult, SourceKind},
    storage::FileSystemAccess,
};
use core_runtime::config::{DownloadPlan, FolderSelection, RunConfig};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

const ERROR_TARGET: &str = "core_sync::coordinator";

/// Sync coordinator configuration
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Directory holding everything mirrored for one user
    pub user_root: PathBuf,

    /// Ignore existing cache markers and walk every page
    pub force_rebuild: bool,

    /// Reattempt policy for listing calls
    pub retry: RetryPolicy,

    /// Maximum concurrently running downloads within one page
    pub max_concurrent_downloads: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            user_root: PathBuf::from("."),
            force_rebuild: false,
            retry: RetryPolicy::default(),
            max_concurrent_downloads: 20,
        }
    }
}

impl From<&RunConfig> for SyncConfig {
    fn from(config: &RunConfig) -> Self {
        Self {
            user_root: config.user_root(),
            force_rebuild: config.force_rebuild,
            retry: RetryPolicy::new(config.retry_attempts, config.retry_delay),
            max_concurrent_downloads: config.max_concurrent_downloads,
        }
    }
}

/// Result of one completed folder sync
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FolderOutcome {
    /// Listing calls that returned successfully
    pub pages_fetched: u32,
    /// Tallies over every batch dispatched for the folder
    pub items: BatchOutcome,
    /// Whether the previous marker was found
    pub reached_cache_boundary: bool,
    /// Marker written at the end, `None` for an empty folder
    pub new_marker: Option<ItemId>,
}

/// Totals for a whole run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub folders_synced: usize,
    pub folders_aborted: usize,
    pub items_downloaded: usize,
    pub items_skipped: usize,
    pub items_failed: usize,
}

impl RunSummary {
    fn record(&mut self, outcome: &Result<FolderOutcome>) {
        match outcome {
            Ok(folder) => {
                self.folders_synced += 1;
                self.items_downloaded += folder.items.downloaded;
                self.items_skipped += folder.items.skipped;
                self.items_failed += folder.items.failed;
            }
            Err(_) => self.folders_aborted += 1,
        }
    }
}

/// Folder names per source kind, for list-only mode
#[derive(Debug, Clone, Default)]
pub struct FolderListing {
    pub galleries: Vec<Folder>,
    pub collections: Vec<Folder>,
}

/// A selected folder paired with the directory it syncs into
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderTarget {
    pub folder: Folder,
    pub dir: PathBuf,
}

/// Make a remote folder name safe to use as one path component
pub fn sanitize_folder_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | '\0' => '_',
            other => other,
        })
        .collect();

    match cleaned.trim() {
        "" | "." | ".." => "_".to_string(),
        _ => cleaned,
    }
}

/// Sync coordinator for orchestrating synchronization
pub struct SyncCoordinator {
    /// Configuration
    config: SyncConfig,

    /// Remote listing and download client
    source: Arc<dyn MediaSource>,

    /// Error channel shared by every folder and batch
    errors: Arc<dyn LoggerSink>,

    cache: IncrementalCache,
    batch: DownloadBatch,
}

impl SyncCoordinator {
    /// Create a new sync coordinator
    ///
    /// # Arguments
    ///
    /// * `config` - Sync configuration
    /// * `source` - Authenticated media source
    /// * `filesystem` - File system holding cache markers
    /// * `errors` - Error channel for non-fatal failures
    pub fn new(
        config: SyncConfig,
        source: Arc<dyn MediaSource>,
        filesystem: Arc<dyn FileSystemAccess>,
        errors: Arc<dyn LoggerSink>,
    ) -> Self {
        let batch = DownloadBatch::new(
            Arc::clone(&source),
            Arc::clone(&errors),
            config.max_concurrent_downloads,
        );

        Self {
            config,
            source,
            errors,
            cache: IncrementalCache::new(filesystem),
            batch,
        }
    }

    /// Default output directory for `(kind, folder)`
    ///
    /// `None` addresses the "all items" pseudo-folder, stored as
    /// `<user_root>/GalleryAll`.
    pub fn folder_dir(&self, kind: SourceKind, folder: Option<&Folder>) -> PathBuf {
        match folder {
            None => self.config.user_root.join(format!("{}All", kind.dir_name())),
            Some(folder) => self
                .config
                .user_root
                .join(kind.dir_name())
                .join(sanitize_folder_name(&folder.name)),
        }
    }

    fn label(&self, kind: SourceKind, folder: Option<&Folder>) -> String {
        match folder {
            None => format!("{}All", kind.dir_name()),
            Some(folder) => format!("{}/{}", kind.dir_name(), folder.name),
        }
    }

    async fn report(&self, entry: LogEntry) {
        if let Err(e) = self.errors.log(entry).await {
            error!(error = %e, "Failed to write to error channel");
        }
    }

    /// Page through every folder of `kind`
    ///
    /// Folders are returned in remote order, de-duplicated by id. Exhausted
    /// retries abort the enumeration: there is no partial list to act on.
    #[instrument(skip(self))]
    pub async fn enumerate_folders(&self, kind: SourceKind) -> Result<Vec<Folder>> {
        let source = self.source.as_ref();
        let mut folders = Vec::new();
        let mut seen: HashSet<FolderId> = HashSet::new();
        let mut page_index = 0u32;

        loop {
            let page = match self
                .config
                .retry
                .execute("list_folders", move || source.list_folders(kind, page_index))
                .await
            {
                Ok(page) => page,
                Err(e) => {
                    error!(error = %e, page = page_index, "Folder enumeration failed");
                    let message = format!("Failed to fetch {} folders: {}", kind, e);
                    self.report(
                        LogEntry::error(ERROR_TARGET, message)
                            .with_field("source", kind.to_string())
                            .with_field("page", page_index.to_string()),
                    )
                    .await;
                    return Err(e);
                }
            };

            match page {
                PageResult::End => break,
                PageResult::EmptyButMore => {}
                PageResult::Page { items, has_more } => {
                    for folder in items {
                        if seen.insert(folder.id.clone()) {
                            folders.push(folder);
                        }
                    }
                    if !has_more {
                        break;
                    }
                }
            }
            page_index += 1;
        }

        debug!(count = folders.len(), "Enumerated folders");
        Ok(folders)
    }

    /// List folder names of both source kinds
    pub async fn list_folders(&self) -> Result<FolderListing> {
        Ok(FolderListing {
            galleries: self.enumerate_folders(SourceKind::Gallery).await?,
            collections: self.enumerate_folders(SourceKind::Collection).await?,
        })
    }

    /// Pick the folders to sync and give each its own directory
    ///
    /// When two selected folders share a display name, the first keeps
    /// `<name>` and later ones get `<name>-<id>`. Requested names that match
    /// no folder are reported to the error channel as warnings.
    pub async fn select_folders(
        &self,
        kind: SourceKind,
        folders: Vec<Folder>,
        selection: &FolderSelection,
    ) -> Vec<FolderTarget> {
        if let FolderSelection::Named(names) = selection {
            for name in names {
                if !folders.iter().any(|f| &f.name == name) {
                    warn!(folder = %name, source = %kind, "Requested folder not found");
                    self.report(
                        LogEntry::warn(ERROR_TARGET, "Requested folder not found")
                            .with_field("folder", name.as_str())
                            .with_field("source", kind.to_string()),
                    )
                    .await;
                }
            }
        }

        // Keyed on the final directory name so every folder owns its cache file
        let mut taken: HashSet<String> = HashSet::new();
        folders
            .into_iter()
            .filter(|folder| selection.matches(&folder.name))
            .map(|folder| {
                let base = sanitize_folder_name(&folder.name);
                let mut component = base.clone();
                if taken.contains(&component) {
                    component = sanitize_folder_name(&format!("{}-{}", base, folder.id));
                }
                let mut suffix = 2u32;
                while taken.contains(&component) {
                    component =
                        sanitize_folder_name(&format!("{}-{}-{}", base, folder.id, suffix));
                    suffix += 1;
                }
                taken.insert(component.clone());

                let dir = self
                    .config
                    .user_root
                    .join(kind.dir_name())
                    .join(component);
                FolderTarget { folder, dir }
            })
            .collect()
    }

    /// Sync one folder into its default directory
    pub async fn sync_folder(
        &self,
        kind: SourceKind,
        folder: Option<&Folder>,
    ) -> Result<FolderOutcome> {
        let dir = self.folder_dir(kind, folder);
        self.sync_folder_into(kind, folder, &dir).await
    }

    /// Sync one folder into `dir`
    ///
    /// Aborts, reporting to the error channel and leaving the marker
    /// untouched, when a listing call exhausts its retries or the marker
    /// cannot be read or written.
    #[instrument(skip(self, folder, dir), fields(folder = %self.label(kind, folder)))]
    pub async fn sync_folder_into(
        &self,
        kind: SourceKind,
        folder: Option<&Folder>,
        dir: &Path,
    ) -> Result<FolderOutcome> {
        let label = self.label(kind, folder);
        info!(dir = %dir.display(), "Syncing folder");

        let marker = if self.config.force_rebuild {
            None
        } else {
            match self.cache.read(dir).await {
                Ok(marker) => marker,
                Err(e) => {
                    self.report_folder_failure(&label, None, &e).await;
                    return Err(e);
                }
            }
        };
        debug!(marker = ?marker.as_ref().map(ItemId::as_str), "Cache marker");

        let source = self.source.as_ref();
        let mut outcome = FolderOutcome::default();
        let mut newest: Option<ItemId> = None;
        let mut page_index = 0u32;

        loop {
            let page = match self
                .config
                .retry
                .execute("list_items", move || source.list_items(kind, folder, page_index))
                .await
            {
                Ok(page) => page,
                Err(e) => {
                    self.report_folder_failure(&label, Some(page_index), &e).await;
                    return Err(e);
                }
            };
            outcome.pages_fetched += 1;

            let (mut items, has_more) = match page {
                PageResult::End => break,
                PageResult::EmptyButMore => {
                    debug!(page = page_index, "Empty page, continuing");
                    page_index += 1;
                    continue;
                }
                PageResult::Page { items, has_more } => (items, has_more),
            };

            if newest.is_none() {
                newest = items.first().map(|item| item.id.clone());
            }

            if let Some(marker) = marker.as_ref() {
                if let Some(position) = items.iter().position(|item| &item.id == marker) {
                    debug!(page = page_index, position, "Reached cache boundary");
                    items.truncate(position);
                    outcome.reached_cache_boundary = true;
                }
            }

            if !items.is_empty() {
                let batch = self.batch.run(items, dir, &label).await;
                outcome.items.merge(batch);
            }

            if outcome.reached_cache_boundary || !has_more {
                break;
            }
            page_index += 1;
        }

        if let Some(newest) = newest {
            if let Err(e) = self.cache.write(dir, &newest).await {
                self.report_folder_failure(&label, None, &e).await;
                return Err(e);
            }
            outcome.new_marker = Some(newest);
        } else {
            debug!("Folder is empty, cache marker not written");
        }

        info!(
            pages = outcome.pages_fetched,
            downloaded = outcome.items.downloaded,
            skipped = outcome.items.skipped,
            failed = outcome.items.failed,
            "Folder synced"
        );
        Ok(outcome)
    }

    async fn report_folder_failure(&self, label: &str, page: Option<u32>, e: &SyncError) {
        error!(folder = label, page = ?page, error = %e, "Folder sync aborted");

        let mut entry = LogEntry::error(ERROR_TARGET, format!("Folder sync aborted: {}", e))
            .with_field("folder", label);
        if let Some(page) = page {
            entry = entry.with_field("page", page.to_string());
        }
        self.report(entry).await;
    }

    async fn sync_targets(
        &self,
        kind: SourceKind,
        targets: Vec<FolderTarget>,
        summary: &mut RunSummary,
    ) {
        for target in targets {
            let outcome = self
                .sync_folder_into(kind, Some(&target.folder), &target.dir)
                .await;
            summary.record(&outcome);
        }
    }

    /// Execute a download plan
    ///
    /// Folders are synced one after another in this order: the gallery
    /// "all items" pseudo-folder, gallery folders, collection folders.
    ///
    /// # Errors
    ///
    /// Only folder enumeration failures are returned; per-folder failures
    /// are reported to the error channel and counted in the summary.
    #[instrument(skip(self, plan))]
    pub async fn run(&self, plan: &DownloadPlan) -> Result<RunSummary> {
        let mut summary = RunSummary::default();

        if plan.is_empty() {
            warn!("Nothing requested, no folders will be synced");
        }

        if plan.gallery_all {
            let outcome = self.sync_folder(SourceKind::Gallery, None).await;
            summary.record(&outcome);
        }

        if let Some(selection) = &plan.galleries {
            let folders = self.enumerate_folders(SourceKind::Gallery).await?;
            let targets = self
                .select_folders(SourceKind::Gallery, folders, selection)
                .await;
            self.sync_targets(SourceKind::Gallery, targets, &mut summary)
                .await;
        }

        if let Some(selection) = &plan.collections {
            let folders = self.enumerate_folders(SourceKind::Collection).await?;
            let targets = self
                .select_folders(SourceKind::Collection, folders, selection)
                .await;
            self.sync_targets(SourceKind::Collection, targets, &mut summary)
                .await;
        }

        info!(
            folders_synced = summary.folders_synced,
            folders_aborted = summary.folders_aborted,
            downloaded = summary.items_downloaded,
            failed = summary.items_failed,
            "Run complete"
        );
        Ok(summary)
    }
}
