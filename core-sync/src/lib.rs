//! # Incremental Sync Module
//!
//! Mirrors a user's remote galleries and collections into a local directory
//! tree, fetching only what appeared since the previous run.
//!
//! ## Overview
//!
//! This module drives one mirroring run, including:
//! - Paging through remote folders and items via `MediaSource`
//! - Reattempting failed listing calls
//! - Stopping at the item recorded by the previous run
//! - Downloading each page with bounded concurrency
//! - Reporting per-item and per-folder failures to the error channel
//!
//! ## Components
//!
//! - **Retry Policy** (`retry`): Bounded reattempts around one remote call
//! - **Incremental Cache** (`cache`): Per-folder newest-item marker
//! - **Download Batch** (`batch`): Concurrent, failure-isolated page download
//! - **Sync Coordinator** (`coordinator`): Folder enumeration and page loop

pub mod batch;
pub mod cache;
pub mod coordinator;
pub mod error;
pub mod retry;

pub use batch::{BatchOutcome, DownloadBatch};
pub use cache::{IncrementalCache, CACHE_FILE_NAME};
pub use coordinator::{
    sanitize_folder_name, FolderListing, FolderOutcome, FolderTarget, RunSummary, SyncConfig,
    SyncCoordinator,
};
pub use error::{Result, SyncError};
pub use retry::RetryPolicy;
