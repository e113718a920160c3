//! # Run Configuration
//!
//! The immutable value describing one invocation: whose content to mirror,
//! where to put it, which folders to fetch and how hard to try.
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::{RunConfig, FolderSelection};
//!
//! let config = RunConfig::builder()
//!     .username("someartist")
//!     .output_root("/srv/mirror")
//!     .gallery_all(true)
//!     .collections(FolderSelection::All)
//!     .build()?;
//! ```

use crate::error::{Error, Result};
use std::path::PathBuf;
use std::time::Duration;

/// Default location of the client credentials file
pub const DEFAULT_CREDENTIALS_PATH: &str = "creds/creds.json";

/// Default upper bound on concurrently running item downloads
pub const DEFAULT_MAX_CONCURRENT_DOWNLOADS: usize = 20;

/// Default number of attempts per remote call
pub const DEFAULT_RETRY_ATTEMPTS: u32 = 3;

/// Which folders of one source kind to sync
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FolderSelection {
    /// Every folder the source lists
    All,
    /// Only folders whose name matches one of these
    Named(Vec<String>),
}

impl FolderSelection {
    /// Build a selection from an optional list of names; an empty list means all
    pub fn from_names(names: Vec<String>) -> Self {
        if names.is_empty() {
            FolderSelection::All
        } else {
            FolderSelection::Named(names)
        }
    }

    pub fn matches(&self, folder_name: &str) -> bool {
        match self {
            FolderSelection::All => true,
            FolderSelection::Named(names) => names.iter().any(|n| n == folder_name),
        }
    }
}

/// What to download in one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DownloadPlan {
    /// Sync the gallery "all items" pseudo-folder
    pub gallery_all: bool,
    /// Gallery folders to sync
    pub galleries: Option<FolderSelection>,
    /// Collection folders to sync
    pub collections: Option<FolderSelection>,
}

impl DownloadPlan {
    pub fn is_empty(&self) -> bool {
        !self.gallery_all && self.galleries.is_none() && self.collections.is_none()
    }
}

/// Complete configuration for one run
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub username: String,
    pub output_root: PathBuf,
    pub credentials_path: PathBuf,
    /// Where failures are reported; `None` means stderr
    pub error_output: Option<PathBuf>,
    /// Print folder names instead of downloading
    pub list_only: bool,
    /// Ignore existing cache markers
    pub force_rebuild: bool,
    pub plan: DownloadPlan,
    pub retry_attempts: u32,
    pub retry_delay: Duration,
    pub max_concurrent_downloads: usize,
    pub request_timeout: Duration,
}

impl RunConfig {
    pub fn builder() -> RunConfigBuilder {
        RunConfigBuilder::default()
    }

    /// Root directory for everything mirrored for this user
    pub fn user_root(&self) -> PathBuf {
        self.output_root.join(&self.username)
    }
}

/// Builder for [`RunConfig`]
#[derive(Debug, Default)]
pub struct RunConfigBuilder {
    username: Option<String>,
    output_root: Option<PathBuf>,
    credentials_path: Option<PathBuf>,
    error_output: Option<PathBuf>,
    list_only: bool,
    force_rebuild: bool,
    plan: DownloadPlan,
    retry_attempts: Option<u32>,
    retry_delay: Option<Duration>,
    max_concurrent_downloads: Option<usize>,
    request_timeout: Option<Duration>,
}

impl RunConfigBuilder {
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn output_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_root = Some(path.into());
        self
    }

    pub fn credentials_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.credentials_path = Some(path.into());
        self
    }

    pub fn error_output(mut self, path: Option<PathBuf>) -> Self {
        self.error_output = path;
        self
    }

    pub fn list_only(mut self, list_only: bool) -> Self {
        self.list_only = list_only;
        self
    }

    pub fn force_rebuild(mut self, force: bool) -> Self {
        self.force_rebuild = force;
        self
    }

    pub fn gallery_all(mut self, enabled: bool) -> Self {
        self.plan.gallery_all = enabled;
        self
    }

    pub fn galleries(mut self, selection: FolderSelection) -> Self {
        self.plan.galleries = Some(selection);
        self
    }

    pub fn collections(mut self, selection: FolderSelection) -> Self {
        self.plan.collections = Some(selection);
        self
    }

    pub fn retry_attempts(mut self, attempts: u32) -> Self {
        self.retry_attempts = Some(attempts);
        self
    }

    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = Some(delay);
        self
    }

    pub fn max_concurrent_downloads(mut self, limit: usize) -> Self {
        self.max_concurrent_downloads = Some(limit);
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Validate and build the configuration
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when the username is missing or blank, when
    /// the retry or concurrency limits are zero, or when a named folder
    /// selection is empty.
    pub fn build(self) -> Result<RunConfig> {
        let username = self
            .username
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty())
            .ok_or_else(|| Error::Config("A username is required".to_string()))?;

        if username.contains('/') || username.contains('\\') {
            return Err(Error::Config(format!(
                "Username contains a path separator: {}",
                username
            )));
        }

        let retry_attempts = self.retry_attempts.unwrap_or(DEFAULT_RETRY_ATTEMPTS);
        if retry_attempts == 0 {
            return Err(Error::Config(
                "retry_attempts must be at least 1".to_string(),
            ));
        }

        let max_concurrent_downloads = self
            .max_concurrent_downloads
            .unwrap_or(DEFAULT_MAX_CONCURRENT_DOWNLOADS);
        if max_concurrent_downloads == 0 {
            return Err(Error::Config(
                "max_concurrent_downloads must be at least 1".to_string(),
            ));
        }

        for selection in [&self.plan.galleries, &self.plan.collections]
            .into_iter()
            .flatten()
        {
            if let FolderSelection::Named(names) = selection {
                if names.is_empty() {
                    return Err(Error::Config(
                        "A named folder selection must list at least one folder".to_string(),
                    ));
                }
            }
        }

        Ok(RunConfig {
            username,
            output_root: self.output_root.unwrap_or_else(|| PathBuf::from(".")),
            credentials_path: self
                .credentials_path
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CREDENTIALS_PATH)),
            error_output: self.error_output,
            list_only: self.list_only,
            force_rebuild: self.force_rebuild,
            plan: self.plan,
            retry_attempts,
            retry_delay: self.retry_delay.unwrap_or(Duration::ZERO),
            max_concurrent_downloads,
            request_timeout: self.request_timeout.unwrap_or(Duration::from_secs(60)),
        })
    }
}
