//! # Host Bridge Traits
//!
//! Seams between the mirroring core and the outside world.
//!
//! ## Overview
//!
//! This crate defines the contract between the sync engine and the concrete
//! adapters that talk to the network, the local disk and the remote media
//! service. Each trait represents a capability that the core requires but
//! that is implemented elsewhere (desktop adapters, the DeviantArt connector,
//! or test doubles).
//!
//! ## Traits
//!
//! ### Networking & I/O
//! - [`HttpClient`](http::HttpClient) - Single-attempt async HTTP operations
//! - [`FileSystemAccess`](storage::FileSystemAccess) - Directory creation, file I/O, renames
//!
//! ### Remote media
//! - [`MediaSource`](source::MediaSource) - Paged folder/item listing and item download
//!
//! ### Error reporting
//! - [`LoggerSink`](sink::LoggerSink) - The shared error channel
//!
//! ## Error Handling
//!
//! All bridge traits use the [`BridgeError`](error::BridgeError) type. Adapters
//! should convert their own errors into `BridgeError`, keeping I/O failures in
//! the [`Io`](error::BridgeError::Io) variant so callers can tell a local
//! filesystem problem apart from a remote one.
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` bounds so a single adapter can be
//! shared by every download task of a batch.

pub mod error;
pub mod http;
pub mod sink;
pub mod source;
pub mod storage;

pub use error::BridgeError;

// Re-export commonly used types
pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
pub use sink::{LogEntry, LogLevel, LoggerSink};
pub use source::{Folder, FolderId, Item, ItemId, MediaSource, PageResult, SourceKind};
pub use storage::FileSystemAccess;
