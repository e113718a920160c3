//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for the mirroring tool:
//! - Logging and tracing infrastructure
//! - Run configuration
//! - The shared error channel
//!
//! ## Overview
//!
//! This crate contains the runtime utilities that other modules depend on.
//! It establishes the logging conventions, the immutable configuration value
//! built once per run, and the single sink every non-fatal failure is
//! reported to.

pub mod channel;
pub mod config;
pub mod error;
pub mod logging;

pub use channel::ErrorChannel;
pub use config::{DownloadPlan, FolderSelection, RunConfig, RunConfigBuilder};
pub use error::{Error, Result};
