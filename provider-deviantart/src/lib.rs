//! # DeviantArt Provider
//!
//! Implements the `MediaSource` trait for the DeviantArt OAuth2 API v1.
//!
//! ## Overview
//!
//! This module provides:
//! - Paged gallery and collection folder listing
//! - Paged deviation listing, newest first
//! - Full-resolution or preview downloads with atomic file writes
//! - Extension resolution from content type, with a URI fallback

pub mod connector;
pub mod error;
pub mod mime;
pub mod types;

pub use connector::DeviantArtConnector;
pub use error::{DeviantArtError, Result};
