//! # Google Drive Provider
//!
//! Implements the `StorageProvider` trait for Google Drive API v3.
//!
//! ## Overview
//!
//! This crate provides:
//! - Folder-scoped, paginated file listing with property and label projections
//! - Range downloads for chunked transfers
//! - Rename, move and delete mutations for post-upload actions
//! - Drive Labels catalog listing for tag derivation
//! - Rate limiting and exponential backoff

pub mod connector;
pub mod error;
pub mod types;

pub use connector::GoogleDriveConnector;
pub use error::{GoogleDriveError, Result};
