//! # YouTube Provider
//!
//! Implements the `VideoPlatform` trait for YouTube Data API v3.
//!
//! ## Overview
//!
//! This crate provides:
//! - Channel uploads inventory via the uploads playlist, paged to exhaustion
//! - Resumable chunked uploads with offset probing after interruptions
//! - Rate limiting and exponential backoff on metadata calls
//! - Watch URL construction for run reporting

pub mod connector;
pub mod error;
pub mod types;
pub mod upload;

pub use connector::YouTubeConnector;
pub use error::{Result, YouTubeError};
pub use upload::ResumableUploadSession;
