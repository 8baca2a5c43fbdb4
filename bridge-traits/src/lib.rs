//! # External Collaborator Traits
//!
//! Seam traits between the upload engine and its external collaborators.
//!
//! ## Overview
//!
//! This crate defines the contract between the reconciliation/upload core
//! and the services it consumes. Each trait represents a capability with at
//! least one real implementation (Google Drive, YouTube, reqwest) and a
//! mockable surface for tests.
//!
//! ## Traits
//!
//! ### Networking
//! - [`HttpClient`](http::HttpClient) - Async HTTP with retry policy and TLS
//! - [`TokenProvider`](token::TokenProvider) - Bearer token supply; acquisition is external
//!
//! ### Source storage
//! - [`StorageProvider`](storage::StorageProvider) - Paginated folder listing,
//!   ranged downloads, rename/move/delete
//!
//! ### Destination platform
//! - [`VideoPlatform`](video::VideoPlatform) - Channel inventory + resumable uploads
//! - [`UploadSession`](video::UploadSession) - One in-flight chunked transfer
//!
//! ### Configuration & logging
//! - [`SettingsSource`](settings::SettingsSource) - One layer of the settings
//!   precedence chain
//! - [`LogSink`](logsink::LogSink) - Append-only run log
//!
//! ## Error Handling
//!
//! All traits use [`BridgeError`](error::BridgeError). Implementations
//! convert service-specific failures so the engine can classify them:
//! `Unauthorized` is fatal for a run, `Api { status: 429 | 5xx }` and
//! `Timeout` are transient and retried with bounded backoff.
//!
//! ## Thread Safety
//!
//! All traits require `Send + Sync` bounds (except [`UploadSession`], which
//! is owned by a single task) to support safe concurrent usage.

pub mod error;
pub mod http;
pub mod logsink;
pub mod settings;
pub mod storage;
pub mod token;
pub mod video;

pub use error::BridgeError;

// Re-export commonly used types
pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse, RetryPolicy};
pub use logsink::{LogSink, MemoryLogSink, RunLogEntry, RunLogStatus};
pub use settings::{MapSettings, SettingsSource};
pub use storage::{FilePage, RemoteFile, StorageProvider};
pub use token::{StaticToken, TokenProvider};
pub use video::{ChannelVideo, ChunkOutcome, Privacy, UploadSession, VideoMetadata, VideoPage, VideoPlatform};
