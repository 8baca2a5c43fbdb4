//! Video Platform Abstractions
//!
//! Traits for the destination video platform: channel inventory listing and
//! resumable, chunk-level uploads.

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::Result;

/// A video already published on the destination channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelVideo {
    /// Platform-assigned, stable video identifier
    pub id: String,

    /// Video title as shown on the platform
    pub title: String,
}

/// One page of a channel uploads listing.
#[derive(Debug, Clone, Default)]
pub struct VideoPage {
    pub videos: Vec<ChannelVideo>,
    pub next_page_token: Option<String>,
}

/// Visibility of an uploaded video.
///
/// Bulk uploads default to `Unlisted`; the engine never publishes publicly
/// on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Privacy {
    #[default]
    Unlisted,
    Private,
    Public,
}

impl Privacy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Privacy::Unlisted => "unlisted",
            Privacy::Private => "private",
            Privacy::Public => "public",
        }
    }
}

/// Metadata attached to a new upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoMetadata {
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub privacy: Privacy,
    pub made_for_kids: bool,
}

impl VideoMetadata {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            tags: Vec::new(),
            privacy: Privacy::default(),
            made_for_kids: false,
        }
    }
}

/// Result of transferring one chunk into an upload session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChunkOutcome {
    /// The platform acknowledged bytes up to (but not including)
    /// `next_offset`; send the next chunk from there.
    Incomplete { next_offset: u64 },

    /// All bytes received; the platform assigned a video identifier.
    Complete { video_id: String },
}

/// An in-flight resumable upload.
///
/// Progress is tracked by byte offset. After a transient chunk failure the
/// caller asks the session for its acknowledged offset via
/// [`probe_offset`](UploadSession::probe_offset) and resumes from there,
/// never re-sending acknowledged bytes.
#[async_trait]
pub trait UploadSession: Send {
    /// Transfer one chunk starting at `offset`.
    async fn put_chunk(&mut self, offset: u64, chunk: Bytes) -> Result<ChunkOutcome>;

    /// Ask the platform how many bytes it has durably received.
    ///
    /// Returns `Incomplete { next_offset }` (0 if nothing was received), or
    /// `Complete` when the interrupted final chunk actually landed.
    async fn probe_offset(&mut self) -> Result<ChunkOutcome>;
}

/// Destination video platform trait
#[async_trait]
pub trait VideoPlatform: Send + Sync {
    /// List the channel's uploads collection, one page at a time.
    ///
    /// `channel_id = None` means the authenticated user's own channel.
    /// Reconciliation correctness requires callers to page to exhaustion.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Unauthorized`](crate::BridgeError::Unauthorized)
    /// when credentials are invalid or insufficiently scoped.
    async fn list_channel_uploads(
        &self,
        channel_id: Option<&str>,
        page_token: Option<String>,
    ) -> Result<VideoPage>;

    /// Open a resumable upload session for a video of `total_bytes` bytes.
    async fn begin_upload(
        &self,
        metadata: &VideoMetadata,
        total_bytes: u64,
    ) -> Result<Box<dyn UploadSession>>;

    /// Canonical watch URL for a published video.
    fn watch_url(&self, video_id: &str) -> String;
}
