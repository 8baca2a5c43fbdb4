//! Run Log Sink Abstraction
//!
//! The engine appends one structured record per processed file to an
//! external sink (a sheet, table, or stream). Entries are write-once; a
//! sink failure must never abort or roll back a completed upload.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Final status recorded for one processed file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunLogStatus {
    /// Upload and post-upload action both succeeded
    Uploaded,

    /// Upload succeeded but the post-upload action failed;
    /// the video remains published
    UploadedActionFailed,

    /// Upload failed after exhausting retries
    UploadFailed,
}

/// Append-only record of one processed upload task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunLogEntry {
    pub timestamp: DateTime<Utc>,
    pub file_name: String,
    pub file_id: String,
    pub status: RunLogStatus,
    /// Platform video identifier, present on upload success
    pub video_id: Option<String>,
    /// Canonical watch URL, present on upload success
    pub video_url: Option<String>,
    /// Post-upload action that was configured for the run
    pub action: String,
    /// Action outcome or failure reason
    pub detail: String,
}

/// External log sink trait
#[async_trait]
pub trait LogSink: Send + Sync {
    /// Append one entry. Prior entries are never overwritten.
    async fn append(&self, entry: RunLogEntry) -> Result<()>;
}

/// In-memory log sink for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryLogSink {
    entries: std::sync::Mutex<Vec<RunLogEntry>>,
}

impl MemoryLogSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<RunLogEntry> {
        self.entries.lock().expect("log sink poisoned").clone()
    }
}

#[async_trait]
impl LogSink for MemoryLogSink {
    async fn append(&self, entry: RunLogEntry) -> Result<()> {
        self.entries.lock().expect("log sink poisoned").push(entry);
        Ok(())
    }
}
