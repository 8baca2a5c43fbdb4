//! Run logger
//!
//! Appends one structured record per processed file to the configured sink.
//! Appends are best-effort: a sink outage is logged and counted, never
//! propagated, because a completed upload must not look failed just
//! because the ledger was unreachable.

use bridge_traits::logsink::{LogSink, RunLogEntry, RunLogStatus};
use bridge_traits::storage::RemoteFile;
use chrono::Utc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::warn;

pub struct RunLogger {
    sink: Arc<dyn LogSink>,
    action: String,
    dropped: AtomicUsize,
}

impl RunLogger {
    pub fn new(sink: Arc<dyn LogSink>, action: impl Into<String>) -> Self {
        Self {
            sink,
            action: action.into(),
            dropped: AtomicUsize::new(0),
        }
    }

    /// Number of entries lost to sink failures so far.
    pub fn dropped(&self) -> usize {
        self.dropped.load(Ordering::Relaxed)
    }

    pub async fn record_uploaded(
        &self,
        file: &RemoteFile,
        video_id: &str,
        video_url: &str,
        detail: String,
    ) {
        self.append(RunLogEntry {
            timestamp: Utc::now(),
            file_name: file.name.clone(),
            file_id: file.id.clone(),
            status: RunLogStatus::Uploaded,
            video_id: Some(video_id.to_string()),
            video_url: Some(video_url.to_string()),
            action: self.action.clone(),
            detail,
        })
        .await;
    }

    pub async fn record_action_failed(
        &self,
        file: &RemoteFile,
        video_id: &str,
        video_url: &str,
        reason: String,
    ) {
        self.append(RunLogEntry {
            timestamp: Utc::now(),
            file_name: file.name.clone(),
            file_id: file.id.clone(),
            status: RunLogStatus::UploadedActionFailed,
            video_id: Some(video_id.to_string()),
            video_url: Some(video_url.to_string()),
            action: self.action.clone(),
            detail: reason,
        })
        .await;
    }

    pub async fn record_upload_failed(&self, file: &RemoteFile, reason: String) {
        self.append(RunLogEntry {
            timestamp: Utc::now(),
            file_name: file.name.clone(),
            file_id: file.id.clone(),
            status: RunLogStatus::UploadFailed,
            video_id: None,
            video_url: None,
            action: self.action.clone(),
            detail: reason,
        })
        .await;
    }

    async fn append(&self, entry: RunLogEntry) {
        if let Err(e) = self.sink.append(entry).await {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            warn!(error = %e, "Run log append failed, entry dropped");
        }
    }
}
