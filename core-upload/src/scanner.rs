//! Remote file lister
//!
//! Walks the source folder tree breadth-first from the configured root,
//! collecting video files at arbitrary depth. Folder listings are paginated
//! and retried with bounded backoff; a folder that stays unreadable is
//! recorded and skipped so one bad subtree cannot sink the run.

use bridge_traits::error::BridgeError;
use bridge_traits::http::RetryPolicy;
use bridge_traits::storage::{RemoteFile, StorageProvider};
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::error::{Result, UploadError};

/// Outcome of one folder tree walk.
///
/// `files` holds every video file reached; `failed_folders` the folders
/// skipped after exhausting listing retries. A non-empty `failed_folders`
/// means the candidate set may be incomplete.
#[derive(Debug, Default)]
pub struct ScanReport {
    pub files: Vec<RemoteFile>,
    pub failed_folders: Vec<String>,
}

impl ScanReport {
    pub fn is_complete(&self) -> bool {
        self.failed_folders.is_empty()
    }
}

/// Recursive folder tree scanner.
pub struct Scanner {
    storage: Arc<dyn StorageProvider>,
    retry_policy: RetryPolicy,
}

impl Scanner {
    pub fn new(storage: Arc<dyn StorageProvider>, list_retry_attempts: u32) -> Self {
        Self {
            storage,
            retry_policy: RetryPolicy {
                max_attempts: list_retry_attempts.max(1),
                ..RetryPolicy::default()
            },
        }
    }

    /// Override the backoff timing between listing retries.
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    /// Walk the tree rooted at `root_folder_id`.
    ///
    /// # Errors
    ///
    /// Returns [`UploadError::Config`] when the root folder does not
    /// resolve, and [`UploadError::Auth`] on credential rejection. Transient
    /// subfolder failures degrade to `failed_folders` instead of erroring.
    #[instrument(skip(self))]
    pub async fn scan(&self, root_folder_id: &str) -> Result<ScanReport> {
        let mut report = ScanReport::default();
        let mut pending: VecDeque<String> = VecDeque::new();
        pending.push_back(root_folder_id.to_string());

        while let Some(folder_id) = pending.pop_front() {
            let is_root = folder_id == root_folder_id;

            match self.list_folder(&folder_id).await {
                Ok(entries) => {
                    for entry in entries {
                        if entry.is_folder {
                            pending.push_back(entry.id);
                        } else if entry.is_video() {
                            report.files.push(entry);
                        } else {
                            debug!(name = %entry.name, "Skipping non-video entry");
                        }
                    }
                }
                Err(UploadError::Source(BridgeError::NotFound(_))) if is_root => {
                    return Err(UploadError::Config(format!(
                        "Root folder '{}' does not resolve",
                        root_folder_id
                    )));
                }
                Err(UploadError::Auth(msg)) => return Err(UploadError::Auth(msg)),
                Err(e) => {
                    warn!(folder_id = %folder_id, error = %e, "Folder left unscanned");
                    report.failed_folders.push(folder_id);
                }
            }
        }

        info!(
            files = report.files.len(),
            failed_folders = report.failed_folders.len(),
            "Folder tree scan finished"
        );
        Ok(report)
    }

    /// List one folder to exhaustion, retrying transient failures.
    async fn list_folder(&self, folder_id: &str) -> Result<Vec<RemoteFile>> {
        let mut entries = Vec::new();
        let mut page_token: Option<String> = None;
        let mut attempt = 0;

        loop {
            match self
                .storage
                .list_children(folder_id, page_token.clone())
                .await
            {
                Ok(page) => {
                    entries.extend(page.files);
                    match page.next_page_token {
                        Some(token) => page_token = Some(token),
                        None => return Ok(entries),
                    }
                }
                Err(e) if e.is_transient() => {
                    attempt += 1;
                    if attempt >= self.retry_policy.max_attempts {
                        return Err(e.into());
                    }
                    let backoff = self.retry_policy.delay_for_attempt(attempt);
                    warn!(
                        folder_id = %folder_id,
                        attempt,
                        backoff_ms = backoff.as_millis() as u64,
                        "Folder listing failed, retrying"
                    );
                    tokio::time::sleep(backoff).await;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}
