//! Chunked uploader
//!
//! Streams one source file into a resumable platform session: pull a byte
//! range from storage, push it as a chunk, and follow the offset the
//! platform acknowledges. Transient failures consume attempts from a
//! bounded budget; after each one the session is probed so acknowledged
//! bytes are never re-sent. A session that cannot be recovered is replaced
//! with a fresh one, restarting from zero.

use bridge_traits::error::BridgeError;
use bridge_traits::http::RetryPolicy;
use bridge_traits::storage::StorageProvider;
use bridge_traits::video::{ChunkOutcome, UploadSession, VideoPlatform};
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::error::{Result, UploadError};
use crate::task::UploadTask;

pub struct Uploader {
    storage: Arc<dyn StorageProvider>,
    platform: Arc<dyn VideoPlatform>,
    chunk_size: u64,
    retry_policy: RetryPolicy,
}

impl Uploader {
    pub fn new(
        storage: Arc<dyn StorageProvider>,
        platform: Arc<dyn VideoPlatform>,
        chunk_size: u64,
        max_attempts: u32,
    ) -> Self {
        Self {
            storage,
            platform,
            chunk_size,
            retry_policy: RetryPolicy {
                max_attempts: max_attempts.max(1),
                base_delay: Duration::from_secs(1),
                max_delay: Duration::from_secs(64),
                use_exponential_backoff: true,
            },
        }
    }

    /// Override the backoff timing between attempts.
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    /// Upload one task, returning the platform video identifier.
    ///
    /// # Errors
    ///
    /// [`UploadError::Auth`] on credential rejection (fatal for the run),
    /// [`UploadError::UploadFailed`] once the attempt budget is exhausted,
    /// [`UploadError::Source`] for terminal per-file API rejections.
    #[instrument(skip(self, task), fields(file = %task.file.name, bytes = task.total_bytes))]
    pub async fn upload(&self, task: &UploadTask) -> Result<String> {
        let total = task.total_bytes;
        let mut attempts: u32 = 0;

        'session: loop {
            let mut session = match self.platform.begin_upload(&task.metadata, total).await {
                Ok(session) => session,
                Err(e) if e.is_transient() => {
                    self.consume_attempt(&mut attempts, &e).await?;
                    continue 'session;
                }
                Err(e) => return Err(e.into()),
            };

            let mut offset: u64 = 0;

            loop {
                if offset >= total {
                    // All bytes acknowledged but no completion yet
                    match session.probe_offset().await {
                        Ok(ChunkOutcome::Complete { video_id }) => {
                            info!(video_id = %video_id, "Upload complete");
                            return Ok(video_id);
                        }
                        Ok(ChunkOutcome::Incomplete { next_offset }) => {
                            if next_offset >= total {
                                let e = stalled(offset, next_offset);
                                self.consume_attempt(&mut attempts, &e).await?;
                            }
                            offset = next_offset.min(total);
                        }
                        Err(e) if e.is_transient() => {
                            self.consume_attempt(&mut attempts, &e).await?;
                        }
                        Err(e) => return Err(e.into()),
                    }
                    continue;
                }

                let len = self.chunk_size.min(total - offset);
                let chunk = match self.storage.download_range(&task.file.id, offset, len).await {
                    Ok(chunk) => chunk,
                    Err(e) if e.is_transient() => {
                        self.consume_attempt(&mut attempts, &e).await?;
                        continue;
                    }
                    Err(e) => return Err(e.into()),
                };

                match session.put_chunk(offset, chunk).await {
                    Ok(ChunkOutcome::Complete { video_id }) => {
                        info!(video_id = %video_id, "Upload complete");
                        return Ok(video_id);
                    }
                    Ok(ChunkOutcome::Incomplete { next_offset }) => {
                        // A 308 with no Range header acknowledges nothing;
                        // count it against the budget.
                        if next_offset <= offset {
                            let e = stalled(offset, next_offset);
                            self.consume_attempt(&mut attempts, &e).await?;
                        } else {
                            debug!(next_offset, "Chunk acknowledged");
                        }
                        offset = next_offset;
                    }
                    Err(e) if e.is_transient() => {
                        self.consume_attempt(&mut attempts, &e).await?;
                        match session.probe_offset().await {
                            Ok(ChunkOutcome::Complete { video_id }) => {
                                info!(video_id = %video_id, "Upload completed during recovery");
                                return Ok(video_id);
                            }
                            Ok(ChunkOutcome::Incomplete { next_offset }) => {
                                debug!(next_offset, "Resuming from acknowledged offset");
                                offset = next_offset;
                            }
                            Err(probe_err) => {
                                warn!(error = %probe_err, "Session unrecoverable, starting over");
                                continue 'session;
                            }
                        }
                    }
                    Err(BridgeError::NotFound(msg)) => {
                        // Session expired server-side
                        let e = BridgeError::NotFound(msg);
                        self.consume_attempt(&mut attempts, &e).await?;
                        continue 'session;
                    }
                    Err(e) => return Err(e.into()),
                }
            }
        }
    }

    /// Count one failed attempt and sleep with jittered backoff, or fail
    /// the task when the budget is spent.
    async fn consume_attempt(&self, attempts: &mut u32, error: &BridgeError) -> Result<()> {
        *attempts += 1;
        if *attempts >= self.retry_policy.max_attempts {
            warn!(attempts = *attempts, error = %error, "Upload attempt budget exhausted");
            return Err(UploadError::UploadFailed {
                attempts: *attempts,
                message: error.to_string(),
            });
        }

        let backoff = self.backoff(*attempts);
        warn!(
            attempt = *attempts,
            error = %error,
            backoff_ms = backoff.as_millis() as u64,
            "Transient upload failure, backing off"
        );
        tokio::time::sleep(backoff).await;
        Ok(())
    }

    fn backoff(&self, attempt: u32) -> Duration {
        let base = self.retry_policy.delay_for_attempt(attempt);
        let jitter_cap = self.retry_policy.base_delay.as_millis().max(1) as u64;
        base + Duration::from_millis(rand::thread_rng().gen_range(0..jitter_cap))
    }
}

fn stalled(offset: u64, next_offset: u64) -> BridgeError {
    BridgeError::OperationFailed(format!(
        "upload stalled at offset {} (platform acknowledged {})",
        offset, next_offset
    ))
}
