//! # Upload Coordinator
//!
//! Orchestrates one reconciliation-and-upload run end to end.
//!
//! ## Workflow
//!
//! 1. Fetch the label catalog when tag derivation from labels is enabled
//! 2. Scan the source folder tree and fetch the channel inventory,
//!    concurrently
//! 3. Reconcile: drop every file whose normalized name matches a published
//!    video id
//! 4. For each pending file, strictly in sequence: upload, then apply the
//!    post-upload action, then append a run log entry
//! 5. Return a [`RunSummary`]
//!
//! Configuration and credential failures abort before any upload. Per-file
//! failures are contained: the run continues with the next file, and a
//! failed file simply remains pending for the next run. An interrupted run
//! needs no cleanup for the same reason; whatever was not confirmed
//! uploaded is re-matched from scratch next time.

use bridge_traits::logsink::LogSink;
use bridge_traits::storage::StorageProvider;
use bridge_traits::video::VideoPlatform;
use core_runtime::settings::RunSettings;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info, instrument};

use crate::error::{Result, UploadError};
use crate::inventory::fetch_inventory;
use crate::post_action::apply_post_action;
use crate::reconcile::reconcile;
use crate::run_log::RunLogger;
use crate::scanner::Scanner;
use crate::task::build_task;
use crate::uploader::Uploader;

/// Outcome counts for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Video files discovered by the scan
    pub scanned: usize,

    /// Files recognized as already uploaded
    pub skipped: usize,

    /// Files uploaded this run (post-action failures still count here)
    pub uploaded: usize,

    /// Files whose upload failed
    pub failed: usize,

    /// False when some folders could not be listed; the candidate set may
    /// be incomplete and the next run will pick up what was missed
    pub scan_complete: bool,
}

pub struct UploadCoordinator {
    storage: Arc<dyn StorageProvider>,
    platform: Arc<dyn VideoPlatform>,
    log_sink: Arc<dyn LogSink>,
}

impl UploadCoordinator {
    pub fn new(
        storage: Arc<dyn StorageProvider>,
        platform: Arc<dyn VideoPlatform>,
        log_sink: Arc<dyn LogSink>,
    ) -> Self {
        Self {
            storage,
            platform,
            log_sink,
        }
    }

    /// Execute one run against an already validated settings snapshot.
    ///
    /// # Errors
    ///
    /// [`UploadError::Config`] and [`UploadError::Auth`] abort the run with
    /// nothing uploaded. Per-file upload failures do not error; they are
    /// counted in the summary and logged to the sink.
    #[instrument(skip(self, settings), fields(root = %settings.root_folder_id))]
    pub async fn run(&self, settings: &RunSettings) -> Result<RunSummary> {
        let labels: HashMap<String, String> = if settings.fetch_labels {
            self.storage.list_labels().await.map_err(UploadError::from)?
        } else {
            HashMap::new()
        };

        let scanner = Scanner::new(self.storage.clone(), settings.list_retry_attempts);
        let (scan, inventory) = tokio::join!(
            scanner.scan(&settings.root_folder_id),
            fetch_inventory(self.platform.as_ref(), settings.channel_id.as_deref()),
        );
        let scan = scan?;
        let inventory = inventory?;

        let scanned = scan.files.len();
        let scan_complete = scan.is_complete();
        let reconciliation = reconcile(scan.files, &inventory);

        let uploader = Uploader::new(
            self.storage.clone(),
            self.platform.clone(),
            settings.chunk_size_bytes,
            settings.max_upload_attempts,
        );
        let logger = RunLogger::new(self.log_sink.clone(), settings.post_upload_action.as_str());

        let mut uploaded = 0;
        let mut failed = 0;

        for file in reconciliation.pending {
            let task = match build_task(file.clone(), settings, &labels) {
                Ok(task) => task,
                Err(e) => {
                    error!(file = %file.name, error = %e, "Task construction failed");
                    failed += 1;
                    logger.record_upload_failed(&file, e.to_string()).await;
                    continue;
                }
            };

            match uploader.upload(&task).await {
                Ok(video_id) => {
                    uploaded += 1;
                    let video_url = self.platform.watch_url(&video_id);
                    info!(file = %task.file.name, video_id = %video_id, "Uploaded");

                    match apply_post_action(
                        self.storage.as_ref(),
                        settings,
                        &task.file,
                        &video_id,
                    )
                    .await
                    {
                        Ok(detail) => {
                            logger
                                .record_uploaded(&task.file, &video_id, &video_url, detail)
                                .await;
                        }
                        Err(e) => {
                            error!(file = %task.file.name, error = %e, "Post-upload action failed");
                            logger
                                .record_action_failed(
                                    &task.file,
                                    &video_id,
                                    &video_url,
                                    e.to_string(),
                                )
                                .await;
                        }
                    }
                }
                Err(UploadError::Auth(msg)) => return Err(UploadError::Auth(msg)),
                Err(e) => {
                    failed += 1;
                    error!(file = %task.file.name, error = %e, "Upload failed");
                    logger.record_upload_failed(&task.file, e.to_string()).await;
                }
            }
        }

        let summary = RunSummary {
            scanned,
            skipped: reconciliation.skipped,
            uploaded,
            failed,
            scan_complete,
        };
        info!(?summary, "Run finished");
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::error::{BridgeError, Result as BridgeResult};
    use bridge_traits::logsink::{MemoryLogSink, RunLogStatus};
    use bridge_traits::storage::{FilePage, RemoteFile};
    use bridge_traits::video::{
        ChannelVideo, ChunkOutcome, UploadSession, VideoMetadata, VideoPage,
    };
    use bytes::Bytes;
    use core_runtime::settings::PostUploadAction;
    use mockall::mock;

    mock! {
        Storage {}

        #[async_trait]
        impl StorageProvider for Storage {
            async fn list_children(
                &self,
                folder_id: &str,
                page_token: Option<String>,
            ) -> BridgeResult<FilePage>;
            async fn download_range(&self, file_id: &str, offset: u64, len: u64) -> BridgeResult<Bytes>;
            async fn rename(&self, file_id: &str, new_name: &str) -> BridgeResult<()>;
            async fn move_to_folder(&self, file_id: &str, target_folder_id: &str) -> BridgeResult<()>;
            async fn delete(&self, file_id: &str) -> BridgeResult<()>;
            async fn list_labels(&self) -> BridgeResult<HashMap<String, String>>;
        }
    }

    // mockall cannot mock an async-trait method whose argument is a generic
    // type holding a non-'static reference (`Option<&str>`), so the methods
    // are mocked as inherent sync methods and the trait impl delegates.
    mock! {
        Platform {
            fn list_channel_uploads(
                &self,
                channel_id: Option<String>,
                page_token: Option<String>,
            ) -> BridgeResult<VideoPage>;
            fn begin_upload(
                &self,
                metadata: VideoMetadata,
                total_bytes: u64,
            ) -> BridgeResult<Box<dyn UploadSession>>;
            fn watch_url(&self, video_id: String) -> String;
        }
    }

    #[async_trait]
    impl VideoPlatform for MockPlatform {
        async fn list_channel_uploads(
            &self,
            channel_id: Option<&str>,
            page_token: Option<String>,
        ) -> BridgeResult<VideoPage> {
            MockPlatform::list_channel_uploads(self, channel_id.map(str::to_string), page_token)
        }

        async fn begin_upload(
            &self,
            metadata: &VideoMetadata,
            total_bytes: u64,
        ) -> BridgeResult<Box<dyn UploadSession>> {
            MockPlatform::begin_upload(self, metadata.clone(), total_bytes)
        }

        fn watch_url(&self, video_id: &str) -> String {
            MockPlatform::watch_url(self, video_id.to_string())
        }
    }

    /// Session that accepts everything in one chunk.
    struct OneShotSession {
        video_id: String,
    }

    #[async_trait]
    impl UploadSession for OneShotSession {
        async fn put_chunk(&mut self, _offset: u64, _chunk: Bytes) -> BridgeResult<ChunkOutcome> {
            Ok(ChunkOutcome::Complete {
                video_id: self.video_id.clone(),
            })
        }

        async fn probe_offset(&mut self) -> BridgeResult<ChunkOutcome> {
            Ok(ChunkOutcome::Incomplete { next_offset: 0 })
        }
    }

    fn settings() -> RunSettings {
        RunSettings {
            root_folder_id: "root".to_string(),
            channel_id: Some("UCx".to_string()),
            post_upload_action: PostUploadAction::Rename,
            completed_folder_id: None,
            default_description: "bulk upload".to_string(),
            fetch_labels: false,
            chunk_size_bytes: 256 * 1024,
            max_upload_attempts: 1,
            list_retry_attempts: 1,
        }
    }

    fn video_file(id: &str, name: &str) -> RemoteFile {
        RemoteFile {
            id: id.to_string(),
            name: name.to_string(),
            mime_type: Some("video/mp4".to_string()),
            size: Some(2048),
            parent_ids: vec!["root".to_string()],
            description: None,
            properties: HashMap::new(),
            label_ids: vec![],
            is_folder: false,
        }
    }

    fn storage_with_tree(files: Vec<RemoteFile>) -> MockStorage {
        let mut storage = MockStorage::new();
        storage.expect_list_children().returning(move |_, _| {
            Ok(FilePage {
                files: files.clone(),
                next_page_token: None,
            })
        });
        storage
            .expect_download_range()
            .returning(|_, _, len| Ok(Bytes::from(vec![0u8; len as usize])));
        storage
    }

    fn platform_with_inventory(ids: &[&str]) -> MockPlatform {
        let videos: Vec<ChannelVideo> = ids
            .iter()
            .map(|id| ChannelVideo {
                id: id.to_string(),
                title: id.to_string(),
            })
            .collect();

        let mut platform = MockPlatform::new();
        platform.expect_list_channel_uploads().returning(move |_, _| {
            Ok(VideoPage {
                videos: videos.clone(),
                next_page_token: None,
            })
        });
        platform
            .expect_watch_url()
            .returning(|id| format!("https://www.youtube.com/watch?v={}", id));
        platform
    }

    #[tokio::test]
    async fn test_new_files_upload_then_rename_then_log() {
        let mut storage = storage_with_tree(vec![
            video_file("f1", "intro.mp4"),
            video_file("f2", "outro.mp4"),
        ]);
        storage
            .expect_rename()
            .withf(|id, name| id == "f1" && name == "vid-intro.mp4")
            .times(1)
            .returning(|_, _| Ok(()));
        storage
            .expect_rename()
            .withf(|id, name| id == "f2" && name == "vid-outro.mp4")
            .times(1)
            .returning(|_, _| Ok(()));

        let mut platform = platform_with_inventory(&[]);
        let mut titles = vec!["intro", "outro"].into_iter();
        platform
            .expect_begin_upload()
            .times(2)
            .returning(move |metadata, _| {
                assert_eq!(metadata.title, titles.next().unwrap());
                Ok(Box::new(OneShotSession {
                    video_id: format!("vid-{}", metadata.title),
                }))
            });

        let sink = Arc::new(MemoryLogSink::new());
        let coordinator =
            UploadCoordinator::new(Arc::new(storage), Arc::new(platform), sink.clone());

        let summary = coordinator.run(&settings()).await.unwrap();
        assert_eq!(
            summary,
            RunSummary {
                scanned: 2,
                skipped: 0,
                uploaded: 2,
                failed: 0,
                scan_complete: true,
            }
        );

        let entries = sink.entries();
        assert_eq!(entries.len(), 2);
        assert!(entries
            .iter()
            .all(|e| e.status == RunLogStatus::Uploaded && e.action == "rename"));
    }

    #[tokio::test]
    async fn test_second_run_is_idempotent() {
        // Files carry video-id names from the first run's rename; no
        // session is ever opened (the mock has no begin_upload expectation).
        let storage = storage_with_tree(vec![
            video_file("f1", "vid-intro.mp4"),
            video_file("f2", "vid-outro (1).mp4"),
        ]);
        let platform = platform_with_inventory(&["vid-intro", "vid-outro"]);

        let sink = Arc::new(MemoryLogSink::new());
        let coordinator =
            UploadCoordinator::new(Arc::new(storage), Arc::new(platform), sink.clone());

        let summary = coordinator.run(&settings()).await.unwrap();
        assert_eq!(summary.scanned, 2);
        assert_eq!(summary.skipped, 2);
        assert_eq!(summary.uploaded, 0);
        assert!(sink.entries().is_empty());
    }

    #[tokio::test]
    async fn test_inventory_auth_failure_aborts_with_nothing_uploaded() {
        let storage = storage_with_tree(vec![video_file("f1", "intro.mp4")]);

        let mut platform = MockPlatform::new();
        platform
            .expect_list_channel_uploads()
            .returning(|_, _| Err(BridgeError::Unauthorized("insufficient scope".to_string())));

        let sink = Arc::new(MemoryLogSink::new());
        let coordinator =
            UploadCoordinator::new(Arc::new(storage), Arc::new(platform), sink.clone());

        let err = coordinator.run(&settings()).await.unwrap_err();
        assert!(matches!(err, UploadError::Auth(_)));
        assert!(sink.entries().is_empty());
    }

    #[tokio::test]
    async fn test_upload_failure_skips_post_action() {
        // No rename expectation: calling it would fail the test
        let storage = storage_with_tree(vec![video_file("f1", "intro.mp4")]);

        let mut platform = platform_with_inventory(&[]);
        platform.expect_begin_upload().returning(|_, _| {
            Err(BridgeError::Api {
                status: 503,
                message: "quota".to_string(),
            })
        });

        let sink = Arc::new(MemoryLogSink::new());
        let coordinator =
            UploadCoordinator::new(Arc::new(storage), Arc::new(platform), sink.clone());

        let summary = coordinator.run(&settings()).await.unwrap();
        assert_eq!(summary.uploaded, 0);
        assert_eq!(summary.failed, 1);

        let entries = sink.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].status, RunLogStatus::UploadFailed);
    }

    #[tokio::test]
    async fn test_post_action_failure_keeps_upload_counted() {
        let mut storage = storage_with_tree(vec![video_file("f1", "intro.mp4")]);
        storage.expect_rename().returning(|_, _| {
            Err(BridgeError::Api {
                status: 500,
                message: "rename rejected".to_string(),
            })
        });

        let mut platform = platform_with_inventory(&[]);
        platform.expect_begin_upload().return_once(|_, _| {
            Ok(Box::new(OneShotSession {
                video_id: "vid-1".to_string(),
            }))
        });

        let sink = Arc::new(MemoryLogSink::new());
        let coordinator =
            UploadCoordinator::new(Arc::new(storage), Arc::new(platform), sink.clone());

        let summary = coordinator.run(&settings()).await.unwrap();
        assert_eq!(summary.uploaded, 1);
        assert_eq!(summary.failed, 0);

        let entries = sink.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].status, RunLogStatus::UploadedActionFailed);
        assert_eq!(entries[0].video_id.as_deref(), Some("vid-1"));
    }

    #[tokio::test]
    async fn test_partial_scan_is_reported() {
        let mut storage = MockStorage::new();
        storage
            .expect_list_children()
            .withf(|id, _| id == "root")
            .returning(|_, _| {
                Ok(FilePage {
                    files: vec![RemoteFile {
                        id: "bad".to_string(),
                        name: "Broken".to_string(),
                        mime_type: Some("application/vnd.google-apps.folder".to_string()),
                        size: None,
                        parent_ids: vec![],
                        description: None,
                        properties: HashMap::new(),
                        label_ids: vec![],
                        is_folder: true,
                    }],
                    next_page_token: None,
                })
            });
        storage
            .expect_list_children()
            .withf(|id, _| id == "bad")
            .returning(|_, _| {
                Err(BridgeError::Api {
                    status: 503,
                    message: "unavailable".to_string(),
                })
            });

        let platform = platform_with_inventory(&[]);
        let sink = Arc::new(MemoryLogSink::new());
        let coordinator =
            UploadCoordinator::new(Arc::new(storage), Arc::new(platform), sink.clone());

        let summary = coordinator.run(&settings()).await.unwrap();
        assert!(!summary.scan_complete);
        assert_eq!(summary.scanned, 0);
    }
}
