//! Post-upload action executor
//!
//! Applies exactly one configured action to the source file after its
//! upload is confirmed. Rename stamps the file with the platform video id
//! (keeping the extension) so later runs recognize it; move and delete take
//! it out of the scanned tree entirely. A failure here is reported to the
//! caller but the published video stands.

use bridge_traits::storage::{RemoteFile, StorageProvider};
use core_runtime::settings::{PostUploadAction, RunSettings};
use tracing::{info, instrument};

use crate::error::{Result, UploadError};

/// Run the configured action, returning a human-readable detail line for
/// the run log.
#[instrument(skip(storage, settings, file), fields(file = %file.name, action = settings.post_upload_action.as_str()))]
pub async fn apply_post_action(
    storage: &dyn StorageProvider,
    settings: &RunSettings,
    file: &RemoteFile,
    video_id: &str,
) -> Result<String> {
    let detail = match settings.post_upload_action {
        PostUploadAction::Rename => {
            let new_name = stamped_name(&file.name, video_id);
            storage
                .rename(&file.id, &new_name)
                .await
                .map_err(|e| UploadError::PostAction(e.to_string()))?;
            format!("Renamed to '{}'", new_name)
        }
        PostUploadAction::Move => {
            let target = settings.completed_folder_id.as_deref().ok_or_else(|| {
                UploadError::PostAction("No completed folder configured for move".to_string())
            })?;
            storage
                .move_to_folder(&file.id, target)
                .await
                .map_err(|e| UploadError::PostAction(e.to_string()))?;
            format!("Moved to folder '{}'", target)
        }
        PostUploadAction::Delete => {
            storage
                .delete(&file.id)
                .await
                .map_err(|e| UploadError::PostAction(e.to_string()))?;
            "Deleted from source storage".to_string()
        }
    };

    info!(%detail, "Post-upload action applied");
    Ok(detail)
}

/// Video-id file name with the original extension preserved.
fn stamped_name(original: &str, video_id: &str) -> String {
    match original.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{}.{}", video_id, ext),
        _ => video_id.to_string(),
    }
}
