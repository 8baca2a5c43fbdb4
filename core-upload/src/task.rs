//! Upload task construction
//!
//! Derives the platform metadata for one pending file: title from the file
//! stem, description from the file or the configured default, tags from
//! custom properties and resolved label titles, and the made-for-kids
//! declaration from the `madeForKids` property.

use bridge_traits::storage::RemoteFile;
use bridge_traits::video::VideoMetadata;
use core_runtime::settings::RunSettings;
use std::collections::HashMap;

use crate::error::{Result, UploadError};

/// Property key carrying the self-declared made-for-kids flag.
const MADE_FOR_KIDS_PROPERTY: &str = "madeForKids";

/// One file scheduled for upload, with its derived metadata.
#[derive(Debug, Clone)]
pub struct UploadTask {
    pub file: RemoteFile,
    pub metadata: VideoMetadata,
    pub total_bytes: u64,
}

/// Build the upload task for a pending file.
///
/// `labels` maps label ids to their display titles; it is empty when label
/// fetching is disabled.
///
/// # Errors
///
/// Returns [`UploadError::UploadFailed`] when the storage system reports no
/// usable size, since a resumable session needs the total length up front.
pub fn build_task(
    file: RemoteFile,
    settings: &RunSettings,
    labels: &HashMap<String, String>,
) -> Result<UploadTask> {
    let total_bytes = match file.size {
        Some(size) if size > 0 => size,
        _ => {
            return Err(UploadError::UploadFailed {
                attempts: 0,
                message: format!("File '{}' has no reported size", file.name),
            })
        }
    };

    let title = stem(&file.name).to_string();

    let description = file
        .description
        .clone()
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| settings.default_description.clone());

    let mut tags: Vec<String> = file.properties.keys().cloned().collect();
    tags.sort();
    if settings.fetch_labels {
        for label_id in &file.label_ids {
            if let Some(label_title) = labels.get(label_id) {
                tags.push(label_title.clone());
            }
        }
    }

    let made_for_kids = file
        .properties
        .get(MADE_FOR_KIDS_PROPERTY)
        .is_some_and(|v| v.eq_ignore_ascii_case("true"));

    let metadata = VideoMetadata {
        title,
        description,
        tags,
        privacy: Default::default(),
        made_for_kids,
    };

    Ok(UploadTask {
        file,
        metadata,
        total_bytes,
    })
}

fn stem(name: &str) -> &str {
    match name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => name,
    }
}
