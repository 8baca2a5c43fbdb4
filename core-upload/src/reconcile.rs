//! Reconciler
//!
//! Decides which scanned files still need uploading. A file whose
//! normalized name matches a published video identifier was uploaded by a
//! previous run (the rename action stamps files with their video id), so it
//! is skipped. Matching is purely name-based and recomputed every run.

use bridge_traits::storage::RemoteFile;
use tracing::{debug, info};

use crate::inventory::ChannelInventory;

/// Partition of the candidate set for one run.
#[derive(Debug, Default)]
pub struct Reconciliation {
    /// Files with no matching published video, in scan order
    pub pending: Vec<RemoteFile>,

    /// Count of files recognized as already uploaded
    pub skipped: usize,
}

/// Normalize a file name for inventory matching.
///
/// Strips the final extension, then a trailing ` (n)` copy suffix that a
/// storage-side duplicate of an already renamed file would carry.
pub fn candidate_key(name: &str) -> &str {
    let stem = match name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => name,
    };
    strip_copy_suffix(stem)
}

fn strip_copy_suffix(stem: &str) -> &str {
    if let Some(idx) = stem.rfind(" (") {
        if let Some(digits) = stem[idx + 2..].strip_suffix(')') {
            if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
                return &stem[..idx];
            }
        }
    }
    stem
}

/// Split the scanned files into pending uploads and recognized re-runs.
///
/// Candidates are not deduplicated against each other; two distinct files
/// normalizing to the same key both upload.
pub fn reconcile(files: Vec<RemoteFile>, inventory: &ChannelInventory) -> Reconciliation {
    let mut result = Reconciliation::default();

    for file in files {
        if inventory.contains(candidate_key(&file.name)) {
            debug!(name = %file.name, "Already uploaded, skipping");
            result.skipped += 1;
        } else {
            result.pending.push(file);
        }
    }

    info!(
        pending = result.pending.len(),
        skipped = result.skipped,
        "Reconciliation complete"
    );
    result
}
