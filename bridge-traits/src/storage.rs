//! Source Storage Abstractions
//!
//! Platform-agnostic traits for the cloud folder tree the upload candidates
//! live in: paginated child listing, ranged downloads, and the file
//! mutations used by post-upload actions.

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;

use crate::error::Result;

/// A file or folder discovered in the source storage system.
///
/// Reconstructed fresh on every run; the engine never caches these between
/// invocations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFile {
    /// Storage-assigned identifier, opaque and unique within the system
    pub id: String,

    /// Display name, usually including an extension
    pub name: String,

    /// MIME type as reported by the storage system
    pub mime_type: Option<String>,

    /// Size in bytes, when the storage system reports it
    pub size: Option<u64>,

    /// Identifiers of the containing folder(s)
    pub parent_ids: Vec<String>,

    /// Free-form description attached to the file, if any
    pub description: Option<String>,

    /// Custom key/value properties attached to the file
    pub properties: HashMap<String, String>,

    /// Identifiers of labels applied to the file
    pub label_ids: Vec<String>,

    /// Whether this entry is a folder rather than a file
    pub is_folder: bool,
}

impl RemoteFile {
    /// Whether the entry is a video file by MIME type.
    pub fn is_video(&self) -> bool {
        !self.is_folder
            && self
                .mime_type
                .as_deref()
                .is_some_and(|m| m.starts_with("video/"))
    }
}

/// One page of a folder listing.
#[derive(Debug, Clone, Default)]
pub struct FilePage {
    pub files: Vec<RemoteFile>,
    pub next_page_token: Option<String>,
}

/// Source storage service trait
///
/// Abstracts the Drive-like system holding upload candidates. Listing is
/// paginated and scoped to a single folder; recursion over subfolders is
/// the caller's concern. Mutations back the post-upload actions.
#[async_trait]
pub trait StorageProvider: Send + Sync {
    /// List the direct children of a folder, one page at a time.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::NotFound`](crate::BridgeError::NotFound) when
    /// the folder identifier does not resolve.
    async fn list_children(&self, folder_id: &str, page_token: Option<String>)
        -> Result<FilePage>;

    /// Download a byte range of a file.
    ///
    /// `offset` is the first byte, `len` the maximum number of bytes to
    /// return. Implementations may return fewer bytes at end of file.
    async fn download_range(&self, file_id: &str, offset: u64, len: u64) -> Result<Bytes>;

    /// Set a file's display name.
    async fn rename(&self, file_id: &str, new_name: &str) -> Result<()>;

    /// Relocate a file into the given folder, detaching its current parents.
    async fn move_to_folder(&self, file_id: &str, target_folder_id: &str) -> Result<()>;

    /// Permanently remove a file.
    async fn delete(&self, file_id: &str) -> Result<()>;

    /// Fetch the catalog of available labels as an id → title map.
    ///
    /// Providers without a label concept return an empty map.
    async fn list_labels(&self) -> Result<HashMap<String, String>> {
        Ok(HashMap::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str, mime: &str) -> RemoteFile {
        RemoteFile {
            id: "f1".to_string(),
            name: name.to_string(),
            mime_type: Some(mime.to_string()),
            size: Some(1024),
            parent_ids: vec!["root".to_string()],
            description: None,
            properties: HashMap::new(),
            label_ids: vec![],
            is_folder: false,
        }
    }

    #[test]
    fn test_is_video() {
        assert!(file("clip.mp4", "video/mp4").is_video());
        assert!(file("clip.mkv", "video/x-matroska").is_video());
        assert!(!file("notes.txt", "text/plain").is_video());

        let mut folder = file("Videos", "application/vnd.google-apps.folder");
        folder.is_folder = true;
        assert!(!folder.is_video());
    }
}
