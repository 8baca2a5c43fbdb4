//! Google Drive API response types
//!
//! Data structures for deserializing Google Drive API v3 and Drive Labels
//! API v2 responses.

use serde::Deserialize;
use std::collections::HashMap;

/// Google Drive API file resource
///
/// See: https://developers.google.com/drive/api/v3/reference/files#resource
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
    /// File ID
    pub id: String,

    /// File name
    pub name: String,

    /// MIME type
    pub mime_type: String,

    /// File size in bytes (omitted for folders)
    pub size: Option<String>,

    /// Free-form file description
    pub description: Option<String>,

    /// Custom key/value properties
    #[serde(default)]
    pub properties: HashMap<String, String>,

    /// Applied labels
    pub label_info: Option<LabelInfo>,

    /// Parent folder IDs
    #[serde(default)]
    pub parents: Vec<String>,
}

/// Applied-label information on a file resource
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelInfo {
    #[serde(default)]
    pub labels: Vec<AppliedLabel>,
}

/// One label applied to a file
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedLabel {
    pub id: String,
}

/// Google Drive API files.list response
///
/// See: https://developers.google.com/drive/api/v3/reference/files/list
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilesListResponse {
    /// List of files
    #[serde(default)]
    pub files: Vec<DriveFile>,

    /// Token for next page
    pub next_page_token: Option<String>,
}

/// Parents-only projection of a file resource, used before a move
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileParentsResponse {
    #[serde(default)]
    pub parents: Vec<String>,
}

/// Drive Labels API labels.list response
///
/// See: https://developers.google.com/drive/labels/reference/rest/v2/labels/list
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelsListResponse {
    #[serde(default)]
    pub labels: Vec<DriveLabel>,

    pub next_page_token: Option<String>,
}

/// Drive label resource
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveLabel {
    pub id: String,
    pub properties: DriveLabelProperties,
}

/// Drive label display properties
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveLabelProperties {
    pub title: String,
}
