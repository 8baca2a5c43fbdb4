//! YouTube Data API response and request types
//!
//! Data structures for the YouTube Data API v3 endpoints the connector
//! touches: channels.list, playlistItems.list and videos.insert.

use serde::{Deserialize, Serialize};

/// channels.list response
///
/// See: https://developers.google.com/youtube/v3/docs/channels/list
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelListResponse {
    #[serde(default)]
    pub items: Vec<Channel>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Channel {
    pub content_details: ChannelContentDetails,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelContentDetails {
    pub related_playlists: RelatedPlaylists,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelatedPlaylists {
    /// Playlist id of the channel's uploads collection
    pub uploads: String,
}

/// playlistItems.list response
///
/// See: https://developers.google.com/youtube/v3/docs/playlistItems/list
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistItemsResponse {
    #[serde(default)]
    pub items: Vec<PlaylistItem>,

    pub next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistItem {
    pub snippet: PlaylistItemSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistItemSnippet {
    pub title: String,
    pub resource_id: ResourceId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceId {
    pub video_id: String,
}

/// videos.insert response body (the parts we read)
#[derive(Debug, Deserialize)]
pub struct VideoResource {
    pub id: String,
}

/// videos.insert request body
///
/// See: https://developers.google.com/youtube/v3/docs/videos/insert
#[derive(Debug, Serialize)]
pub struct UploadBody {
    pub snippet: UploadSnippet,
    pub status: UploadStatus,
}

#[derive(Debug, Serialize)]
pub struct UploadSnippet {
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadStatus {
    pub privacy_status: String,
    pub self_declared_made_for_kids: bool,
}
