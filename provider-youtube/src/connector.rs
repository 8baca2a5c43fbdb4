//! YouTube API connector implementation
//!
//! Implements the `VideoPlatform` trait for YouTube Data API v3: channel
//! inventory listing and resumable upload initiation.

use async_trait::async_trait;
use bridge_traits::error::Result;
use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest, RetryPolicy};
use bridge_traits::token::TokenProvider;
use bridge_traits::video::{
    ChannelVideo, UploadSession, VideoMetadata, VideoPage, VideoPlatform,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::error::YouTubeError;
use crate::types::{
    ChannelListResponse, PlaylistItemsResponse, UploadBody, UploadSnippet, UploadStatus,
};
use crate::upload::ResumableUploadSession;

/// YouTube Data API base URL
const YOUTUBE_API_BASE: &str = "https://www.googleapis.com/youtube/v3";

/// Resumable upload initiation endpoint
const YOUTUBE_UPLOAD_URL: &str =
    "https://www.googleapis.com/upload/youtube/v3/videos?uploadType=resumable&part=snippet,status";

/// Maximum results per playlistItems page (YouTube API limit)
const PLAYLIST_PAGE_SIZE: u32 = 50;

/// YouTube Data API connector
///
/// Implements `VideoPlatform` for YouTube Data API v3.
///
/// # Features
///
/// - Channel uploads inventory via the channel's uploads playlist, paged
///   to exhaustion
/// - Resumable upload sessions with chunk-level progress
/// - Exponential backoff for rate limiting on inventory/initiation calls
/// - Bearer auth via `TokenProvider`
///
/// # Example
///
/// ```ignore
/// use provider_youtube::YouTubeConnector;
/// use bridge_traits::video::VideoPlatform;
///
/// let connector = YouTubeConnector::new(http_client, token_provider);
/// let page = connector.list_channel_uploads(Some("UCabc"), None).await?;
/// ```
pub struct YouTubeConnector {
    /// HTTP client for API requests
    http_client: Arc<dyn HttpClient>,

    /// Bearer token supply
    token_provider: Arc<dyn TokenProvider>,

    /// Retry bounds for transient API failures
    retry_policy: RetryPolicy,

    /// Uploads playlist id per channel key, resolved once per run
    uploads_playlists: Mutex<HashMap<String, String>>,
}

impl YouTubeConnector {
    /// Create a new YouTube connector
    pub fn new(http_client: Arc<dyn HttpClient>, token_provider: Arc<dyn TokenProvider>) -> Self {
        Self {
            http_client,
            token_provider,
            retry_policy: RetryPolicy::default(),
            uploads_playlists: Mutex::new(HashMap::new()),
        }
    }

    /// Override the transient-failure retry bounds.
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    /// Execute an API request with bearer auth and retry on transient
    /// failures (429 and 5xx), with exponential backoff.
    #[instrument(skip(self, request), fields(url = %request.url))]
    async fn execute_with_retry(
        &self,
        request: HttpRequest,
    ) -> Result<bridge_traits::http::HttpResponse> {
        let mut attempt = 0;

        loop {
            let token = self.token_provider.access_token().await?;
            let attempt_request = request.clone().bearer_token(token);

            match self.http_client.execute(attempt_request).await {
                Ok(response) => {
                    let status = response.status;

                    if response.is_success() {
                        debug!(status, "API request succeeded");
                        return Ok(response);
                    } else if status == 429 || response.is_server_error() {
                        attempt += 1;
                        if attempt >= self.retry_policy.max_attempts {
                            warn!(
                                attempts = attempt,
                                status, "API request failed after retries"
                            );
                            return Err(YouTubeError::ApiError {
                                status_code: status,
                                message: format!("Request failed after {} retries", attempt),
                            }
                            .into());
                        }

                        let backoff = self.retry_policy.delay_for_attempt(attempt);
                        warn!(
                            attempt,
                            status,
                            backoff_ms = backoff.as_millis() as u64,
                            "Transient API failure, retrying"
                        );
                        tokio::time::sleep(backoff).await;
                    } else {
                        warn!(status, "API request failed");
                        return Err(YouTubeError::ApiError {
                            status_code: status,
                            message: response.text().unwrap_or_default(),
                        }
                        .into());
                    }
                }
                Err(e) if e.is_transient() => {
                    attempt += 1;
                    if attempt >= self.retry_policy.max_attempts {
                        warn!(attempts = attempt, error = %e, "API request failed after retries");
                        return Err(e);
                    }

                    let backoff = self.retry_policy.delay_for_attempt(attempt);
                    warn!(
                        attempt,
                        error = %e,
                        backoff_ms = backoff.as_millis() as u64,
                        "Transient transport failure, retrying"
                    );
                    tokio::time::sleep(backoff).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Resolve (and cache) the uploads playlist id for a channel.
    ///
    /// `channel_id = None` resolves the authenticated user's own channel.
    async fn uploads_playlist_id(&self, channel_id: Option<&str>) -> Result<String> {
        let key = channel_id.unwrap_or("mine").to_string();

        {
            let cache = self.uploads_playlists.lock().await;
            if let Some(playlist) = cache.get(&key) {
                return Ok(playlist.clone());
            }
        }

        let url = match channel_id {
            Some(id) => format!(
                "{}/channels?part=contentDetails&id={}",
                YOUTUBE_API_BASE,
                urlencoding::encode(id)
            ),
            None => format!("{}/channels?part=contentDetails&mine=true", YOUTUBE_API_BASE),
        };

        let response = self
            .execute_with_retry(HttpRequest::new(HttpMethod::Get, url))
            .await?;

        let channels: ChannelListResponse = response.json().map_err(|e| {
            YouTubeError::ParseError(format!("Failed to parse channels response: {}", e))
        })?;

        let playlist = channels
            .items
            .into_iter()
            .next()
            .map(|c| c.content_details.related_playlists.uploads)
            .ok_or_else(|| YouTubeError::ChannelNotFound(key.clone()))?;

        debug!(playlist = %playlist, "Resolved uploads playlist");

        self.uploads_playlists
            .lock()
            .await
            .insert(key, playlist.clone());
        Ok(playlist)
    }
}

#[async_trait]
impl VideoPlatform for YouTubeConnector {
    #[instrument(skip(self))]
    async fn list_channel_uploads(
        &self,
        channel_id: Option<&str>,
        page_token: Option<String>,
    ) -> Result<VideoPage> {
        let playlist_id = self.uploads_playlist_id(channel_id).await?;

        let mut url = format!(
            "{}/playlistItems?part=snippet&playlistId={}&maxResults={}",
            YOUTUBE_API_BASE,
            urlencoding::encode(&playlist_id),
            PLAYLIST_PAGE_SIZE
        );
        if let Some(token) = page_token {
            url.push_str(&format!("&pageToken={}", urlencoding::encode(&token)));
        }

        let response = self
            .execute_with_retry(HttpRequest::new(HttpMethod::Get, url))
            .await?;

        let page: PlaylistItemsResponse = response.json().map_err(|e| {
            YouTubeError::ParseError(format!("Failed to parse playlist items: {}", e))
        })?;

        let videos: Vec<ChannelVideo> = page
            .items
            .into_iter()
            .map(|item| ChannelVideo {
                id: item.snippet.resource_id.video_id,
                title: item.snippet.title,
            })
            .collect();

        debug!(count = videos.len(), "Listed channel uploads page");

        Ok(VideoPage {
            videos,
            next_page_token: page.next_page_token,
        })
    }

    #[instrument(skip(self, metadata), fields(title = %metadata.title, total_bytes))]
    async fn begin_upload(
        &self,
        metadata: &VideoMetadata,
        total_bytes: u64,
    ) -> Result<Box<dyn UploadSession>> {
        let body = UploadBody {
            snippet: UploadSnippet {
                title: metadata.title.clone(),
                description: metadata.description.clone(),
                tags: metadata.tags.clone(),
            },
            status: UploadStatus {
                privacy_status: metadata.privacy.as_str().to_string(),
                self_declared_made_for_kids: metadata.made_for_kids,
            },
        };

        let request = HttpRequest::new(HttpMethod::Post, YOUTUBE_UPLOAD_URL)
            .header("X-Upload-Content-Length", total_bytes.to_string())
            .json(&body)
            .map_err(YouTubeError::BridgeError)?;

        let response = self.execute_with_retry(request).await?;

        let session_uri = response
            .header("Location")
            .map(str::to_string)
            .ok_or(YouTubeError::MissingSessionUri)?;

        info!(title = %metadata.title, "Opened resumable upload session");

        Ok(Box::new(ResumableUploadSession::new(
            self.http_client.clone(),
            self.token_provider.clone(),
            session_uri,
            total_bytes,
        )))
    }

    fn watch_url(&self, video_id: &str) -> String {
        format!("https://www.youtube.com/watch?v={}", video_id)
    }
}
