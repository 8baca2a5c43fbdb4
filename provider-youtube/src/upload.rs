//! Resumable upload session
//!
//! Speaks the Google resumable-upload protocol against a session URI: chunks
//! go out as `PUT` with a `Content-Range` header, a `308 Resume Incomplete`
//! carries the acknowledged offset back in its `Range` header, and a 2xx
//! with the video resource body means the upload is done.

use async_trait::async_trait;
use bridge_traits::error::Result;
use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
use bridge_traits::token::TokenProvider;
use bridge_traits::video::{ChunkOutcome, UploadSession};
use bytes::Bytes;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::YouTubeError;
use crate::types::VideoResource;

/// Status code used by the resumable protocol to acknowledge partial data
const RESUME_INCOMPLETE: u16 = 308;

/// One in-flight resumable upload against a session URI.
pub struct ResumableUploadSession {
    http_client: Arc<dyn HttpClient>,
    token_provider: Arc<dyn TokenProvider>,
    session_uri: String,
    total_bytes: u64,
}

impl ResumableUploadSession {
    pub fn new(
        http_client: Arc<dyn HttpClient>,
        token_provider: Arc<dyn TokenProvider>,
        session_uri: String,
        total_bytes: u64,
    ) -> Self {
        Self {
            http_client,
            token_provider,
            session_uri,
            total_bytes,
        }
    }

    async fn put(&self, content_range: String, body: Option<Bytes>) -> Result<HttpResponse> {
        let token = self.token_provider.access_token().await?;

        let mut request = HttpRequest::new(HttpMethod::Put, self.session_uri.clone())
            .header("Content-Range", content_range)
            .bearer_token(token);
        if let Some(bytes) = body {
            request = request.body(bytes);
        }

        self.http_client.execute(request).await
    }

    /// Map a session response to a chunk outcome.
    ///
    /// 2xx carries the finished video resource; 308 acknowledges bytes up to
    /// the end of its `Range` header (no header means nothing received yet).
    fn interpret(&self, response: HttpResponse) -> Result<ChunkOutcome> {
        if response.is_success() {
            let video: VideoResource = response.json().map_err(|e| {
                YouTubeError::ParseError(format!("Failed to parse video resource: {}", e))
            })?;
            return Ok(ChunkOutcome::Complete { video_id: video.id });
        }

        if response.status == RESUME_INCOMPLETE {
            let next_offset = response
                .header("Range")
                .and_then(parse_range_end)
                .map(|end| end + 1)
                .unwrap_or(0);
            debug!(next_offset, "Session acknowledged partial upload");
            return Ok(ChunkOutcome::Incomplete { next_offset });
        }

        warn!(status = response.status, "Upload session request failed");
        Err(YouTubeError::ApiError {
            status_code: response.status,
            message: response.text().unwrap_or_default(),
        }
        .into())
    }
}

#[async_trait]
impl UploadSession for ResumableUploadSession {
    async fn put_chunk(&mut self, offset: u64, chunk: Bytes) -> Result<ChunkOutcome> {
        let last_byte = offset + chunk.len() as u64 - 1;
        let content_range = format!("bytes {}-{}/{}", offset, last_byte, self.total_bytes);
        debug!(offset, len = chunk.len(), "Sending upload chunk");

        let response = self.put(content_range, Some(chunk)).await?;
        self.interpret(response)
    }

    async fn probe_offset(&mut self) -> Result<ChunkOutcome> {
        let content_range = format!("bytes */{}", self.total_bytes);
        debug!("Probing session for acknowledged offset");

        let response = self.put(content_range, None).await?;
        self.interpret(response)
    }
}

/// Parse the end byte out of a `Range: bytes=0-N` header.
fn parse_range_end(header: &str) -> Option<u64> {
    header
        .trim()
        .strip_prefix("bytes=")?
        .rsplit('-')
        .next()?
        .parse()
        .ok()
}
