//! Google Drive API connector implementation
//!
//! Implements the `StorageProvider` trait for Google Drive API v3.

use async_trait::async_trait;
use bridge_traits::error::Result;
use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest, RetryPolicy};
use bridge_traits::storage::{FilePage, RemoteFile, StorageProvider};
use bridge_traits::token::TokenProvider;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{debug, instrument, warn};

use crate::error::GoogleDriveError;
use crate::types::{
    DriveFile, FileParentsResponse, FilesListResponse, LabelsListResponse,
};

/// Google Drive API base URL
const DRIVE_API_BASE: &str = "https://www.googleapis.com/drive/v3";

/// Drive Labels API base URL
const LABELS_API_BASE: &str = "https://drivelabels.googleapis.com/v2";

/// Maximum results per page (Google Drive API limit)
const MAX_PAGE_SIZE: u32 = 1000;

/// Fields to request for file resources
const FILE_FIELDS: &str = "id,name,mimeType,size,description,properties,labelInfo,parents";

/// Google Drive API connector
///
/// Implements `StorageProvider` for Google Drive API v3: folder-scoped
/// paginated listing, ranged media downloads, and the rename/move/delete
/// mutations behind post-upload actions.
///
/// # Features
///
/// - Paginated child listing with label and property projections
/// - Range downloads for chunked transfers
/// - Exponential backoff for rate limiting and server errors
/// - Bearer auth via `TokenProvider`
///
/// # Example
///
/// ```ignore
/// use provider_google_drive::GoogleDriveConnector;
/// use bridge_traits::storage::StorageProvider;
///
/// let connector = GoogleDriveConnector::new(http_client, token_provider);
/// let page = connector.list_children("root-folder", None).await?;
/// ```
pub struct GoogleDriveConnector {
    /// HTTP client for API requests
    http_client: Arc<dyn HttpClient>,

    /// Bearer token supply
    token_provider: Arc<dyn TokenProvider>,

    /// Label ids to project into `labelInfo` on listings; refreshed by
    /// every catalog fetch
    include_label_ids: Mutex<Vec<String>>,

    /// Retry bounds for transient API failures
    retry_policy: RetryPolicy,
}

impl GoogleDriveConnector {
    /// Create a new Google Drive connector
    pub fn new(http_client: Arc<dyn HttpClient>, token_provider: Arc<dyn TokenProvider>) -> Self {
        Self {
            http_client,
            token_provider,
            include_label_ids: Mutex::new(Vec::new()),
            retry_policy: RetryPolicy::default(),
        }
    }

    /// Request these labels in listing responses (`includeLabels`) without
    /// fetching the catalog first.
    pub fn with_include_labels(self, label_ids: Vec<String>) -> Self {
        *self.include_label_ids.lock().unwrap_or_else(|e| e.into_inner()) = label_ids;
        self
    }

    /// Override the transient-failure retry bounds.
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    /// Convert DriveFile to RemoteFile
    fn convert_file(drive_file: DriveFile) -> RemoteFile {
        let is_folder = drive_file.mime_type == "application/vnd.google-apps.folder";
        let label_ids = drive_file
            .label_info
            .map(|info| info.labels.into_iter().map(|l| l.id).collect())
            .unwrap_or_default();

        RemoteFile {
            id: drive_file.id,
            name: drive_file.name,
            mime_type: Some(drive_file.mime_type),
            size: drive_file.size.and_then(|s| s.parse().ok()),
            parent_ids: drive_file.parents,
            description: drive_file.description,
            properties: drive_file.properties,
            label_ids,
            is_folder,
        }
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
                            return Err(GoogleDriveError::ApiError {
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
                        // Client error, no retry
                        warn!(status, "API request failed");
                        return Err(GoogleDriveError::ApiError {
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
}

#[async_trait]
impl StorageProvider for GoogleDriveConnector {
    #[instrument(skip(self), fields(folder_id = %folder_id))]
    async fn list_children(
        &self,
        folder_id: &str,
        page_token: Option<String>,
    ) -> Result<FilePage> {
        let query = format!("'{}' in parents and trashed=false", folder_id);

        let mut url = format!(
            "{}/files?q={}&pageSize={}&fields=nextPageToken,files({})",
            DRIVE_API_BASE,
            urlencoding::encode(&query),
            MAX_PAGE_SIZE,
            FILE_FIELDS
        );

        {
            let label_ids = self
                .include_label_ids
                .lock()
                .unwrap_or_else(|e| e.into_inner());
            if !label_ids.is_empty() {
                url.push_str(&format!(
                    "&includeLabels={}",
                    urlencoding::encode(&label_ids.join(","))
                ));
            }
        }

        if let Some(token) = page_token {
            url.push_str(&format!("&pageToken={}", urlencoding::encode(&token)));
        }

        let response = self
            .execute_with_retry(HttpRequest::new(HttpMethod::Get, url))
            .await?;

        let list_response: FilesListResponse = response.json().map_err(|e| {
            GoogleDriveError::ParseError(format!("Failed to parse files list response: {}", e))
        })?;

        let files: Vec<RemoteFile> = list_response
            .files
            .into_iter()
            .map(Self::convert_file)
            .collect();

        debug!(count = files.len(), "Listed folder children");

        Ok(FilePage {
            files,
            next_page_token: list_response.next_page_token,
        })
    }

    #[instrument(skip(self), fields(file_id = %file_id, offset, len))]
    async fn download_range(&self, file_id: &str, offset: u64, len: u64) -> Result<Bytes> {
        let url = format!("{}/files/{}?alt=media", DRIVE_API_BASE, file_id);
        let range = format!("bytes={}-{}", offset, offset + len - 1);

        let request = HttpRequest::new(HttpMethod::Get, url).header("Range", range);
        let response = self.execute_with_retry(request).await?;

        // 206 for a partial body, 200 when the range covers the whole file
        debug!(bytes = response.body.len(), "Downloaded range");
        Ok(response.body)
    }

    #[instrument(skip(self, new_name), fields(file_id = %file_id))]
    async fn rename(&self, file_id: &str, new_name: &str) -> Result<()> {
        let url = format!("{}/files/{}", DRIVE_API_BASE, file_id);
        let body = serde_json::json!({ "name": new_name });

        let request = HttpRequest::new(HttpMethod::Patch, url)
            .json(&body)
            .map_err(GoogleDriveError::BridgeError)?;

        self.execute_with_retry(request).await?;
        debug!(new_name, "Renamed file");
        Ok(())
    }

    #[instrument(skip(self), fields(file_id = %file_id, target = %target_folder_id))]
    async fn move_to_folder(&self, file_id: &str, target_folder_id: &str) -> Result<()> {
        // The current parents must be detached explicitly.
        let parents_url = format!("{}/files/{}?fields=parents", DRIVE_API_BASE, file_id);
        let response = self
            .execute_with_retry(HttpRequest::new(HttpMethod::Get, parents_url))
            .await?;

        let parents: FileParentsResponse = response.json().map_err(|e| {
            GoogleDriveError::ParseError(format!("Failed to parse parents response: {}", e))
        })?;
        let previous_parents = parents.parents.join(",");

        let url = format!(
            "{}/files/{}?addParents={}&removeParents={}&fields=id,parents",
            DRIVE_API_BASE,
            file_id,
            urlencoding::encode(target_folder_id),
            urlencoding::encode(&previous_parents)
        );

        let request = HttpRequest::new(HttpMethod::Patch, url)
            .json(&serde_json::json!({}))
            .map_err(GoogleDriveError::BridgeError)?;

        self.execute_with_retry(request).await?;
        debug!("Moved file");
        Ok(())
    }

    #[instrument(skip(self), fields(file_id = %file_id))]
    async fn delete(&self, file_id: &str) -> Result<()> {
        let url = format!("{}/files/{}", DRIVE_API_BASE, file_id);
        self.execute_with_retry(HttpRequest::new(HttpMethod::Delete, url))
            .await?;
        debug!("Deleted file");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_labels(&self) -> Result<HashMap<String, String>> {
        let mut labels = HashMap::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut url = format!("{}/labels?publishedOnly=true&pageSize=100", LABELS_API_BASE);
            if let Some(token) = &page_token {
                url.push_str(&format!("&pageToken={}", urlencoding::encode(token)));
            }

            let response = self
                .execute_with_retry(HttpRequest::new(HttpMethod::Get, url))
                .await?;

            let list: LabelsListResponse = response.json().map_err(|e| {
                GoogleDriveError::ParseError(format!("Failed to parse labels response: {}", e))
            })?;

            for label in list.labels {
                labels.insert(label.id, label.properties.title);
            }

            page_token = list.next_page_token;
            if page_token.is_none() {
                break;
            }
        }

        debug!(count = labels.len(), "Fetched label catalog");

        // Later listings project exactly the labels this catalog knows
        *self
            .include_label_ids
            .lock()
            .unwrap_or_else(|e| e.into_inner()) = labels.keys().cloned().collect();

        Ok(labels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::error::BridgeError;
    use bridge_traits::http::HttpResponse;
    use bridge_traits::token::StaticToken;
    use mockall::mock;
    use mockall::Sequence;

    mock! {
        Http {}

        #[async_trait]
        impl HttpClient for Http {
            async fn execute(&self, request: HttpRequest) -> Result<HttpResponse>;
        }
    }

    fn connector(http: MockHttp) -> GoogleDriveConnector {
        GoogleDriveConnector::new(
            Arc::new(http),
            Arc::new(StaticToken("test_token".to_string())),
        )
        .with_retry_policy(RetryPolicy {
            max_attempts: 3,
            base_delay: std::time::Duration::from_millis(1),
            max_delay: std::time::Duration::from_millis(5),
            use_exponential_backoff: true,
        })
    }

    fn json_response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: HashMap::new(),
            body: Bytes::from(body.as_bytes().to_vec()),
        }
    }

    #[tokio::test]
    async fn test_list_children_maps_fields() {
        let mut http = MockHttp::new();
        http.expect_execute().times(1).returning(|req| {
            assert!(req.url.contains("trashed%3Dfalse"));
            assert!(req.headers.contains_key("Authorization"));
            Ok(json_response(
                200,
                r#"{
                    "files": [
                        {
                            "id": "file1",
                            "name": "intro.mp4",
                            "mimeType": "video/mp4",
                            "size": "2048",
                            "description": "opener",
                            "properties": {"series": "s01"},
                            "parents": ["root"]
                        },
                        {
                            "id": "sub1",
                            "name": "Archive",
                            "mimeType": "application/vnd.google-apps.folder",
                            "parents": ["root"]
                        }
                    ],
                    "nextPageToken": "next"
                }"#,
            ))
        });

        let page = connector(http).list_children("root", None).await.unwrap();

        assert_eq!(page.files.len(), 2);
        assert_eq!(page.files[0].id, "file1");
        assert_eq!(page.files[0].size, Some(2048));
        assert_eq!(page.files[0].description.as_deref(), Some("opener"));
        assert!(page.files[1].is_folder);
        assert_eq!(page.next_page_token, Some("next".to_string()));
    }

    #[tokio::test]
    async fn test_list_children_passes_page_token() {
        let mut http = MockHttp::new();
        http.expect_execute().times(1).returning(|req| {
            assert!(req.url.contains("pageToken=tok123"));
            Ok(json_response(200, r#"{"files": []}"#))
        });

        let page = connector(http)
            .list_children("root", Some("tok123".to_string()))
            .await
            .unwrap();
        assert!(page.files.is_empty());
        assert_eq!(page.next_page_token, None);
    }

    #[tokio::test]
    async fn test_missing_folder_is_not_found() {
        let mut http = MockHttp::new();
        http.expect_execute()
            .times(1)
            .returning(|_| Ok(json_response(404, "folder missing")));

        let err = connector(http)
            .list_children("nope", None)
            .await
            .unwrap_err();
        assert!(matches!(err, BridgeError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_transient_failure_is_retried() {
        let mut http = MockHttp::new();
        let mut seq = Sequence::new();

        http.expect_execute()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(json_response(503, "backend error")));
        http.expect_execute()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(json_response(200, r#"{"files": []}"#)));

        let page = connector(http).list_children("root", None).await.unwrap();
        assert!(page.files.is_empty());
    }

    #[tokio::test]
    async fn test_download_range_sets_range_header() {
        let mut http = MockHttp::new();
        http.expect_execute().times(1).returning(|req| {
            assert!(req.url.contains("alt=media"));
            assert_eq!(req.headers.get("Range").map(String::as_str), Some("bytes=1024-2047"));
            Ok(HttpResponse {
                status: 206,
                headers: HashMap::new(),
                body: Bytes::from(vec![7u8; 1024]),
            })
        });

        let data = connector(http)
            .download_range("file1", 1024, 1024)
            .await
            .unwrap();
        assert_eq!(data.len(), 1024);
    }

    #[tokio::test]
    async fn test_rename_patches_name() {
        let mut http = MockHttp::new();
        http.expect_execute().times(1).returning(|req| {
            assert_eq!(req.method, HttpMethod::Patch);
            let body = req.body.expect("rename body");
            let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
            assert_eq!(json["name"], "dQw4w9WgXcQ.mp4");
            Ok(json_response(200, r#"{"id": "file1"}"#))
        });

        connector(http)
            .rename("file1", "dQw4w9WgXcQ.mp4")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_move_detaches_previous_parents() {
        let mut http = MockHttp::new();
        let mut seq = Sequence::new();

        http.expect_execute()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|req| {
                assert!(req.url.contains("fields=parents"));
                Ok(json_response(200, r#"{"parents": ["old1", "old2"]}"#))
            });
        http.expect_execute()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|req| {
                assert_eq!(req.method, HttpMethod::Patch);
                assert!(req.url.contains("addParents=done"));
                assert!(req.url.contains("removeParents=old1%2Cold2"));
                Ok(json_response(200, r#"{"id": "file1", "parents": ["done"]}"#))
            });

        connector(http).move_to_folder("file1", "done").await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_file() {
        let mut http = MockHttp::new();
        http.expect_execute().times(1).returning(|req| {
            assert_eq!(req.method, HttpMethod::Delete);
            Ok(HttpResponse {
                status: 204,
                headers: HashMap::new(),
                body: Bytes::new(),
            })
        });

        connector(http).delete("file1").await.unwrap();
    }

    #[tokio::test]
    async fn test_list_labels_pages_to_exhaustion() {
        let mut http = MockHttp::new();
        let mut seq = Sequence::new();

        http.expect_execute()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|req| {
                assert!(req.url.contains("publishedOnly=true"));
                Ok(json_response(
                    200,
                    r#"{"labels": [{"id": "l1", "properties": {"title": "Season One"}}], "nextPageToken": "p2"}"#,
                ))
            });
        http.expect_execute()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|req| {
                assert!(req.url.contains("pageToken=p2"));
                Ok(json_response(
                    200,
                    r#"{"labels": [{"id": "l2", "properties": {"title": "Season Two"}}]}"#,
                ))
            });

        let labels = connector(http).list_labels().await.unwrap();
        assert_eq!(labels.len(), 2);
        assert_eq!(labels.get("l2").map(String::as_str), Some("Season Two"));
    }

    #[tokio::test]
    async fn test_listing_projects_known_labels() {
        let mut http = MockHttp::new();
        http.expect_execute().times(1).returning(|req| {
            assert!(req.url.contains("includeLabels=l1"));
            Ok(json_response(200, r#"{"files": []}"#))
        });

        let connector = connector(http).with_include_labels(vec!["l1".to_string()]);
        connector.list_children("root", None).await.unwrap();
    }
}
