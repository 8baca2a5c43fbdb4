//! Refresh-Token Access Provider
//!
//! Exchanges a long-lived OAuth refresh token for short-lived bearer access
//! tokens at the provider's token endpoint, caching each token until shortly
//! before expiry. Acquisition of the refresh token itself (consent flow) is
//! external to this system.

use crate::error::{AuthError, Result};
use async_trait::async_trait;
use bridge_traits::{
    error::BridgeError,
    http::{HttpClient, HttpMethod, HttpRequest},
    token::TokenProvider,
};
use bytes::Bytes;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::sleep;
use tracing::{debug, instrument, warn};

/// Default Google OAuth 2.0 token endpoint.
pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Refresh tokens this close to expiry are treated as expired.
const EXPIRY_MARGIN_SECS: i64 = 60;

/// Credentials for the refresh-token grant.
#[derive(Clone)]
pub struct RefreshTokenConfig {
    pub token_url: String,
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
}

impl std::fmt::Debug for RefreshTokenConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshTokenConfig")
            .field("token_url", &self.token_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &"***HIDDEN***")
            .field("refresh_token", &"***HIDDEN***")
            .finish()
    }
}

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn is_valid(&self) -> bool {
        Utc::now() + ChronoDuration::seconds(EXPIRY_MARGIN_SECS) < self.expires_at
    }
}

/// Token response from the OAuth token endpoint.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    3600
}

/// [`TokenProvider`] backed by the OAuth refresh-token grant.
///
/// Every run refreshes (or reuses) a bearer token scoped for the storage
/// and video platform APIs. A rejected refresh token surfaces as
/// [`BridgeError::Unauthorized`], which aborts the run before any upload.
pub struct RefreshTokenProvider {
    config: RefreshTokenConfig,
    http_client: Arc<dyn HttpClient>,
    cached: Mutex<Option<CachedToken>>,
}

impl RefreshTokenProvider {
    pub fn new(config: RefreshTokenConfig, http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            config,
            http_client,
            cached: Mutex::new(None),
        }
    }

    /// Exchange the refresh token for a fresh access token, with bounded
    /// retry on transient endpoint failures. 4xx responses are terminal.
    #[instrument(skip(self))]
    async fn refresh(&self) -> Result<CachedToken> {
        let mut params = HashMap::new();
        params.insert("grant_type", "refresh_token");
        params.insert("refresh_token", self.config.refresh_token.as_str());
        params.insert("client_id", self.config.client_id.as_str());
        params.insert("client_secret", self.config.client_secret.as_str());

        debug!("Refreshing access token");

        let encoded_body = serde_urlencoded::to_string(&params)
            .map_err(|e| AuthError::Other(format!("Failed to encode token request: {}", e)))?;
        let body = Bytes::from(encoded_body);

        let mut attempts = 0;
        const MAX_RETRIES: u32 = 3;

        loop {
            attempts += 1;

            let request = HttpRequest::new(HttpMethod::Post, self.config.token_url.clone())
                .header("Content-Type", "application/x-www-form-urlencoded")
                .body(body.clone());

            let response = self
                .http_client
                .execute(request)
                .await
                .map_err(|e| AuthError::TokenRefreshFailed(e.to_string()))?;

            if response.is_success() {
                let token_response: TokenResponse = response.json().map_err(|e| {
                    AuthError::Other(format!("Failed to parse token response: {}", e))
                })?;

                debug!(
                    expires_in = token_response.expires_in,
                    "Successfully refreshed token"
                );

                return Ok(CachedToken {
                    access_token: token_response.access_token,
                    expires_at: Utc::now() + ChronoDuration::seconds(token_response.expires_in),
                });
            }

            let status = response.status;

            if (400..500).contains(&status) {
                let error_body = response
                    .text()
                    .unwrap_or_else(|_| "Unable to read error response".to_string());

                warn!(status, error = %error_body, "Token refresh failed without retry");

                return Err(AuthError::InvalidGrant(format!(
                    "Token endpoint returned {}: {}",
                    status, error_body
                )));
            }

            if attempts >= MAX_RETRIES {
                let error_body = response
                    .text()
                    .unwrap_or_else(|_| "Unable to read error response".to_string());

                return Err(AuthError::TokenRefreshFailed(format!(
                    "Token refresh failed after {} attempts. Last error: {} - {}",
                    attempts, status, error_body
                )));
            }

            let delay = Duration::from_millis(100 * 2u64.pow(attempts - 1));
            warn!(
                status,
                attempts,
                delay_ms = delay.as_millis() as u64,
                "Token refresh failed, retrying"
            );
            sleep(delay).await;
        }
    }
}

#[async_trait]
impl TokenProvider for RefreshTokenProvider {
    async fn access_token(&self) -> bridge_traits::error::Result<String> {
        let mut cached = self.cached.lock().await;

        if let Some(token) = cached.as_ref() {
            if token.is_valid() {
                return Ok(token.access_token.clone());
            }
        }

        let fresh = self.refresh().await.map_err(|e| match e {
            AuthError::InvalidGrant(msg) => BridgeError::Unauthorized(msg),
            other => BridgeError::OperationFailed(other.to_string()),
        })?;

        let access_token = fresh.access_token.clone();
        *cached = Some(fresh);
        Ok(access_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::http::HttpResponse;
    use mockall::mock;

    mock! {
        Http {}

        #[async_trait]
        impl HttpClient for Http {
            async fn execute(&self, request: HttpRequest) -> bridge_traits::error::Result<HttpResponse>;
        }
    }

    fn config() -> RefreshTokenConfig {
        RefreshTokenConfig {
            token_url: GOOGLE_TOKEN_URL.to_string(),
            client_id: "client".to_string(),
            client_secret: "secret".to_string(),
            refresh_token: "refresh".to_string(),
        }
    }

    fn token_response(token: &str, expires_in: i64) -> HttpResponse {
        HttpResponse {
            status: 200,
            headers: HashMap::new(),
            body: Bytes::from(format!(
                r#"{{"access_token":"{}","expires_in":{},"token_type":"Bearer"}}"#,
                token, expires_in
            )),
        }
    }

    #[tokio::test]
    async fn test_refresh_and_cache() {
        let mut http = MockHttp::new();
        // A single endpoint call serves both access_token() invocations.
        http.expect_execute()
            .times(1)
            .returning(|_| Ok(token_response("ya29.fresh", 3600)));

        let provider = RefreshTokenProvider::new(config(), Arc::new(http));
        assert_eq!(provider.access_token().await.unwrap(), "ya29.fresh");
        assert_eq!(provider.access_token().await.unwrap(), "ya29.fresh");
    }

    #[tokio::test]
    async fn test_expired_cache_refreshes_again() {
        let mut http = MockHttp::new();
        let mut call = 0;
        http.expect_execute().times(2).returning(move |_| {
            call += 1;
            // First token expires immediately (inside the expiry margin).
            Ok(token_response(
                if call == 1 { "ya29.first" } else { "ya29.second" },
                if call == 1 { 1 } else { 3600 },
            ))
        });

        let provider = RefreshTokenProvider::new(config(), Arc::new(http));
        assert_eq!(provider.access_token().await.unwrap(), "ya29.first");
        assert_eq!(provider.access_token().await.unwrap(), "ya29.second");
    }

    #[tokio::test]
    async fn test_invalid_grant_is_unauthorized() {
        let mut http = MockHttp::new();
        http.expect_execute().times(1).returning(|_| {
            Ok(HttpResponse {
                status: 400,
                headers: HashMap::new(),
                body: Bytes::from(r#"{"error":"invalid_grant"}"#),
            })
        });

        let provider = RefreshTokenProvider::new(config(), Arc::new(http));
        let err = provider.access_token().await.unwrap_err();
        assert!(matches!(err, BridgeError::Unauthorized(_)));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let mut cfg = config();
        cfg.client_secret = "s3cr3t-value".to_string();
        cfg.refresh_token = "1//refresh-value".to_string();

        let rendered = format!("{:?}", cfg);
        assert!(!rendered.contains("s3cr3t-value"));
        assert!(!rendered.contains("1//refresh-value"));
        assert!(rendered.contains("***HIDDEN***"));
    }
}
