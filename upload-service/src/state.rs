//! Application state shared across handlers.

use anyhow::Context;
use bridge_reqwest::http::ReqwestHttpClient;
use bridge_reqwest::settings::EnvSettings;
use bridge_traits::http::HttpClient;
use bridge_traits::logsink::LogSink;
use bridge_traits::settings::SettingsSource;
use bridge_traits::storage::StorageProvider;
use bridge_traits::token::TokenProvider;
use bridge_traits::video::VideoPlatform;
use core_auth::provider::{RefreshTokenConfig, RefreshTokenProvider, GOOGLE_TOKEN_URL};
use provider_google_drive::GoogleDriveConnector;
use provider_youtube::YouTubeConnector;
use std::sync::Arc;

use crate::logsink::TracingLogSink;

/// Environment variable prefix for all service configuration.
pub const ENV_PREFIX: &str = "YTBULK";

/// Shared dependencies, `Arc`-wrapped for cheap cloning into handlers.
#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<dyn StorageProvider>,
    pub platform: Arc<dyn VideoPlatform>,
    pub log_sink: Arc<dyn LogSink>,
    /// Lowest-precedence settings source, below per-request overrides
    pub settings: Arc<dyn SettingsSource>,
}

impl AppState {
    /// Wire the production stack from the process environment.
    ///
    /// Requires `YTBULK_CLIENT_ID`, `YTBULK_CLIENT_SECRET` and
    /// `YTBULK_REFRESH_TOKEN`; run configuration comes from further
    /// `YTBULK_*` variables and per-request overrides.
    pub fn from_env() -> anyhow::Result<Self> {
        let http: Arc<dyn HttpClient> = Arc::new(ReqwestHttpClient::new());

        let token_config = RefreshTokenConfig {
            token_url: GOOGLE_TOKEN_URL.to_string(),
            client_id: require_env("YTBULK_CLIENT_ID")?,
            client_secret: require_env("YTBULK_CLIENT_SECRET")?,
            refresh_token: require_env("YTBULK_REFRESH_TOKEN")?,
        };
        let token_provider: Arc<dyn TokenProvider> =
            Arc::new(RefreshTokenProvider::new(token_config, http.clone()));

        Ok(Self {
            storage: Arc::new(GoogleDriveConnector::new(
                http.clone(),
                token_provider.clone(),
            )),
            platform: Arc::new(YouTubeConnector::new(http, token_provider)),
            log_sink: Arc::new(TracingLogSink::new()),
            settings: Arc::new(EnvSettings::with_prefix(ENV_PREFIX)),
        })
    }
}

fn require_env(name: &str) -> anyhow::Result<String> {
    std::env::var(name)
        .ok()
        .filter(|v| !v.is_empty())
        .with_context(|| format!("{} is not set", name))
}
