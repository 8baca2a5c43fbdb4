//! # Configuration Resolver
//!
//! Merges configuration from layered sources into one immutable
//! [`RunSettings`] value per run.
//!
//! ## Overview
//!
//! Sources are consulted in precedence order — request payload first, then
//! the persisted settings store, then the process environment. The first
//! source with an opinion on a key wins. The resolved value is validated
//! fail-fast: a run never starts with an incoherent configuration.
//!
//! Replacing sheet-cell lookups with a typed, precedence-resolved mapping
//! removes hidden cross-call mutable state; every run sees exactly one
//! settings snapshot.
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::settings::SettingsResolver;
//! use std::sync::Arc;
//!
//! let resolver = SettingsResolver::new()
//!     .with_source(Arc::new(request_overrides))   // highest precedence
//!     .with_source(Arc::new(settings_store))
//!     .with_source(Arc::new(env_settings));       // lowest precedence
//! let settings = resolver.resolve().await?;
//! ```

use crate::error::{Error, Result};
use bridge_traits::settings::SettingsSource;
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

/// Upload chunks must be a multiple of this (platform requirement).
pub const CHUNK_ALIGNMENT: u64 = 256 * 1024;

/// Default upload chunk size: 8 MiB.
pub const DEFAULT_CHUNK_SIZE: u64 = 8 * 1024 * 1024;

/// Default bound on whole-upload retry attempts.
pub const DEFAULT_MAX_UPLOAD_ATTEMPTS: u32 = 10;

/// Default bound on per-folder listing retry attempts.
pub const DEFAULT_LIST_RETRY_ATTEMPTS: u32 = 3;

/// What happens to a source file after its upload is confirmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PostUploadAction {
    /// Rename the file to the platform video identifier, which makes
    /// subsequent runs recognize and skip it
    #[default]
    Rename,

    /// Relocate the file into the completed folder
    Move,

    /// Permanently remove the file
    Delete,
}

impl PostUploadAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostUploadAction::Rename => "rename",
            PostUploadAction::Move => "move",
            PostUploadAction::Delete => "delete",
        }
    }
}

impl FromStr for PostUploadAction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "rename" => Ok(PostUploadAction::Rename),
            "move" => Ok(PostUploadAction::Move),
            "delete" => Ok(PostUploadAction::Delete),
            other => Err(Error::Config(format!(
                "Unknown post_upload_action '{}' (expected rename|move|delete)",
                other
            ))),
        }
    }
}

/// Immutable, validated settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSettings {
    /// Root of the folder tree to scan for candidates
    pub root_folder_id: String,

    /// Destination channel; `None` means the authenticated user's channel
    pub channel_id: Option<String>,

    /// Action applied to each source file after confirmed upload
    pub post_upload_action: PostUploadAction,

    /// Target folder for `Move`; required iff the action is `Move`
    pub completed_folder_id: Option<String>,

    /// Description used when a file carries none of its own
    pub default_description: String,

    /// Whether to resolve label titles into upload tags
    pub fetch_labels: bool,

    /// Bytes per upload chunk; always a multiple of [`CHUNK_ALIGNMENT`]
    pub chunk_size_bytes: u64,

    /// Bound on whole-upload attempts per file
    pub max_upload_attempts: u32,

    /// Bound on listing attempts per folder
    pub list_retry_attempts: u32,
}

/// Layered settings resolver.
///
/// Holds sources in precedence order, highest first.
#[derive(Default)]
pub struct SettingsResolver {
    sources: Vec<Arc<dyn SettingsSource>>,
}

impl SettingsResolver {
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
        }
    }

    /// Append a source below all previously added ones.
    pub fn with_source(mut self, source: Arc<dyn SettingsSource>) -> Self {
        self.sources.push(source);
        self
    }

    /// First-opinion-wins lookup across the source chain.
    async fn lookup(&self, key: &str) -> Result<Option<String>> {
        for source in &self.sources {
            if let Some(value) = source.get(key).await? {
                return Ok(Some(value));
            }
        }
        Ok(None)
    }

    async fn lookup_bool(&self, key: &str) -> Result<bool> {
        Ok(self
            .lookup(key)
            .await?
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(false))
    }

    async fn lookup_parsed<T: FromStr>(&self, key: &str, default: T) -> Result<T> {
        match self.lookup(key).await? {
            Some(raw) => raw
                .parse()
                .map_err(|_| Error::Config(format!("Invalid value '{}' for {}", raw, key))),
            None => Ok(default),
        }
    }

    /// Resolve and validate one [`RunSettings`] snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when the root folder id is missing, the
    /// action is unknown, `move` lacks a completed folder id, or the chunk
    /// size is not aligned.
    pub async fn resolve(&self) -> Result<RunSettings> {
        let root_folder_id = self
            .lookup("root_folder_id")
            .await?
            .filter(|v| !v.is_empty())
            .ok_or_else(|| Error::Config("root_folder_id is not set".to_string()))?;

        let channel_id = self.lookup("channel_id").await?.filter(|v| !v.is_empty());

        let post_upload_action = match self.lookup("post_upload_action").await? {
            Some(raw) => raw.parse()?,
            None => PostUploadAction::default(),
        };

        let completed_folder_id = self
            .lookup("completed_folder_id")
            .await?
            .filter(|v| !v.is_empty());

        if post_upload_action == PostUploadAction::Move && completed_folder_id.is_none() {
            return Err(Error::Config(
                "post_upload_action is 'move' but completed_folder_id is not set".to_string(),
            ));
        }

        let default_description = self.lookup("default_description").await?.unwrap_or_default();
        let fetch_labels = self.lookup_bool("fetch_labels").await?;

        let chunk_size_bytes = self
            .lookup_parsed("chunk_size_bytes", DEFAULT_CHUNK_SIZE)
            .await?;
        if chunk_size_bytes == 0 || chunk_size_bytes % CHUNK_ALIGNMENT != 0 {
            return Err(Error::Config(format!(
                "chunk_size_bytes must be a positive multiple of {} bytes",
                CHUNK_ALIGNMENT
            )));
        }

        let max_upload_attempts = self
            .lookup_parsed("max_upload_attempts", DEFAULT_MAX_UPLOAD_ATTEMPTS)
            .await?;
        let list_retry_attempts = self
            .lookup_parsed("list_retry_attempts", DEFAULT_LIST_RETRY_ATTEMPTS)
            .await?;

        let settings = RunSettings {
            root_folder_id,
            channel_id,
            post_upload_action,
            completed_folder_id,
            default_description,
            fetch_labels,
            chunk_size_bytes,
            max_upload_attempts,
            list_retry_attempts,
        };

        debug!(?settings, "Resolved run settings");
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::settings::MapSettings;

    fn map(pairs: &[(&str, &str)]) -> Arc<MapSettings> {
        Arc::new(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[tokio::test]
    async fn test_request_overrides_store_and_env() {
        let resolver = SettingsResolver::new()
            .with_source(map(&[("root_folder_id", "from-request")]))
            .with_source(map(&[
                ("root_folder_id", "from-store"),
                ("channel_id", "store-channel"),
            ]))
            .with_source(map(&[("default_description", "from-env")]));

        let settings = resolver.resolve().await.unwrap();
        assert_eq!(settings.root_folder_id, "from-request");
        assert_eq!(settings.channel_id.as_deref(), Some("store-channel"));
        assert_eq!(settings.default_description, "from-env");
    }

    #[tokio::test]
    async fn test_missing_root_folder_is_config_error() {
        let resolver = SettingsResolver::new().with_source(map(&[("channel_id", "c1")]));
        let err = resolver.resolve().await.unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[tokio::test]
    async fn test_move_requires_completed_folder() {
        let resolver = SettingsResolver::new().with_source(map(&[
            ("root_folder_id", "root"),
            ("post_upload_action", "move"),
        ]));
        let err = resolver.resolve().await.unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let resolver = SettingsResolver::new().with_source(map(&[
            ("root_folder_id", "root"),
            ("post_upload_action", "move"),
            ("completed_folder_id", "done"),
        ]));
        let settings = resolver.resolve().await.unwrap();
        assert_eq!(settings.post_upload_action, PostUploadAction::Move);
        assert_eq!(settings.completed_folder_id.as_deref(), Some("done"));
    }

    #[tokio::test]
    async fn test_defaults() {
        let resolver = SettingsResolver::new().with_source(map(&[("root_folder_id", "root")]));
        let settings = resolver.resolve().await.unwrap();

        assert_eq!(settings.post_upload_action, PostUploadAction::Rename);
        assert_eq!(settings.chunk_size_bytes, DEFAULT_CHUNK_SIZE);
        assert_eq!(settings.max_upload_attempts, DEFAULT_MAX_UPLOAD_ATTEMPTS);
        assert!(!settings.fetch_labels);
    }

    #[tokio::test]
    async fn test_unaligned_chunk_size_rejected() {
        let resolver = SettingsResolver::new().with_source(map(&[
            ("root_folder_id", "root"),
            ("chunk_size_bytes", "100"),
        ]));
        assert!(matches!(
            resolver.resolve().await.unwrap_err(),
            Error::Config(_)
        ));
    }

    #[test]
    fn test_action_parsing() {
        assert_eq!(
            "RENAME".parse::<PostUploadAction>().unwrap(),
            PostUploadAction::Rename
        );
        assert_eq!(
            "delete".parse::<PostUploadAction>().unwrap(),
            PostUploadAction::Delete
        );
        assert!("archive".parse::<PostUploadAction>().is_err());
    }
}
