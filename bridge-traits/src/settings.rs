//! Settings Source Abstraction
//!
//! A settings source is one layer of the configuration precedence chain
//! (request payload > persisted store > process environment). Each source
//! exposes a flat string key/value view; typed parsing happens in the
//! resolver.

use async_trait::async_trait;
use std::collections::HashMap;

use crate::error::Result;

/// One source of configuration values.
///
/// Keys are canonical `lower_snake_case` names (e.g. `root_folder_id`);
/// sources with other naming conventions translate internally.
#[async_trait]
pub trait SettingsSource: Send + Sync {
    /// Look up a single value.
    ///
    /// Returns `Ok(None)` when the source has no opinion on the key, which
    /// lets the resolver fall through to the next source.
    async fn get(&self, key: &str) -> Result<Option<String>>;
}

/// In-memory settings source.
///
/// Backs request-payload overrides and tests.
#[derive(Debug, Clone, Default)]
pub struct MapSettings {
    values: HashMap<String, String>,
}

impl MapSettings {
    pub fn new(values: HashMap<String, String>) -> Self {
        Self { values }
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<(String, String)> for MapSettings {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

#[async_trait]
impl SettingsSource for MapSettings {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_map_settings_lookup() {
        let mut settings = MapSettings::default();
        settings.set("root_folder_id", "abc123");

        assert_eq!(
            settings.get("root_folder_id").await.unwrap(),
            Some("abc123".to_string())
        );
        assert_eq!(settings.get("channel_id").await.unwrap(), None);
    }
}
