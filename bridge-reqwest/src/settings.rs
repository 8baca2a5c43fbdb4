//! Process Environment Settings Source

use async_trait::async_trait;
use bridge_traits::{error::Result, settings::SettingsSource};

/// Process environment as the lowest-precedence settings source.
///
/// Canonical `lower_snake_case` keys are looked up as `UPPER_SNAKE_CASE`
/// environment variables, optionally behind a prefix
/// (`root_folder_id` → `YTBULK_ROOT_FOLDER_ID`).
#[derive(Debug, Clone, Default)]
pub struct EnvSettings {
    prefix: Option<String>,
}

impl EnvSettings {
    pub fn new() -> Self {
        Self { prefix: None }
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
        }
    }

    fn env_key(&self, key: &str) -> String {
        let upper = key.to_ascii_uppercase();
        match &self.prefix {
            Some(prefix) => format!("{}_{}", prefix, upper),
            None => upper,
        }
    }
}

#[async_trait]
impl SettingsSource for EnvSettings {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(std::env::var(self.env_key(key)).ok().filter(|v| !v.is_empty()))
    }
}
