//! Access Token Abstraction
//!
//! Credential acquisition (consent screens, refresh-token provisioning) is
//! external to this system; the engine only needs a bearer token per run.

use async_trait::async_trait;

use crate::error::Result;

/// Supplies a valid bearer access token on demand.
///
/// Implementations may cache and refresh behind the scenes. A provider that
/// cannot produce a token returns
/// [`BridgeError::Unauthorized`](crate::BridgeError::Unauthorized), which is
/// fatal for the run.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn access_token(&self) -> Result<String>;
}

/// Fixed token, for tests and short-lived manual invocations.
#[derive(Debug, Clone)]
pub struct StaticToken(pub String);

#[async_trait]
impl TokenProvider for StaticToken {
    async fn access_token(&self) -> Result<String> {
        Ok(self.0.clone())
    }
}
