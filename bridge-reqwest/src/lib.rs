//! # Server Bridge Implementations
//!
//! Concrete adapters for server and CLI deployments:
//! - [`ReqwestHttpClient`] - `HttpClient` backed by reqwest with pooled
//!   connections and transport-level retry
//! - [`EnvSettings`] - `SettingsSource` over process environment variables

pub mod http;
pub mod settings;

pub use http::ReqwestHttpClient;
pub use settings::EnvSettings;
