//! # Core Runtime
//!
//! Ambient infrastructure for the upload engine: the layered configuration
//! resolver and the tracing/logging stack.

pub mod error;
pub mod logging;
pub mod settings;

pub use error::{Error, Result};
pub use logging::{init_logging, LogFormat, LoggingConfig};
pub use settings::{PostUploadAction, RunSettings, SettingsResolver};
