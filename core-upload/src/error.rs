//! Run error taxonomy
//!
//! Classifies failures by blast radius: `Config` and `Auth` abort the run
//! before any upload, `UploadFailed` is scoped to one file, `PostAction`
//! and `LogSink` never invalidate a completed upload.

use bridge_traits::error::BridgeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum UploadError {
    /// Invalid or incoherent run configuration; nothing was attempted
    #[error("Configuration error: {0}")]
    Config(String),

    /// Credentials rejected; fatal for the whole run
    #[error("Authorization failed: {0}")]
    Auth(String),

    /// One file's upload exhausted its retry budget
    #[error("Upload failed after {attempts} attempts: {message}")]
    UploadFailed { attempts: u32, message: String },

    /// Post-upload action failed; the video itself remains published
    #[error("Post-upload action failed: {0}")]
    PostAction(String),

    /// Run log append failed; recorded, never fatal
    #[error("Run log append failed: {0}")]
    LogSink(String),

    /// Provider error outside the categories above
    #[error(transparent)]
    Source(BridgeError),
}

pub type Result<T> = std::result::Result<T, UploadError>;

impl From<BridgeError> for UploadError {
    fn from(error: BridgeError) -> Self {
        match error {
            BridgeError::Unauthorized(msg) => UploadError::Auth(msg),
            other => UploadError::Source(other),
        }
    }
}

impl From<core_runtime::Error> for UploadError {
    fn from(error: core_runtime::Error) -> Self {
        match error {
            core_runtime::Error::Config(msg) => UploadError::Config(msg),
            core_runtime::Error::Source(bridge) => bridge.into(),
            core_runtime::Error::Logging(msg) => UploadError::LogSink(msg),
        }
    }
}
