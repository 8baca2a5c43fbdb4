//! Error types for YouTube provider

use thiserror::Error;

/// YouTube provider errors
#[derive(Error, Debug)]
pub enum YouTubeError {
    /// API request returned an error
    #[error("YouTube API error (status {status_code}): {message}")]
    ApiError { status_code: u16, message: String },

    /// Channel could not be resolved
    #[error("Channel not found: {0}")]
    ChannelNotFound(String),

    /// Upload initiation response lacked a session URI
    #[error("No resumable session URI in upload initiation response")]
    MissingSessionUri,

    /// Failed to parse API response
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Bridge error
    #[error(transparent)]
    BridgeError(#[from] bridge_traits::error::BridgeError),
}

/// Result type for YouTube operations
pub type Result<T> = std::result::Result<T, YouTubeError>;

impl From<YouTubeError> for bridge_traits::error::BridgeError {
    fn from(error: YouTubeError) -> Self {
        match error {
            YouTubeError::ApiError {
                status_code,
                message,
            } => match status_code {
                401 | 403 => bridge_traits::error::BridgeError::Unauthorized(message),
                404 => bridge_traits::error::BridgeError::NotFound(message),
                _ => bridge_traits::error::BridgeError::Api {
                    status: status_code,
                    message,
                },
            },
            YouTubeError::ChannelNotFound(id) => {
                bridge_traits::error::BridgeError::NotFound(format!("Channel not found: {}", id))
            }
            YouTubeError::MissingSessionUri => bridge_traits::error::BridgeError::OperationFailed(
                "No resumable session URI in upload initiation response".to_string(),
            ),
            YouTubeError::ParseError(msg) => {
                bridge_traits::error::BridgeError::OperationFailed(format!("Parse error: {}", msg))
            }
            YouTubeError::BridgeError(e) => e,
        }
    }
}
