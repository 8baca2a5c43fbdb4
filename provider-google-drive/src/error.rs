//! Error types for Google Drive provider

use thiserror::Error;

/// Google Drive provider errors
#[derive(Error, Debug)]
pub enum GoogleDriveError {
    /// API request returned an error
    #[error("Google Drive API error (status {status_code}): {message}")]
    ApiError { status_code: u16, message: String },

    /// File or folder not found
    #[error("File not found: {file_id}")]
    FileNotFound { file_id: String },

    /// Failed to parse API response
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Bridge error
    #[error(transparent)]
    BridgeError(#[from] bridge_traits::error::BridgeError),
}

/// Result type for Google Drive operations
pub type Result<T> = std::result::Result<T, GoogleDriveError>;

impl From<GoogleDriveError> for bridge_traits::error::BridgeError {
    fn from(error: GoogleDriveError) -> Self {
        match error {
            GoogleDriveError::ApiError {
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
            GoogleDriveError::FileNotFound { file_id } => {
                bridge_traits::error::BridgeError::NotFound(format!("File not found: {}", file_id))
            }
            GoogleDriveError::ParseError(msg) => {
                bridge_traits::error::BridgeError::OperationFailed(format!("Parse error: {}", msg))
            }
            GoogleDriveError::BridgeError(e) => e,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::error::BridgeError;

    #[test]
    fn test_error_display() {
        let error = GoogleDriveError::ApiError {
            status_code: 404,
            message: "File not found".to_string(),
        };

        assert_eq!(
            error.to_string(),
            "Google Drive API error (status 404): File not found"
        );
    }

    #[test]
    fn test_auth_statuses_convert_to_unauthorized() {
        let error = GoogleDriveError::ApiError {
            status_code: 403,
            message: "insufficient scope".to_string(),
        };
        assert!(matches!(
            BridgeError::from(error),
            BridgeError::Unauthorized(_)
        ));
    }

    #[test]
    fn test_missing_file_converts_to_not_found() {
        let error = GoogleDriveError::FileNotFound {
            file_id: "abc".to_string(),
        };
        assert!(matches!(BridgeError::from(error), BridgeError::NotFound(_)));
    }
}
