use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Bridge operation failed: {0}")]
    OperationFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BridgeError {
    /// Whether a retry with backoff could plausibly succeed.
    ///
    /// Authorization failures and missing resources are terminal; rate
    /// limits, server errors and timeouts are not.
    pub fn is_transient(&self) -> bool {
        match self {
            BridgeError::Unauthorized(_) | BridgeError::NotFound(_) => false,
            BridgeError::Api { status, .. } => *status == 429 || (500..600).contains(status),
            BridgeError::Timeout(_) | BridgeError::Io(_) => true,
            BridgeError::OperationFailed(_) => true,
        }
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;
