//! # Core Auth
//!
//! Access-token supply for the upload engine. Only the refresh-token grant
//! lives here; interactive credential acquisition is an external concern.

pub mod error;
pub mod provider;

pub use error::{AuthError, Result};
pub use provider::{RefreshTokenConfig, RefreshTokenProvider, GOOGLE_TOKEN_URL};
