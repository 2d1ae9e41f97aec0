//! Provider error types

use thiserror::Error;

/// Errors raised while talking to the completion or image-generation provider.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unauthorized: API key required or invalid")]
    Unauthorized,

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),
}

impl ServiceError {
    /// Whether the request never produced an HTTP response in time.
    pub fn is_timeout(&self) -> bool {
        matches!(self, ServiceError::Http(e) if e.is_timeout())
    }
}
