//! Search service error types.

/// Errors that can occur while talking to the dog search service.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Transport-level failure (connection refused, timeout, TLS, ...)
    #[error("HTTP request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// Service answered with a non-success status
    #[error("API error (status {status}): {}", message.as_deref().unwrap_or("no message"))]
    Api { status: u16, message: Option<String> },

    /// Failed to deserialize service response
    #[error("Failed to deserialize API response: {0}")]
    Deserialization(#[from] serde_json::Error),
}

impl ServiceError {
    /// Returns the human-readable message embedded in the service response,
    /// if the service supplied one.
    ///
    pub fn message(&self) -> Option<&str> {
        match self {
            ServiceError::Api {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => Some(message.as_str()),
            _ => None,
        }
    }
}
