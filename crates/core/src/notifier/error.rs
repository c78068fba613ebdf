//! Error types for the notifier module.

use thiserror::Error;

/// A single failed notification delivery.
#[derive(Debug, Error)]
pub enum NotifierError {
    /// The notification entry is missing fields or has bad values.
    #[error("Invalid {kind} notification: {message}")]
    InvalidParams { kind: String, message: String },

    /// The request could not be sent or no response arrived.
    #[error("Failed to notify {url}: {message}")]
    Transport { url: String, message: String },

    /// The request timed out.
    #[error("Notification to {url} timed out")]
    Timeout { url: String },

    /// The HTTP client could not be built.
    #[error("Failed to build HTTP client: {0}")]
    Client(String),
}

impl NotifierError {
    pub fn invalid_params(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParams {
            kind: kind.into(),
            message: message.into(),
        }
    }
}
