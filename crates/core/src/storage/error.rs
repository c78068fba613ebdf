//! Error types for the storage module.

use thiserror::Error;

/// Errors returned by object store operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The object does not exist.
    #[error("Object not found: {address}")]
    NotFound { address: String },

    /// A store request failed.
    #[error("{operation} on {address} failed: {message}")]
    Request {
        operation: &'static str,
        address: String,
        message: String,
    },

    /// The body stream broke off while reading.
    #[error("Stream interrupted while reading {address}: {message}")]
    Stream { address: String, message: String },

    /// The client could not be built.
    #[error("Invalid storage configuration: {0}")]
    Configuration(String),

    /// Local I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StorageError {
    /// Creates a request error.
    pub fn request(
        operation: &'static str,
        address: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Request {
            operation,
            address: address.into(),
            message: message.into(),
        }
    }
}
