//! Types for the storage module.

use bytes::Bytes;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};

use super::error::StorageError;

/// Streamed object body.
pub type ObjectStream = BoxStream<'static, Result<Bytes, StorageError>>;

/// Object metadata from a HEAD request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectMeta {
    pub size_bytes: u64,
}

/// Parameters applied to an uploaded object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PutOptions {
    /// Canned ACL (e.g. "private", "public-read").
    pub acl: String,
    /// Storage class (e.g. "STANDARD", "STANDARD_IA").
    pub storage_class: String,
}

/// Upload progress, reported for observability only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadProgress {
    pub address: String,
    pub bytes_sent: u64,
    pub total_bytes: u64,
}

/// Result of a completed upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadReceipt {
    /// Canonical URL of the uploaded object.
    pub location: String,
    pub size_bytes: u64,
}
