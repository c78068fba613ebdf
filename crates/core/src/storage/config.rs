//! Configuration for the storage module.

use serde::{Deserialize, Serialize};

/// Smallest part size S3 accepts for any part but the last.
pub const MIN_MULTIPART_PART_BYTES: u64 = 5 * 1024 * 1024;

/// Configuration for the S3 client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Endpoint override (S3-compatible stores). `None` uses the AWS
    /// regional endpoint for the job's region.
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Use path-style addressing (`endpoint/bucket/key`).
    #[serde(default)]
    pub force_path_style: bool,

    /// Connect timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Read timeout in seconds.
    #[serde(default = "default_read_timeout")]
    pub read_timeout_secs: u64,

    /// Attempts per request. 1 disables SDK retries.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Archives at or above this size are uploaded in parts.
    #[serde(default = "default_multipart_threshold")]
    pub multipart_threshold_bytes: u64,

    /// Part size for multipart uploads.
    #[serde(default = "default_part_size")]
    pub multipart_part_bytes: u64,
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_read_timeout() -> u64 {
    300
}

fn default_max_attempts() -> u32 {
    1
}

fn default_multipart_threshold() -> u64 {
    16 * 1024 * 1024
}

fn default_part_size() -> u64 {
    8 * 1024 * 1024
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            force_path_style: false,
            connect_timeout_secs: default_connect_timeout(),
            read_timeout_secs: default_read_timeout(),
            max_attempts: default_max_attempts(),
            multipart_threshold_bytes: default_multipart_threshold(),
            multipart_part_bytes: default_part_size(),
        }
    }
}

impl StorageConfig {
    /// Points the client at an S3-compatible endpoint with path-style addressing.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self.force_path_style = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = StorageConfig::default();
        assert!(config.endpoint.is_none());
        assert_eq!(config.max_attempts, 1);
        assert!(config.multipart_part_bytes >= MIN_MULTIPART_PART_BYTES);
        assert!(config.multipart_threshold_bytes >= config.multipart_part_bytes);
    }

    #[test]
    fn test_with_endpoint() {
        let config = StorageConfig::default().with_endpoint("http://localhost:9000");
        assert_eq!(config.endpoint.as_deref(), Some("http://localhost:9000"));
        assert!(config.force_path_style);
    }
}
