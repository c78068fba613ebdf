//! Configuration for the pipeline module.

use serde::{Deserialize, Serialize};

/// Configuration for the job pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessorConfig {
    /// Maximum downloads in flight. 1 downloads sequentially.
    #[serde(default = "default_download_concurrency")]
    pub download_concurrency: usize,

    /// Maximum notifications in flight.
    #[serde(default = "default_notification_concurrency")]
    pub notification_concurrency: usize,

    /// Check every source with a metadata lookup before downloading.
    #[serde(default)]
    pub validate_sources: bool,

    /// Largest accepted single source, checked during validation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_file_bytes: Option<u64>,

    /// Largest accepted total of all sources, checked during validation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_total_bytes: Option<u64>,
}

fn default_download_concurrency() -> usize {
    50
}

fn default_notification_concurrency() -> usize {
    10
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            download_concurrency: default_download_concurrency(),
            notification_concurrency: default_notification_concurrency(),
            validate_sources: false,
            max_file_bytes: None,
            max_total_bytes: None,
        }
    }
}

impl ProcessorConfig {
    /// Variant that validates sources and downloads one at a time.
    pub fn sequential() -> Self {
        Self {
            download_concurrency: 1,
            validate_sources: true,
            ..Self::default()
        }
    }
}
