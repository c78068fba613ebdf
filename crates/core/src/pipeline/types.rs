//! Types for the pipeline module.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::notifier::DispatchSummary;

/// Pipeline stages in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStage {
    Authenticate,
    Parse,
    Connect,
    Validate,
    Scratch,
    Download,
    Archive,
    Report,
    Upload,
    Notify,
}

impl JobStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Authenticate => "authenticate",
            Self::Parse => "parse",
            Self::Connect => "connect",
            Self::Validate => "validate",
            Self::Scratch => "scratch",
            Self::Download => "download",
            Self::Archive => "archive",
            Self::Report => "report",
            Self::Upload => "upload",
            Self::Notify => "notify",
        }
    }
}

impl fmt::Display for JobStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transient state of one run, filled in as stages complete.
#[derive(Debug, Clone, Default)]
pub struct PipelineState {
    /// Bytes seen by the header check, if it ran.
    pub validated_bytes: Option<u64>,
    /// Bytes written to the scratch directory.
    pub source_bytes: u64,
    pub scratch_dir: Option<PathBuf>,
    pub archive_path: Option<PathBuf>,
    pub archive_bytes: u64,
    pub compression_ratio: Option<String>,
    pub location: Option<String>,
}

/// Result of a successful job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobOutcome {
    pub job_id: Option<String>,
    /// Canonical URL of the uploaded archive.
    pub location: String,
    pub archive_bytes: u64,
    pub source_bytes: u64,
    /// Percentage saved by compression, two decimals. None without source bytes.
    pub compression_ratio: Option<String>,
    pub notifications: DispatchSummary,
    pub duration_ms: u64,
}
