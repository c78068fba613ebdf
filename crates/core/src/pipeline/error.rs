//! Error types for the pipeline module.

use std::path::PathBuf;
use thiserror::Error;

use super::types::JobStage;
use crate::archiver::{describe_exit, ArchiverError};
use crate::auth::AuthError;
use crate::job::AddressError;
use crate::storage::StorageError;

/// Why a job run stopped. Each variant belongs to exactly one stage.
#[derive(Debug, Error)]
pub enum JobError {
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(#[from] AuthError),

    #[error("Malformed address: {0}")]
    MalformedAddress(#[from] AddressError),

    #[error("Object store unavailable: {0}")]
    StoreUnavailable(StorageError),

    #[error("Source {address} unavailable: {source}")]
    SourceUnavailable {
        address: String,
        source: StorageError,
    },

    #[error("Size limit exceeded: {message}")]
    SizeLimitExceeded { message: String },

    #[error("Scratch space {path} unavailable: {source}")]
    ScratchSpaceUnavailable {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Download of {address} failed: {source}")]
    DownloadFailed {
        address: String,
        source: StorageError,
    },

    #[error("Archive failed ({}): {source}", describe_exit(.exit_code))]
    ArchiveFailed {
        exit_code: Option<i32>,
        source: ArchiverError,
    },

    #[error("Archive {path} unavailable: {source}")]
    ArchiveStatUnavailable {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Upload to {address} failed: {source}")]
    UploadFailed {
        address: String,
        source: StorageError,
    },
}

impl JobError {
    /// The stage this error aborted.
    pub fn stage(&self) -> JobStage {
        match self {
            Self::AuthenticationFailed(_) => JobStage::Authenticate,
            Self::MalformedAddress(_) => JobStage::Parse,
            Self::StoreUnavailable(_) => JobStage::Connect,
            Self::SourceUnavailable { .. } | Self::SizeLimitExceeded { .. } => JobStage::Validate,
            Self::ScratchSpaceUnavailable { .. } => JobStage::Scratch,
            Self::DownloadFailed { .. } => JobStage::Download,
            Self::ArchiveFailed { .. } => JobStage::Archive,
            Self::ArchiveStatUnavailable { .. } => JobStage::Report,
            Self::UploadFailed { .. } => JobStage::Upload,
        }
    }

    /// Whether the caller sent something unusable, as opposed to a failure
    /// while processing a well-formed job.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::AuthenticationFailed(_) | Self::MalformedAddress(_)
        )
    }

    pub(crate) fn archive_failed(source: ArchiverError) -> Self {
        Self::ArchiveFailed {
            exit_code: source.exit_code(),
            source,
        }
    }
}
