//! Trait definitions for the archiver module.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use super::error::ArchiverError;

/// Result of a successful archive run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveOutput {
    /// Path of the produced archive.
    pub path: PathBuf,
}

/// Packs a directory into a single archive file.
#[async_trait]
pub trait Archiver: Send + Sync {
    /// Returns the name of this archiver implementation.
    fn name(&self) -> &str;

    /// Archives everything under `dir` recursively into `dir/output_name`.
    async fn archive(&self, dir: &Path, output_name: &str) -> Result<ArchiveOutput, ArchiverError>;

    /// Checks that the archiver can run at all.
    async fn validate(&self) -> Result<(), ArchiverError>;
}
