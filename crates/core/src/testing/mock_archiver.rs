//! Mock archiver for testing.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::archiver::{ArchiveOutput, Archiver, ArchiverError};

/// A recorded archive run for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedArchive {
    /// Directory that was archived.
    pub dir: PathBuf,
    /// Requested archive file name.
    pub output_name: String,
    /// Names of the entries in `dir` when the run started, sorted.
    pub entries: Vec<String>,
}

#[derive(Debug, Default)]
struct State {
    runs: Vec<RecordedArchive>,
    exit_code: Option<i32>,
    skip_output: bool,
}

/// Mock implementation of the Archiver trait.
///
/// Writes an archive of a fixed size instead of compressing anything, or
/// fails like a program exiting with a configured code.
///
/// # Example
///
/// ```rust,ignore
/// use archivist_core::testing::MockArchiver;
///
/// let archiver = MockArchiver::new().with_archive_bytes(400);
/// archiver.fail_with_exit_code(1);
/// ```
#[derive(Debug, Clone)]
pub struct MockArchiver {
    state: Arc<Mutex<State>>,
    archive_bytes: usize,
}

impl Default for MockArchiver {
    fn default() -> Self {
        Self::new()
    }
}

impl MockArchiver {
    /// Create a mock archiver writing 100-byte archives.
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(State::default())),
            archive_bytes: 100,
        }
    }

    /// Size of the archives written.
    pub fn with_archive_bytes(mut self, archive_bytes: usize) -> Self {
        self.archive_bytes = archive_bytes;
        self
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Fail every run as if the program exited with `code`.
    pub fn fail_with_exit_code(&self, code: i32) {
        self.state().exit_code = Some(code);
    }

    /// Report success without writing the archive file.
    pub fn skip_output(&self) {
        self.state().skip_output = true;
    }

    /// All recorded runs.
    pub fn runs(&self) -> Vec<RecordedArchive> {
        self.state().runs.clone()
    }

    /// Number of runs.
    pub fn run_count(&self) -> usize {
        self.state().runs.len()
    }
}

async fn list_entries(dir: &Path) -> Result<Vec<String>, std::io::Error> {
    let mut entries = Vec::new();
    let mut read_dir = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = read_dir.next_entry().await? {
        entries.push(entry.file_name().to_string_lossy().into_owned());
    }
    entries.sort();
    Ok(entries)
}

#[async_trait]
impl Archiver for MockArchiver {
    fn name(&self) -> &str {
        "mock"
    }

    async fn archive(&self, dir: &Path, output_name: &str) -> Result<ArchiveOutput, ArchiverError> {
        let entries = list_entries(dir).await?;
        let (exit_code, skip_output) = {
            let mut state = self.state();
            state.runs.push(RecordedArchive {
                dir: dir.to_path_buf(),
                output_name: output_name.to_string(),
                entries,
            });
            (state.exit_code, state.skip_output)
        };

        if let Some(code) = exit_code {
            return Err(ArchiverError::failed(
                Some(code),
                "mock archiver failure".to_string(),
            ));
        }

        let path = dir.join(output_name);
        if !skip_output {
            tokio::fs::write(&path, vec![0u8; self.archive_bytes]).await?;
        }
        Ok(ArchiveOutput { path })
    }

    async fn validate(&self) -> Result<(), ArchiverError> {
        Ok(())
    }
}
