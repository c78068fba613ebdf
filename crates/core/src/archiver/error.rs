//! Error types for the archiver module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while producing an archive.
#[derive(Debug, Error)]
pub enum ArchiverError {
    /// The archiving program could not be found.
    #[error("Archiver program not found: {program}")]
    ToolNotFound { program: PathBuf },

    /// The program exited unsuccessfully.
    #[error("Archiver failed with {}", describe_exit(.exit_code))]
    Failed {
        exit_code: Option<i32>,
        stderr: Option<String>,
    },

    /// The program did not finish in time and was killed.
    #[error("Archiver timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    /// The program reported success but left no output file.
    #[error("Archive not created at {path}")]
    OutputMissing { path: PathBuf },

    /// I/O error while spawning or waiting.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Renders an optional exit code for messages.
pub(crate) fn describe_exit(exit_code: &Option<i32>) -> String {
    match exit_code {
        Some(code) => format!("exit code {}", code),
        None => "no exit code".to_string(),
    }
}

impl ArchiverError {
    /// Creates a failure error, keeping stderr only when non-empty.
    pub fn failed(exit_code: Option<i32>, stderr: String) -> Self {
        Self::Failed {
            exit_code,
            stderr: if stderr.is_empty() { None } else { Some(stderr) },
        }
    }

    /// Exit code of the failed program, if it exited normally.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Self::Failed { exit_code, .. } => *exit_code,
            _ => None,
        }
    }
}
