//! Configuration for the archiver module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the external archiving tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiverConfig {
    /// Program to run. Resolved through `PATH` unless absolute.
    #[serde(default = "default_program")]
    pub program: PathBuf,

    /// Extra directories appended to `PATH` when spawning the program.
    #[serde(default)]
    pub search_paths: Vec<PathBuf>,

    /// Timeout for a single archive run in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_program() -> PathBuf {
    PathBuf::from("zip")
}

fn default_timeout() -> u64 {
    900 // 15 minutes
}

impl Default for ArchiverConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            search_paths: Vec::new(),
            timeout_secs: default_timeout(),
        }
    }
}

impl ArchiverConfig {
    /// Sets the program to run.
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    /// Appends a directory to the search path.
    pub fn with_search_path(mut self, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        if !self.search_paths.contains(&path) {
            self.search_paths.push(path);
        }
        self
    }

    /// Sets the timeout.
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}
