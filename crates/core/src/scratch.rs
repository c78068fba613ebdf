//! Job-scoped scratch directories.
//!
//! Each invocation gets one fresh directory. Ephemeral hosts pass an
//! invocation identifier and get `<root>/<id>`; long-lived hosts without one
//! share `<root>/<fixed_dir_name>`, which only works for one job at a time
//! unless cleanup is enabled.

use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// When to delete the scratch directory after a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CleanupPolicy {
    /// Leave the directory for the host to reclaim.
    #[default]
    Never,
    /// Delete only after the job succeeded.
    OnSuccess,
    /// Delete after every run.
    Always,
}

impl CleanupPolicy {
    /// Whether a run with the given outcome should remove its directory.
    pub fn applies(self, succeeded: bool) -> bool {
        match self {
            Self::Never => false,
            Self::OnSuccess => succeeded,
            Self::Always => true,
        }
    }
}

/// Configuration for scratch space.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScratchConfig {
    /// Parent directory for all job directories.
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Directory name used when the invocation carries no identifier.
    #[serde(default = "default_fixed_dir_name")]
    pub fixed_dir_name: String,

    /// Cleanup behaviour.
    #[serde(default)]
    pub cleanup: CleanupPolicy,
}

fn default_root() -> PathBuf {
    std::env::temp_dir().join("archivist")
}

fn default_fixed_dir_name() -> String {
    "files".to_string()
}

impl Default for ScratchConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            fixed_dir_name: default_fixed_dir_name(),
            cleanup: CleanupPolicy::default(),
        }
    }
}

impl ScratchConfig {
    /// Sets the root directory.
    pub fn with_root(mut self, root: PathBuf) -> Self {
        self.root = root;
        self
    }

    /// Sets the cleanup policy.
    pub fn with_cleanup(mut self, cleanup: CleanupPolicy) -> Self {
        self.cleanup = cleanup;
        self
    }
}

/// The host context of one pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Invocation {
    /// Request identifier assigned by an ephemeral host.
    pub id: Option<String>,
}

impl Invocation {
    /// An invocation on an ephemeral host with its own request id.
    pub fn ephemeral(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
        }
    }

    /// An invocation on a long-lived host.
    pub fn long_lived() -> Self {
        Self { id: None }
    }

    pub fn is_ephemeral(&self) -> bool {
        self.id.is_some()
    }
}

/// A created scratch directory.
#[derive(Debug, Clone)]
pub struct ScratchSpace {
    path: PathBuf,
}

impl ScratchSpace {
    /// Resolves the directory for an invocation without touching the filesystem.
    pub fn resolve(config: &ScratchConfig, invocation: &Invocation) -> io::Result<PathBuf> {
        let leaf = match &invocation.id {
            Some(id) => {
                if id.is_empty()
                    || id == "."
                    || id == ".."
                    || id.contains('/')
                    || id.contains('\\')
                {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidInput,
                        format!("invocation id {:?} is not a valid directory name", id),
                    ));
                }
                id.as_str()
            }
            None => config.fixed_dir_name.as_str(),
        };
        Ok(config.root.join(leaf))
    }

    /// Creates the job directory. An already existing directory is an error.
    pub async fn create(config: &ScratchConfig, invocation: &Invocation) -> io::Result<Self> {
        let path = Self::resolve(config, invocation)?;
        info!("Creating scratch directory at {}", path.display());

        tokio::fs::create_dir_all(&config.root).await?;
        tokio::fs::create_dir(&path).await?;

        debug!("Scratch directory created");
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Local path for a file with the given name.
    pub fn file_path(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }

    /// Removes the directory and everything in it. Failures are logged only.
    pub async fn remove(&self) {
        match tokio::fs::remove_dir_all(&self.path).await {
            Ok(()) => info!("Removed scratch directory {}", self.path.display()),
            Err(e) => warn!(
                "Failed to remove scratch directory {}: {}",
                self.path.display(),
                e
            ),
        }
    }
}
