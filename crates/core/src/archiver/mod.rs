//! Archiver module for packing a scratch directory into one file.
//!
//! The default implementation shells out to the `zip` tool rooted at the
//! directory, so the archive holds every file and subdirectory with paths
//! relative to it, and is written into the same directory.
//!
//! # Example
//!
//! ```ignore
//! use archivist_core::archiver::{Archiver, ArchiverConfig, ZipArchiver};
//!
//! let archiver = ZipArchiver::new(ArchiverConfig::default());
//! archiver.validate().await?;
//!
//! let output = archiver.archive(Path::new("/tmp/archivist/req-1"), "archive.zip").await?;
//! println!("Archive written to {}", output.path.display());
//! ```

mod config;
mod error;
mod traits;
mod zip;

pub use config::ArchiverConfig;
pub(crate) use error::describe_exit;
pub use error::ArchiverError;
pub use traits::{ArchiveOutput, Archiver};
pub use zip::ZipArchiver;
