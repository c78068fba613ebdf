//! Error types for the job module.

use thiserror::Error;

/// Errors produced while normalizing a job payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    /// The address has no `/`, so bucket and key cannot be told apart.
    #[error("Address has no bucket separator: {address:?}")]
    MissingSeparator { address: String },

    /// The address starts with `/`.
    #[error("Address has an empty bucket: {address:?}")]
    EmptyBucket { address: String },

    /// Nothing follows the bucket.
    #[error("Address has an empty key: {address:?}")]
    EmptyKey { address: String },

    /// The last key segment cannot be used as a local file name.
    #[error("Address does not end in a usable file name: {address:?}")]
    InvalidName { address: String },

    /// Two sources would land on the same local path.
    #[error("Sources {first:?} and {second:?} share the file name {name:?}")]
    DuplicateName {
        name: String,
        first: String,
        second: String,
    },

    /// A source would land on the archive's own path.
    #[error("Source {address:?} has the same file name as the archive: {name:?}")]
    ConflictsWithArchive { name: String, address: String },

    /// The job lists no source files.
    #[error("Job has no source files")]
    NoSources,
}
