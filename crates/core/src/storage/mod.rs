//! Object storage module.
//!
//! This module provides the `ObjectStore` trait used by the pipeline for
//! metadata lookups, streaming downloads and archive uploads, plus an
//! implementation on top of `aws-sdk-s3`.
//!
//! Stores are built per job through an [`ObjectStoreFactory`], since every
//! job carries its own credentials and region.
//!
//! # Example
//!
//! ```ignore
//! use archivist_core::storage::{S3ObjectStoreFactory, StorageConfig, ObjectStoreFactory};
//!
//! let factory = S3ObjectStoreFactory::new(StorageConfig::default());
//! let store = factory.connect(&job.credentials)?;
//!
//! let meta = store.head(&job.sources[0]).await?;
//! println!("{} is {} bytes", job.sources[0], meta.size_bytes);
//! ```

mod config;
mod error;
mod s3;
mod traits;
mod types;

pub use config::{StorageConfig, MIN_MULTIPART_PART_BYTES};
pub use error::StorageError;
pub use s3::{object_url, S3ObjectStore, S3ObjectStoreFactory};
pub use traits::{ObjectStore, ObjectStoreFactory};
pub use types::{ObjectMeta, ObjectStream, PutOptions, UploadProgress, UploadReceipt};
