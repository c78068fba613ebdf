//! Trait definitions for the storage module.

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::mpsc;

use super::error::StorageError;
use super::types::{ObjectMeta, ObjectStream, PutOptions, UploadProgress, UploadReceipt};
use crate::job::{Credentials, ObjectRef};

/// An authenticated view of an object store.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Returns the name of this store implementation.
    fn name(&self) -> &str;

    /// Looks up object metadata without transferring the body.
    async fn head(&self, object: &ObjectRef) -> Result<ObjectMeta, StorageError>;

    /// Opens a streaming read of the object body.
    async fn get(&self, object: &ObjectRef) -> Result<ObjectStream, StorageError>;

    /// Streams a local file to the object address.
    ///
    /// Progress updates are best effort; a full or dropped channel never
    /// affects the upload.
    async fn put_file(
        &self,
        object: &ObjectRef,
        path: &Path,
        options: &PutOptions,
        progress_tx: Option<mpsc::Sender<UploadProgress>>,
    ) -> Result<UploadReceipt, StorageError>;
}

/// Builds a store for a job's credentials.
pub trait ObjectStoreFactory: Send + Sync {
    fn connect(&self, credentials: &Credentials) -> Result<Arc<dyn ObjectStore>, StorageError>;
}
