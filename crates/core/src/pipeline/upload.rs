//! Archive upload with progress logging.

use std::path::Path;
use tokio::sync::mpsc;
use tracing::{debug, info};

use super::error::JobError;
use crate::job::ObjectRef;
use crate::storage::{ObjectStore, PutOptions, UploadProgress, UploadReceipt};

/// Uploads the archive to `destination` and returns where it landed.
pub async fn upload_archive(
    store: &dyn ObjectStore,
    archive: &Path,
    destination: &ObjectRef,
    options: &PutOptions,
) -> Result<UploadReceipt, JobError> {
    info!(
        "Uploading {} to {} (acl {}, storage class {})",
        archive.display(),
        destination,
        options.acl,
        options.storage_class
    );

    let (progress_tx, mut progress_rx) = mpsc::channel::<UploadProgress>(16);
    let progress_task = tokio::spawn(async move {
        while let Some(progress) = progress_rx.recv().await {
            debug!(
                "Uploaded {}/{} bytes of {}",
                progress.bytes_sent, progress.total_bytes, progress.address
            );
        }
    });

    let result = store
        .put_file(destination, archive, options, Some(progress_tx))
        .await;
    let _ = progress_task.await;

    let receipt = result.map_err(|e| JobError::UploadFailed {
        address: destination.full_key(),
        source: e,
    })?;

    info!("Uploaded {} bytes to {}", receipt.size_bytes, receipt.location);
    Ok(receipt)
}
