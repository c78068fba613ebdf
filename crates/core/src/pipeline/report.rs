//! Archive size reporting.

use std::path::Path;
use tracing::info;

use super::error::JobError;

/// Percentage of the source size saved by compression, two decimals.
///
/// Returns `None` when there were no source bytes to compare against.
pub fn compression_ratio(source_bytes: u64, archive_bytes: u64) -> Option<String> {
    if source_bytes == 0 {
        return None;
    }
    let ratio = (1.0 - archive_bytes as f64 / source_bytes as f64) * 100.0;
    Some(format!("{:.2}", ratio))
}

/// Reads the archive size and logs it with the compression ratio.
pub async fn report_archive(
    archive: &Path,
    source_bytes: u64,
) -> Result<(u64, Option<String>), JobError> {
    let metadata = tokio::fs::metadata(archive)
        .await
        .map_err(|e| JobError::ArchiveStatUnavailable {
            path: archive.to_path_buf(),
            source: e,
        })?;

    let archive_bytes = metadata.len();
    let ratio = compression_ratio(source_bytes, archive_bytes);

    match &ratio {
        Some(ratio) => info!(
            "Archive is {} bytes ({} source bytes, compression ratio {}%)",
            archive_bytes, source_bytes, ratio
        ),
        None => info!("Archive is {} bytes (no source bytes)", archive_bytes),
    }

    Ok((archive_bytes, ratio))
}
