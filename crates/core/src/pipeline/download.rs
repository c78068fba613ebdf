//! Bounded concurrent download of all sources into the scratch directory.

use futures::StreamExt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::task::JoinSet;
use tracing::{debug, info};

use super::error::JobError;
use crate::job::ObjectRef;
use crate::scratch::ScratchSpace;
use crate::storage::{ObjectStore, StorageError};

/// Downloads every source to `scratch/<name>` and returns the bytes written.
///
/// At most `concurrency` downloads run at once. The first failure aborts
/// the remaining downloads; files already written stay in place.
pub async fn download_sources(
    store: Arc<dyn ObjectStore>,
    sources: &[ObjectRef],
    scratch: &ScratchSpace,
    concurrency: usize,
) -> Result<u64, JobError> {
    let concurrency = concurrency.max(1);
    info!(
        "Downloading {} sources (concurrency {})",
        sources.len(),
        concurrency
    );

    let total = Arc::new(AtomicU64::new(0));
    let mut pending = sources.iter();
    let mut joinset = JoinSet::new();

    loop {
        while joinset.len() < concurrency {
            let Some(source) = pending.next() else {
                break;
            };
            joinset.spawn(download_one(
                Arc::clone(&store),
                source.clone(),
                scratch.file_path(&source.name),
                Arc::clone(&total),
            ));
        }

        match joinset.join_next().await {
            Some(Ok(Ok(()))) => {}
            Some(Ok(Err(e))) => {
                joinset.abort_all();
                return Err(e);
            }
            Some(Err(e)) => {
                joinset.abort_all();
                return Err(JobError::DownloadFailed {
                    address: "<task>".to_string(),
                    source: StorageError::Stream {
                        address: "<task>".to_string(),
                        message: e.to_string(),
                    },
                });
            }
            None => break,
        }
    }

    let total = total.load(Ordering::SeqCst);
    info!("Downloaded {} bytes", total);
    Ok(total)
}

async fn download_one(
    store: Arc<dyn ObjectStore>,
    source: ObjectRef,
    target: PathBuf,
    total: Arc<AtomicU64>,
) -> Result<(), JobError> {
    let address = source.full_key();
    let failed = |e: StorageError| JobError::DownloadFailed {
        address: address.clone(),
        source: e,
    };

    debug!("Downloading {} to {}", address, target.display());
    let mut stream = store.get(&source).await.map_err(failed)?;
    let mut file = tokio::fs::File::create(&target)
        .await
        .map_err(|e| failed(e.into()))?;

    let mut written = 0u64;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(failed)?;
        file.write_all(&chunk)
            .await
            .map_err(|e| failed(e.into()))?;
        written += chunk.len() as u64;
        total.fetch_add(chunk.len() as u64, Ordering::SeqCst);
    }
    file.flush().await.map_err(|e| failed(e.into()))?;

    debug!("Finished {} ({} bytes)", address, written);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scratch::{Invocation, ScratchConfig};
    use crate::testing::MockObjectStore;
    use tempfile::TempDir;

    async fn scratch(temp: &TempDir) -> ScratchSpace {
        let config = ScratchConfig::default().with_root(temp.path().to_path_buf());
        ScratchSpace::create(&config, &Invocation::ephemeral("job"))
            .await
            .unwrap()
    }

    fn refs(addresses: &[String]) -> Vec<ObjectRef> {
        addresses.iter().map(|a| ObjectRef::parse(a).unwrap()).collect()
    }

    #[tokio::test]
    async fn test_downloads_all_sources() {
        let temp = TempDir::new().unwrap();
        let scratch = scratch(&temp).await;
        let store = MockObjectStore::new().with_chunk_size(7);
        store.insert("bucket-a/folder/file1.txt", "first file");
        store.insert("bucket-a/folder/file2.txt", "second file!");

        let sources = refs(&[
            "bucket-a/folder/file1.txt".to_string(),
            "bucket-a/folder/file2.txt".to_string(),
        ]);
        let total = download_sources(Arc::new(store), &sources, &scratch, 50)
            .await
            .unwrap();

        assert_eq!(total, 22);
        assert_eq!(
            std::fs::read_to_string(scratch.file_path("file1.txt")).unwrap(),
            "first file"
        );
        assert_eq!(
            std::fs::read_to_string(scratch.file_path("file2.txt")).unwrap(),
            "second file!"
        );
    }

    #[tokio::test]
    async fn test_total_is_sum_under_concurrency() {
        let temp = TempDir::new().unwrap();
        let scratch = scratch(&temp).await;
        let store = MockObjectStore::new().with_chunk_size(3);

        let mut addresses = Vec::new();
        let mut expected = 0u64;
        for i in 0..40u64 {
            let address = format!("bucket/f{}.bin", i);
            store.insert(&address, vec![1u8; (i * 13 + 1) as usize]);
            expected += i * 13 + 1;
            addresses.push(address);
        }

        let total = download_sources(Arc::new(store), &refs(&addresses), &scratch, 8)
            .await
            .unwrap();
        assert_eq!(total, expected);
    }

    #[tokio::test]
    async fn test_mid_stream_failure_fails_stage() {
        let temp = TempDir::new().unwrap();
        let scratch = scratch(&temp).await;
        let store = MockObjectStore::new().with_chunk_size(4);
        store.insert("bucket/one.txt", "0123456789");
        store.insert("bucket/two.txt", "0123456789");
        store.insert("bucket/three.txt", "0123456789");
        store.fail_mid_stream("bucket/two.txt", 4);

        let sources = refs(&[
            "bucket/one.txt".to_string(),
            "bucket/two.txt".to_string(),
            "bucket/three.txt".to_string(),
        ]);
        let err = download_sources(Arc::new(store), &sources, &scratch, 1)
            .await
            .unwrap_err();

        match err {
            JobError::DownloadFailed { address, source } => {
                assert_eq!(address, "bucket/two.txt");
                assert!(matches!(source, StorageError::Stream { .. }));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(scratch.file_path("one.txt").exists());
        assert!(!scratch.file_path("three.txt").exists());
    }

    #[tokio::test]
    async fn test_missing_source_fails_stage() {
        let temp = TempDir::new().unwrap();
        let scratch = scratch(&temp).await;
        let sources = refs(&["bucket/absent.txt".to_string()]);

        let err = download_sources(Arc::new(MockObjectStore::new()), &sources, &scratch, 4)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            JobError::DownloadFailed {
                source: StorageError::NotFound { .. },
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_concurrency_is_bounded() {
        let temp = TempDir::new().unwrap();
        let scratch = scratch(&temp).await;
        let store = MockObjectStore::new().with_delay_ms(20);

        let addresses: Vec<String> = (0..20).map(|i| format!("bucket/f{}.txt", i)).collect();
        for address in &addresses {
            store.insert(address, "data");
        }

        let handle = store.clone();
        download_sources(Arc::new(store), &refs(&addresses), &scratch, 4)
            .await
            .unwrap();

        assert_eq!(handle.get_count(), 20);
        assert!(handle.max_in_flight() <= 4);
        assert!(handle.max_in_flight() >= 2);
    }
}
