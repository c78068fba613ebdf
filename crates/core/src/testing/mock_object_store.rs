//! Mock object store for testing.

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::mpsc;

use crate::job::{Credentials, ObjectRef};
use crate::storage::{
    object_url, ObjectMeta, ObjectStore, ObjectStoreFactory, ObjectStream, PutOptions,
    StorageError, UploadProgress, UploadReceipt,
};

const MOCK_REGION: &str = "us-east-1";

/// A recorded upload for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedUpload {
    /// `bucket/key` of the uploaded object.
    pub address: String,
    /// ACL and storage class passed by the caller.
    pub options: PutOptions,
    /// Bytes uploaded.
    pub size_bytes: u64,
}

#[derive(Debug, Default)]
struct State {
    objects: HashMap<String, Bytes>,
    head_failures: HashMap<String, String>,
    get_failures: HashMap<String, String>,
    mid_stream_failures: HashMap<String, usize>,
    put_failure: Option<String>,
    connect_failure: Option<String>,
    uploads: Vec<RecordedUpload>,
    connections: Vec<String>,
}

/// In-memory implementation of [`ObjectStore`] and [`ObjectStoreFactory`].
///
/// Provides controllable behavior for testing:
/// - Objects stored by `bucket/key`
/// - Failure injection for head, get, put and connect
/// - Failure part-way through a download stream
/// - Tracking of concurrent downloads
///
/// Clones share all state, so a clone kept by the test observes what the
/// pipeline did with the original.
///
/// # Example
///
/// ```rust,ignore
/// use archivist_core::testing::MockObjectStore;
///
/// let store = MockObjectStore::new().with_chunk_size(4);
/// store.insert("bucket/a.txt", "0123456789");
/// store.fail_mid_stream("bucket/a.txt", 4);
/// ```
#[derive(Debug, Clone)]
pub struct MockObjectStore {
    state: Arc<Mutex<State>>,
    chunk_size: usize,
    delay: Duration,
    head_count: Arc<AtomicUsize>,
    get_count: Arc<AtomicUsize>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

impl Default for MockObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MockObjectStore {
    /// Create an empty mock store.
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(State::default())),
            chunk_size: 64 * 1024,
            delay: Duration::ZERO,
            head_count: Arc::new(AtomicUsize::new(0)),
            get_count: Arc::new(AtomicUsize::new(0)),
            in_flight: Arc::new(AtomicUsize::new(0)),
            max_in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Split downloads into chunks of this size.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Delay every `get` by this long, to make overlap observable.
    pub fn with_delay_ms(mut self, delay_ms: u64) -> Self {
        self.delay = Duration::from_millis(delay_ms);
        self
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Location the mock reports for an uploaded object.
    pub fn location_for(object: &ObjectRef) -> String {
        object_url(None, MOCK_REGION, false, object)
    }

    /// Store an object.
    pub fn insert(&self, address: &str, data: impl Into<Bytes>) {
        self.state().objects.insert(address.to_string(), data.into());
    }

    /// Get a stored or uploaded object.
    pub fn object(&self, address: &str) -> Option<Bytes> {
        self.state().objects.get(address).cloned()
    }

    /// Make `head` fail for an address.
    pub fn fail_head(&self, address: &str, message: &str) {
        self.state()
            .head_failures
            .insert(address.to_string(), message.to_string());
    }

    /// Make `get` fail for an address before any data is sent.
    pub fn fail_get(&self, address: &str, message: &str) {
        self.state()
            .get_failures
            .insert(address.to_string(), message.to_string());
    }

    /// Make the download of an address fail after `after_bytes` bytes.
    pub fn fail_mid_stream(&self, address: &str, after_bytes: usize) {
        self.state()
            .mid_stream_failures
            .insert(address.to_string(), after_bytes);
    }

    /// Make every upload fail.
    pub fn fail_put(&self, message: &str) {
        self.state().put_failure = Some(message.to_string());
    }

    /// Make `connect` fail.
    pub fn fail_connect(&self, message: &str) {
        self.state().connect_failure = Some(message.to_string());
    }

    /// All successful uploads.
    pub fn uploads(&self) -> Vec<RecordedUpload> {
        self.state().uploads.clone()
    }

    /// Regions of all credentials passed to `connect`.
    pub fn connections(&self) -> Vec<String> {
        self.state().connections.clone()
    }

    /// Number of `head` calls.
    pub fn head_count(&self) -> usize {
        self.head_count.load(Ordering::SeqCst)
    }

    /// Number of `get` calls.
    pub fn get_count(&self) -> usize {
        self.get_count.load(Ordering::SeqCst)
    }

    /// Highest number of `get` calls observed at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn chunks(&self, data: &Bytes, limit: usize) -> Vec<Bytes> {
        let end = limit.min(data.len());
        (0..end)
            .step_by(self.chunk_size)
            .map(|start| data.slice(start..(start + self.chunk_size).min(end)))
            .collect()
    }
}

#[async_trait]
impl ObjectStore for MockObjectStore {
    fn name(&self) -> &str {
        "mock"
    }

    async fn head(&self, object: &ObjectRef) -> Result<ObjectMeta, StorageError> {
        self.head_count.fetch_add(1, Ordering::SeqCst);
        let address = object.full_key();
        let state = self.state();

        if let Some(message) = state.head_failures.get(&address) {
            return Err(StorageError::request("HeadObject", address, message.clone()));
        }

        state
            .objects
            .get(&address)
            .map(|data| ObjectMeta {
                size_bytes: data.len() as u64,
            })
            .ok_or(StorageError::NotFound { address })
    }

    async fn get(&self, object: &ObjectRef) -> Result<ObjectStream, StorageError> {
        self.get_count.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let address = object.full_key();
        let (data, fail_after) = {
            let state = self.state();
            if let Some(message) = state.get_failures.get(&address) {
                return Err(StorageError::request("GetObject", address, message.clone()));
            }
            let data = state
                .objects
                .get(&address)
                .cloned()
                .ok_or_else(|| StorageError::NotFound {
                    address: address.clone(),
                })?;
            (data, state.mid_stream_failures.get(&address).copied())
        };

        let mut items: Vec<Result<Bytes, StorageError>> = self
            .chunks(&data, fail_after.unwrap_or(data.len()))
            .into_iter()
            .map(Ok)
            .collect();
        if fail_after.is_some() {
            items.push(Err(StorageError::Stream {
                address,
                message: "connection reset".to_string(),
            }));
        }

        Ok(futures::stream::iter(items).boxed())
    }

    async fn put_file(
        &self,
        object: &ObjectRef,
        path: &Path,
        options: &PutOptions,
        progress_tx: Option<mpsc::Sender<UploadProgress>>,
    ) -> Result<UploadReceipt, StorageError> {
        let address = object.full_key();
        let put_failure = self.state().put_failure.clone();
        if let Some(message) = put_failure {
            return Err(StorageError::request("PutObject", address, message));
        }

        let data = Bytes::from(tokio::fs::read(path).await?);
        let size_bytes = data.len() as u64;

        if let Some(tx) = progress_tx {
            let _ = tx.try_send(UploadProgress {
                address: address.clone(),
                bytes_sent: size_bytes,
                total_bytes: size_bytes,
            });
        }

        let mut state = self.state();
        state.objects.insert(address.clone(), data);
        state.uploads.push(RecordedUpload {
            address,
            options: options.clone(),
            size_bytes,
        });

        Ok(UploadReceipt {
            location: Self::location_for(object),
            size_bytes,
        })
    }
}

impl ObjectStoreFactory for MockObjectStore {
    fn connect(&self, credentials: &Credentials) -> Result<Arc<dyn ObjectStore>, StorageError> {
        let mut state = self.state();
        state.connections.push(credentials.region.clone());
        if let Some(message) = state.connect_failure.clone() {
            return Err(StorageError::Configuration(message));
        }
        Ok(Arc::new(self.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_streams_in_chunks() {
        let store = MockObjectStore::new().with_chunk_size(4);
        store.insert("bucket/a.txt", "0123456789");

        let chunks: Vec<_> = store
            .get(&ObjectRef::parse("bucket/a.txt").unwrap())
            .await
            .unwrap()
            .collect()
            .await;
        let chunks: Vec<Bytes> = chunks.into_iter().map(|c| c.unwrap()).collect();
        assert_eq!(chunks, vec![Bytes::from("0123"), Bytes::from("4567"), Bytes::from("89")]);
    }

    #[tokio::test]
    async fn test_mid_stream_failure() {
        let store = MockObjectStore::new().with_chunk_size(4);
        store.insert("bucket/a.txt", "0123456789");
        store.fail_mid_stream("bucket/a.txt", 6);

        let items: Vec<_> = store
            .get(&ObjectRef::parse("bucket/a.txt").unwrap())
            .await
            .unwrap()
            .collect()
            .await;
        assert_eq!(items.len(), 3);
        assert_eq!(items[1].as_ref().unwrap(), &Bytes::from("45"));
        assert!(matches!(items[2], Err(StorageError::Stream { .. })));
    }

    #[tokio::test]
    async fn test_connect_shares_state() {
        let store = MockObjectStore::new();
        let connected = store.connect(&crate::testing::fixtures::credentials()).unwrap();
        store.insert("bucket/a.txt", "abc");

        let meta = connected
            .head(&ObjectRef::parse("bucket/a.txt").unwrap())
            .await
            .unwrap();
        assert_eq!(meta.size_bytes, 3);
        assert_eq!(store.connections(), vec!["us-east-1"]);
    }
}
