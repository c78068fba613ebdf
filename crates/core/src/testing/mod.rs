//! Testing utilities and mock implementations.
//!
//! This module provides in-memory implementations of the external
//! collaborators of a job (object store, archiver, notification endpoint),
//! so the whole pipeline can be exercised without S3, `zip` or a network.
//!
//! # Example
//!
//! ```rust,ignore
//! use archivist_core::testing::{fixtures, MockArchiver, MockNotifier, MockObjectStore};
//!
//! let store = MockObjectStore::new();
//! store.insert("bucket-a/folder/file1.txt", "hello");
//!
//! let archiver = MockArchiver::new().with_archive_bytes(400);
//! let notifier = MockNotifier::new("http");
//!
//! // Build a JobProcessor from these and run fixtures::job_event(..)
//! ```

mod mock_archiver;
mod mock_notifier;
mod mock_object_store;

pub use mock_archiver::{MockArchiver, RecordedArchive};
pub use mock_notifier::{MockNotifier, RecordedDelivery};
pub use mock_object_store::{MockObjectStore, RecordedUpload};

/// Test fixtures and helper functions.
pub mod fixtures {
    use serde_json::json;

    use crate::job::{Credentials, JobDescriptor, JobEvent, JobPayload, NotificationSpec};

    /// Shared secret used by fixture events.
    pub const SECRET: &str = "test-secret";

    /// The two sources of the reference job.
    pub const SOURCES: [&str; 2] = ["bucket-a/folder/file1.txt", "bucket-a/folder/file2.txt"];

    /// Destination of the reference job.
    pub const DESTINATION: &str = "bucket-b/out/archive.zip";

    /// Credentials with a fixed region.
    pub fn credentials() -> Credentials {
        Credentials {
            region: "us-east-1".to_string(),
            access_key_id: "AKIAEXAMPLE".to_string(),
            secret_access_key: "example-secret-key".to_string(),
        }
    }

    /// A payload with the given sources and destination and no options.
    pub fn job_payload(files: &[&str], destination: &str) -> JobPayload {
        JobPayload {
            id: Some("job-1".to_string()),
            credentials: credentials(),
            files: files.iter().map(|f| f.to_string()).collect(),
            destination: destination.to_string(),
            acl: None,
            storage_class: None,
            notifications: None,
        }
    }

    /// An event for the reference job, authenticated with [`SECRET`].
    pub fn job_event() -> JobEvent {
        JobEvent {
            auth: SECRET.to_string(),
            data: job_payload(&SOURCES, DESTINATION),
        }
    }

    /// The reference job as a parsed descriptor with the given id.
    pub fn job_with_id(id: &str) -> JobDescriptor {
        let mut payload = job_payload(&SOURCES, DESTINATION);
        payload.id = Some(id.to_string());
        // Fixture addresses are well-formed
        match JobDescriptor::from_payload(payload) {
            Ok(job) => job,
            Err(e) => panic!("fixture job is invalid: {e}"),
        }
    }

    /// A notification entry of the given type with no parameters.
    pub fn notification(kind: &str) -> NotificationSpec {
        NotificationSpec {
            kind: kind.to_string(),
            params: serde_json::Map::new(),
        }
    }

    /// An `http` notification entry.
    pub fn http_notification(url: &str, method: &str) -> NotificationSpec {
        let mut params = serde_json::Map::new();
        params.insert("url".to_string(), json!(url));
        params.insert("method".to_string(), json!(method));
        NotificationSpec {
            kind: "http".to_string(),
            params,
        }
    }
}
