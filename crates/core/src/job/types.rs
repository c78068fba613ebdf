//! Types for the job module.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use super::address::ObjectRef;
use super::error::AddressError;

/// ACL applied to the uploaded archive when the job names none.
pub const DEFAULT_ACL: &str = "private";

/// Storage class applied to the uploaded archive when the job names none.
pub const DEFAULT_STORAGE_CLASS: &str = "STANDARD";

/// The inbound event: a shared-secret token plus the job payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobEvent {
    /// Shared-secret token checked before anything else runs.
    #[serde(default)]
    pub auth: String,
    /// The job itself.
    pub data: JobPayload,
}

/// Raw job payload as received.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobPayload {
    /// Caller-supplied job identifier, echoed in notifications.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Credentials for the object store.
    pub credentials: Credentials,
    /// Source addresses, `bucket/key/.../name` each.
    pub files: Vec<String>,
    /// Destination address for the archive.
    pub destination: String,
    /// Canned ACL for the uploaded archive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acl: Option<String>,
    /// Storage class for the uploaded archive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_class: Option<String>,
    /// Notifications to send after a successful upload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notifications: Option<Vec<NotificationSpec>>,
}

/// Object store credentials carried by the job.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    pub region: String,
    pub access_key_id: String,
    pub secret_access_key: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("region", &self.region)
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .finish()
    }
}

/// A configured notification. The `type` tag selects the strategy, every
/// other field is handed to that strategy as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationSpec {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(flatten)]
    pub params: serde_json::Map<String, serde_json::Value>,
}

impl NotificationSpec {
    /// Lowercased type tag used for registry lookups.
    pub fn kind_key(&self) -> String {
        self.kind.to_lowercase()
    }

    /// Deserializes the type-specific parameters.
    pub fn params<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(serde_json::Value::Object(self.params.clone()))
    }
}

/// A normalized job, immutable for the lifetime of one pipeline run.
#[derive(Debug, Clone)]
pub struct JobDescriptor {
    pub id: Option<String>,
    pub sources: Vec<ObjectRef>,
    pub destination: ObjectRef,
    pub credentials: Credentials,
    pub acl: String,
    pub storage_class: String,
    pub notifications: Vec<NotificationSpec>,
}

impl JobDescriptor {
    /// Normalizes a raw payload.
    ///
    /// Every source must parse, no two sources may share a display name and
    /// no source may share the archive's name, since all of them are written
    /// into the same scratch directory.
    pub fn from_payload(payload: JobPayload) -> Result<Self, AddressError> {
        if payload.files.is_empty() {
            return Err(AddressError::NoSources);
        }

        let destination = ObjectRef::parse(&payload.destination)?;
        let sources = payload
            .files
            .iter()
            .map(|address| ObjectRef::parse(address))
            .collect::<Result<Vec<_>, _>>()?;

        let mut seen: HashMap<&str, &ObjectRef> = HashMap::new();
        for source in &sources {
            if source.name == destination.name {
                return Err(AddressError::ConflictsWithArchive {
                    name: source.name.clone(),
                    address: source.full_key(),
                });
            }
            if let Some(first) = seen.insert(source.name.as_str(), source) {
                return Err(AddressError::DuplicateName {
                    name: source.name.clone(),
                    first: first.full_key(),
                    second: source.full_key(),
                });
            }
        }

        Ok(Self {
            id: payload.id,
            sources,
            destination,
            credentials: payload.credentials,
            acl: payload.acl.unwrap_or_else(|| DEFAULT_ACL.to_string()),
            storage_class: payload
                .storage_class
                .unwrap_or_else(|| DEFAULT_STORAGE_CLASS.to_string()),
            notifications: payload.notifications.unwrap_or_default(),
        })
    }

    /// Identifier used in logs when the caller supplied none.
    pub fn log_id(&self) -> &str {
        self.id.as_deref().unwrap_or("-")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(files: &[&str], destination: &str) -> JobPayload {
        JobPayload {
            id: Some("job-1".to_string()),
            credentials: Credentials {
                region: "eu-west-1".to_string(),
                access_key_id: "AKIA".to_string(),
                secret_access_key: "secret".to_string(),
            },
            files: files.iter().map(|f| f.to_string()).collect(),
            destination: destination.to_string(),
            acl: None,
            storage_class: None,
            notifications: None,
        }
    }

    #[test]
    fn test_event_deserialization() {
        let raw = json!({
            "auth": "token",
            "data": {
                "id": "42",
                "credentials": {
                    "region": "us-east-1",
                    "accessKeyId": "AKIA",
                    "secretAccessKey": "shh"
                },
                "files": ["bucket-a/folder/file1.txt"],
                "destination": "bucket-b/out/archive.zip",
                "storageClass": "REDUCED_REDUNDANCY",
                "notifications": [
                    { "type": "HTTP", "method": "post", "url": "https://example.com/{:id}" }
                ]
            }
        });

        let event: JobEvent = serde_json::from_value(raw).unwrap();
        assert_eq!(event.auth, "token");
        assert_eq!(event.data.id.as_deref(), Some("42"));
        assert_eq!(event.data.credentials.access_key_id, "AKIA");
        assert_eq!(
            event.data.storage_class.as_deref(),
            Some("REDUCED_REDUNDANCY")
        );

        let notifications = event.data.notifications.unwrap();
        assert_eq!(notifications[0].kind, "HTTP");
        assert_eq!(notifications[0].kind_key(), "http");
        assert_eq!(notifications[0].params["method"], "post");
    }

    #[test]
    fn test_from_payload_applies_defaults() {
        let job = JobDescriptor::from_payload(payload(
            &["bucket-a/folder/file1.txt", "bucket-a/folder/file2.txt"],
            "bucket-b/out/archive.zip",
        ))
        .unwrap();

        assert_eq!(job.sources.len(), 2);
        assert_eq!(job.sources[1].name, "file2.txt");
        assert_eq!(job.destination.bucket, "bucket-b");
        assert_eq!(job.destination.key, "out/archive.zip");
        assert_eq!(job.destination.name, "archive.zip");
        assert_eq!(job.acl, DEFAULT_ACL);
        assert_eq!(job.storage_class, DEFAULT_STORAGE_CLASS);
        assert!(job.notifications.is_empty());
    }

    #[test]
    fn test_from_payload_rejects_malformed_source() {
        let err = JobDescriptor::from_payload(payload(
            &["bucket-a/ok.txt", "no-separator"],
            "bucket-b/archive.zip",
        ))
        .unwrap_err();
        assert!(matches!(err, AddressError::MissingSeparator { .. }));
    }

    #[test]
    fn test_from_payload_rejects_duplicate_names() {
        let err = JobDescriptor::from_payload(payload(
            &["bucket-a/one/report.csv", "bucket-a/two/report.csv"],
            "bucket-b/archive.zip",
        ))
        .unwrap_err();
        assert_eq!(
            err,
            AddressError::DuplicateName {
                name: "report.csv".to_string(),
                first: "bucket-a/one/report.csv".to_string(),
                second: "bucket-a/two/report.csv".to_string(),
            }
        );
    }

    #[test]
    fn test_from_payload_rejects_archive_name_conflict() {
        let err = JobDescriptor::from_payload(payload(
            &["bucket-a/in/archive.zip"],
            "bucket-b/out/archive.zip",
        ))
        .unwrap_err();
        assert!(matches!(err, AddressError::ConflictsWithArchive { .. }));
    }

    #[test]
    fn test_from_payload_rejects_empty_sources() {
        let err = JobDescriptor::from_payload(payload(&[], "bucket-b/archive.zip")).unwrap_err();
        assert_eq!(err, AddressError::NoSources);
    }

    #[test]
    fn test_credentials_debug_redacts_secret() {
        let creds = payload(&[], "b/k").credentials;
        let debug = format!("{:?}", creds);
        assert!(debug.contains("AKIA"));
        assert!(!debug.contains("secret\""));
        assert!(debug.contains("<redacted>"));
    }
}
