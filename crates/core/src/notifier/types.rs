//! Types shared by notification strategies.

use serde::{Deserialize, Serialize};

/// Result status reported to notification endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultStatus {
    Success,
}

/// Result of a job, shared read-only by every delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultPayload {
    pub status: ResultStatus,
    /// Canonical URL of the uploaded archive.
    pub location: String,
    /// Archive size in bytes.
    pub size: u64,
}

impl ResultPayload {
    pub fn success(location: impl Into<String>, size: u64) -> Self {
        Self {
            status: ResultStatus::Success,
            location: location.into(),
            size,
        }
    }
}

/// JSON body sent by the HTTP strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationBody {
    pub id: Option<String>,
    pub status: ResultStatus,
    pub location: String,
    pub size: u64,
}

impl NotificationBody {
    pub fn new(id: Option<&str>, payload: &ResultPayload) -> Self {
        Self {
            id: id.map(str::to_string),
            status: payload.status,
            location: payload.location.clone(),
            size: payload.size,
        }
    }
}

/// What a strategy reports back after a delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryReceipt {
    pub status_code: u16,
}

/// Counts of notification outcomes for one job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchSummary {
    pub delivered: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl DispatchSummary {
    pub fn total(&self) -> usize {
        self.delivered + self.failed + self.skipped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_serialization() {
        let payload = ResultPayload::success("https://b.s3.amazonaws.com/a.zip", 400);
        let body = NotificationBody::new(Some("job-1"), &payload);
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": "job-1",
                "status": "success",
                "location": "https://b.s3.amazonaws.com/a.zip",
                "size": 400
            })
        );
    }

    #[test]
    fn test_body_without_id_is_null() {
        let payload = ResultPayload::success("loc", 1);
        let json = serde_json::to_value(NotificationBody::new(None, &payload)).unwrap();
        assert!(json["id"].is_null());
    }
}
