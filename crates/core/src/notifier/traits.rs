//! Trait definitions for the notifier module.

use async_trait::async_trait;

use super::error::NotifierError;
use super::types::{DeliveryReceipt, ResultPayload};
use crate::job::{JobDescriptor, NotificationSpec};

/// Delivers one kind of notification.
#[async_trait]
pub trait NotificationStrategy: Send + Sync {
    /// Type tag this strategy handles, matched case-insensitively.
    fn kind(&self) -> &str;

    /// Delivers the result of `job` as described by `spec`.
    async fn deliver(
        &self,
        job: &JobDescriptor,
        spec: &NotificationSpec,
        payload: &ResultPayload,
    ) -> Result<DeliveryReceipt, NotifierError>;
}
