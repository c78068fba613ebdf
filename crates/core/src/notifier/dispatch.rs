//! Bounded fan-out of notifications for one job.

use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tracing::{info, warn};

use super::registry::NotifierRegistry;
use super::types::{DispatchSummary, ResultPayload};
use crate::job::{JobDescriptor, NotificationSpec};
use crate::metrics;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Delivered,
    Failed,
    Skipped,
}

impl Outcome {
    fn label(self) -> &'static str {
        match self {
            Self::Delivered => "delivered",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
        }
    }
}

/// Delivers every notification of a job with bounded concurrency.
///
/// Failures and unknown types are logged and counted, never returned.
#[derive(Clone)]
pub struct NotificationDispatcher {
    registry: Arc<NotifierRegistry>,
    concurrency: usize,
}

impl NotificationDispatcher {
    pub fn new(registry: Arc<NotifierRegistry>, concurrency: usize) -> Self {
        Self {
            registry,
            concurrency: concurrency.max(1),
        }
    }

    pub fn registry(&self) -> &NotifierRegistry {
        &self.registry
    }

    /// Sends all of `job`'s notifications and reports how they went.
    pub async fn dispatch(&self, job: &JobDescriptor, payload: &ResultPayload) -> DispatchSummary {
        if job.notifications.is_empty() {
            info!("No notifications configured");
            return DispatchSummary::default();
        }

        info!(
            "Sending {} notifications (concurrency {})",
            job.notifications.len(),
            self.concurrency
        );

        let deliveries: Vec<_> = job
            .notifications
            .iter()
            .map(|spec| self.dispatch_one(job, spec, payload))
            .collect();
        let outcomes: Vec<Outcome> = stream::iter(deliveries)
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        let mut summary = DispatchSummary::default();
        for outcome in outcomes {
            match outcome {
                Outcome::Delivered => summary.delivered += 1,
                Outcome::Failed => summary.failed += 1,
                Outcome::Skipped => summary.skipped += 1,
            }
        }

        info!(
            delivered = summary.delivered,
            failed = summary.failed,
            skipped = summary.skipped,
            "Notifications finished"
        );
        summary
    }

    async fn dispatch_one(
        &self,
        job: &JobDescriptor,
        spec: &NotificationSpec,
        payload: &ResultPayload,
    ) -> Outcome {
        let kind = spec.kind_key();

        let outcome = match self.registry.get(&kind) {
            None => {
                warn!("Unknown notification type {:?}, skipping", spec.kind);
                Outcome::Skipped
            }
            Some(strategy) => match strategy.deliver(job, spec, payload).await {
                Ok(receipt) => {
                    info!(
                        "{} notification delivered (status {})",
                        kind, receipt.status_code
                    );
                    Outcome::Delivered
                }
                Err(e) => {
                    warn!("{} notification failed: {}", kind, e);
                    Outcome::Failed
                }
            },
        };

        metrics::NOTIFICATIONS_TOTAL
            .with_label_values(&[kind.as_str(), outcome.label()])
            .inc();
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fixtures, MockNotifier};
    use serde_json::json;

    fn spec(kind: &str) -> NotificationSpec {
        serde_json::from_value(json!({ "type": kind, "url": "https://example.com" })).unwrap()
    }

    fn dispatcher(notifiers: Vec<Arc<MockNotifier>>, concurrency: usize) -> NotificationDispatcher {
        let mut registry = NotifierRegistry::new();
        for notifier in notifiers {
            registry.register(notifier);
        }
        NotificationDispatcher::new(Arc::new(registry), concurrency)
    }

    #[tokio::test]
    async fn test_empty_list_is_noop() {
        let notifier = Arc::new(MockNotifier::new("http"));
        let dispatcher = dispatcher(vec![notifier.clone()], 10);
        let job = fixtures::job_with_id("1");

        let summary = dispatcher
            .dispatch(&job, &ResultPayload::success("loc", 1))
            .await;
        assert_eq!(summary, DispatchSummary::default());
        assert_eq!(notifier.delivery_count(), 0);
    }

    #[tokio::test]
    async fn test_failures_and_unknown_types_do_not_stop_others() {
        let good = Arc::new(MockNotifier::new("http"));
        let bad = Arc::new(MockNotifier::new("broken"));
        bad.fail_with("endpoint down");
        let dispatcher = dispatcher(vec![good.clone(), bad.clone()], 10);

        let mut job = fixtures::job_with_id("1");
        job.notifications = vec![spec("HTTP"), spec("carrier-pigeon"), spec("broken"), spec("http")];

        let summary = dispatcher
            .dispatch(&job, &ResultPayload::success("loc", 400))
            .await;

        assert_eq!(
            summary,
            DispatchSummary {
                delivered: 2,
                failed: 1,
                skipped: 1
            }
        );
        assert_eq!(summary.total(), 4);
        assert_eq!(good.delivery_count(), 2);
        assert_eq!(good.deliveries()[0].payload.size, 400);
    }

    #[tokio::test]
    async fn test_concurrency_is_bounded() {
        let notifier = Arc::new(MockNotifier::new("http").with_delay_ms(20));
        let dispatcher = dispatcher(vec![notifier.clone()], 3);

        let mut job = fixtures::job_with_id("1");
        job.notifications = (0..12).map(|_| spec("http")).collect();

        let summary = dispatcher
            .dispatch(&job, &ResultPayload::success("loc", 1))
            .await;
        assert_eq!(summary.delivered, 12);
        assert!(notifier.max_in_flight() <= 3);
        assert!(notifier.max_in_flight() >= 2);
    }
}
