//! Mock notification strategy for testing.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::job::{JobDescriptor, NotificationSpec};
use crate::notifier::{DeliveryReceipt, NotificationStrategy, NotifierError, ResultPayload};

/// A recorded delivery for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedDelivery {
    pub job_id: Option<String>,
    /// Type tag as written in the job.
    pub kind: String,
    pub payload: ResultPayload,
}

#[derive(Debug, Default)]
struct State {
    deliveries: Vec<RecordedDelivery>,
    failure: Option<String>,
}

/// Mock implementation of the NotificationStrategy trait.
///
/// Records successful deliveries, optionally fails every delivery and
/// tracks how many deliveries overlapped.
#[derive(Debug, Clone)]
pub struct MockNotifier {
    kind: String,
    state: Arc<Mutex<State>>,
    delay: Duration,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

impl MockNotifier {
    /// Create a mock handling the given type tag.
    pub fn new(kind: &str) -> Self {
        Self {
            kind: kind.to_string(),
            state: Arc::new(Mutex::new(State::default())),
            delay: Duration::ZERO,
            in_flight: Arc::new(AtomicUsize::new(0)),
            max_in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Delay every delivery by this long.
    pub fn with_delay_ms(mut self, delay_ms: u64) -> Self {
        self.delay = Duration::from_millis(delay_ms);
        self
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Fail every delivery with a transport error.
    pub fn fail_with(&self, message: &str) {
        self.state().failure = Some(message.to_string());
    }

    /// All successful deliveries.
    pub fn deliveries(&self) -> Vec<RecordedDelivery> {
        self.state().deliveries.clone()
    }

    /// Number of successful deliveries.
    pub fn delivery_count(&self) -> usize {
        self.state().deliveries.len()
    }

    /// Highest number of deliveries observed at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NotificationStrategy for MockNotifier {
    fn kind(&self) -> &str {
        &self.kind
    }

    async fn deliver(
        &self,
        job: &JobDescriptor,
        spec: &NotificationSpec,
        payload: &ResultPayload,
    ) -> Result<DeliveryReceipt, NotifierError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let mut state = self.state();
        if let Some(message) = state.failure.clone() {
            return Err(NotifierError::Transport {
                url: format!("mock://{}", self.kind),
                message,
            });
        }

        state.deliveries.push(RecordedDelivery {
            job_id: job.id.clone(),
            kind: spec.kind.clone(),
            payload: payload.clone(),
        });
        Ok(DeliveryReceipt { status_code: 200 })
    }
}
