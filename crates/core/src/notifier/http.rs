//! HTTP callback notification strategy.

use async_trait::async_trait;
use reqwest::{Client, Method};
use serde::Deserialize;
use std::time::Duration;
use tracing::info;

use super::config::NotifierConfig;
use super::error::NotifierError;
use super::traits::NotificationStrategy;
use super::types::{DeliveryReceipt, NotificationBody, ResultPayload};
use crate::job::{JobDescriptor, NotificationSpec};

const ID_PLACEHOLDER: &str = "{:id}";

/// Parameters of an `http` notification entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HttpNotificationParams {
    /// Target URL; every `{:id}` is replaced by the job id.
    pub url: String,

    /// HTTP method, case-insensitive.
    #[serde(default = "default_method")]
    pub method: String,

    /// Whether to verify TLS certificates.
    #[serde(default = "default_strict_ssl", rename = "strictSSL", alias = "strict_ssl")]
    pub strict_ssl: bool,
}

fn default_method() -> String {
    "POST".to_string()
}

fn default_strict_ssl() -> bool {
    true
}

/// Replaces every `{:id}` in `url` with the job id, or nothing without one.
pub fn render_url(url: &str, id: Option<&str>) -> String {
    url.replace(ID_PLACEHOLDER, id.unwrap_or_default())
}

/// Sends the job result as a JSON request to a configured URL.
pub struct HttpNotifier {
    client: Client,
    insecure_client: Client,
}

impl HttpNotifier {
    /// Creates a notifier with one verifying and one non-verifying client.
    pub fn new(config: &NotifierConfig) -> Result<Self, NotifierError> {
        let timeout = Duration::from_secs(config.timeout_secs);

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| NotifierError::Client(e.to_string()))?;

        let insecure_client = Client::builder()
            .timeout(timeout)
            .danger_accept_invalid_certs(true)
            .build()
            .map_err(|e| NotifierError::Client(e.to_string()))?;

        Ok(Self {
            client,
            insecure_client,
        })
    }

    fn client_for(&self, strict_ssl: bool) -> &Client {
        if strict_ssl {
            &self.client
        } else {
            &self.insecure_client
        }
    }
}

#[async_trait]
impl NotificationStrategy for HttpNotifier {
    fn kind(&self) -> &str {
        "http"
    }

    async fn deliver(
        &self,
        job: &JobDescriptor,
        spec: &NotificationSpec,
        payload: &ResultPayload,
    ) -> Result<DeliveryReceipt, NotifierError> {
        let params: HttpNotificationParams = spec
            .params()
            .map_err(|e| NotifierError::invalid_params(&spec.kind, e.to_string()))?;

        let method = Method::from_bytes(params.method.to_uppercase().as_bytes())
            .map_err(|_| {
                NotifierError::invalid_params(
                    &spec.kind,
                    format!("unsupported method {:?}", params.method),
                )
            })?;

        let url = render_url(&params.url, job.id.as_deref());
        info!("Sending HTTP notification to {} {}", method, url);

        let response = self
            .client_for(params.strict_ssl)
            .request(method, &url)
            .json(&NotificationBody::new(job.id.as_deref(), payload))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    NotifierError::Timeout { url: url.clone() }
                } else {
                    NotifierError::Transport {
                        url: url.clone(),
                        message: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        info!("Notification sent, status code: {}", status.as_u16());

        if status.is_success() {
            let body = response.text().await.unwrap_or_default();
            info!("Notification response body: {}", body);
        }

        Ok(DeliveryReceipt {
            status_code: status.as_u16(),
        })
    }
}
